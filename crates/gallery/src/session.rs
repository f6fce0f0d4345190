use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pf_flickr_api::{FlickrApi, HttpExecutor, SearchPage};
use tracing::{debug, instrument, warn};

use crate::{Error, Reachability, ResolvedPhoto, SizeResolver};

const FIRST_PAGE: u32 = 1;

/// Paginated search over one query at a time.
///
/// Owns the accumulated photos and counters of the current query and lets at most one
/// `search` or `next_page` run at any time. Every method takes `&self`, so a session can be
/// shared behind an [`Arc`] and [`stop`](Self::stop) can be called while a page is loading.
pub struct SearchSession<E, R> {
	api: Arc<FlickrApi<E>>,
	resolver: SizeResolver<E>,
	reachability: R,
	state: Mutex<SessionState>,
}

/// Point in time copy of the session bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
	pub query: Option<String>,
	pub photos: Vec<ResolvedPhoto>,
	pub total: usize,
	pub page: u32,
	pub has_more: bool,
	pub in_flight: bool,
}

#[derive(Debug)]
struct SessionState {
	query: Option<String>,
	photos: Vec<ResolvedPhoto>,
	total: usize,
	page: u32,
	has_more: bool,
	in_flight: bool,
	// Bumped on every reset, pages that started under an older value are discarded
	generation: u64,
}

impl Default for SessionState {
	fn default() -> Self {
		Self {
			query: None,
			photos: Vec::new(),
			total: 0,
			page: 0,
			has_more: true,
			in_flight: false,
			generation: 0,
		}
	}
}

impl SessionState {
	fn reset(&mut self) {
		*self = Self {
			generation: self.generation.wrapping_add(1),
			..Self::default()
		};
	}

	/// Appends every photo of the page, repeated ids included, so the loaded count always
	/// matches the stubs received so far.
	fn append(&mut self, LoadedPage { page, total, photos }: LoadedPage) -> Vec<ResolvedPhoto> {
		self.photos.extend(photos.iter().cloned());
		self.page = page;

		if total < self.photos.len() {
			warn!(
				reported = total,
				loaded = self.photos.len(),
				"Remote total is lower than the loaded count, raising it;"
			);
		}
		self.total = total.max(self.photos.len());
		self.has_more = self.photos.len() < self.total;
		self.in_flight = false;

		photos
	}

	fn snapshot(&self) -> SessionSnapshot {
		SessionSnapshot {
			query: self.query.clone(),
			photos: self.photos.clone(),
			total: self.total,
			page: self.page,
			has_more: self.has_more,
			in_flight: self.in_flight,
		}
	}
}

struct LoadedPage {
	page: u32,
	total: usize,
	photos: Vec<ResolvedPhoto>,
}

/// What to do with the session when a page fails to load.
#[derive(Debug, Clone, Copy)]
enum OnFailure {
	/// Drop the query and everything accumulated for it.
	Reset,
	/// Keep the session resumable, only release the single flight flag.
	Release,
}

impl OnFailure {
	fn apply(self, state: &mut SessionState) {
		match self {
			Self::Reset => state.reset(),
			Self::Release => state.in_flight = false,
		}
	}
}

/// Holds the single flight flag for one page load.
///
/// If the load future is dropped before settling, the flag is released on drop following the
/// same failure policy the operation would apply.
struct InFlight<'session> {
	state: &'session Mutex<SessionState>,
	generation: u64,
	on_failure: OnFailure,
	armed: bool,
}

impl InFlight<'_> {
	fn disarm(&mut self) {
		self.armed = false;
	}
}

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		if !self.armed {
			return;
		}

		let mut state = lock(self.state);
		if state.generation == self.generation {
			debug!("Page load abandoned before settling;");
			self.on_failure.apply(&mut state);
		}
	}
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
	state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E: HttpExecutor, R: Reachability> SearchSession<E, R> {
	pub fn new(api: Arc<FlickrApi<E>>, reachability: R) -> Self {
		let resolver = SizeResolver::new(Arc::clone(&api));
		Self::with_resolver(api, resolver, reachability)
	}

	pub fn with_resolver(
		api: Arc<FlickrApi<E>>,
		resolver: SizeResolver<E>,
		reachability: R,
	) -> Self {
		Self {
			api,
			resolver,
			reachability,
			state: Mutex::new(SessionState::default()),
		}
	}

	/// Starts a fresh session for `input` and loads its first page.
	///
	/// Searching the query that is already active is rejected with [`Error::InvalidInput`],
	/// call [`stop`](Self::stop) first to run it again. On failure the session is fully reset.
	#[instrument(skip(self), err)]
	pub async fn search(&self, input: &str) -> Result<Vec<ResolvedPhoto>, Error> {
		if !self.reachability.is_reachable() {
			return Err(Error::NoConnection);
		}

		let flight = {
			let mut state = lock(&self.state);

			if state.in_flight {
				return Err(Error::AlreadyLoading);
			}

			if input.trim().is_empty() || state.query.as_deref() == Some(input) {
				return Err(Error::InvalidInput);
			}

			state.reset();
			state.query = Some(input.to_string());

			self.take_off(&mut state, OnFailure::Reset)
		};

		debug!("Starting a new search;");

		let res = self.load(input, FIRST_PAGE).await;

		self.settle(flight, res)
	}

	/// Loads the page after the last one and appends it to the session.
	///
	/// On failure the session keeps its query and photos so the call can be retried.
	#[instrument(skip(self), err)]
	pub async fn next_page(&self) -> Result<Vec<ResolvedPhoto>, Error> {
		if !self.reachability.is_reachable() {
			return Err(Error::NoConnection);
		}

		let (flight, query, page) = {
			let mut state = lock(&self.state);

			if state.in_flight {
				return Err(Error::AlreadyLoading);
			}

			if !state.has_more {
				return Err(Error::NoMorePages);
			}

			let Some(query) = state.query.clone() else {
				return Err(Error::InvalidInput);
			};

			let page = state.page + 1;

			(self.take_off(&mut state, OnFailure::Release), query, page)
		};

		debug!(%query, page, "Loading next page;");

		let res = self.load(&query, page).await;

		self.settle(flight, res)
	}

	/// Resets the session right away, even with a page in flight.
	///
	/// Lookups already on the wire are left to finish, their page is discarded when it settles.
	pub fn stop(&self) {
		let mut state = lock(&self.state);

		if state.in_flight {
			debug!("Stopping session with a page in flight;");
		}

		state.reset();
	}

	fn take_off<'session>(
		&'session self,
		state: &mut SessionState,
		on_failure: OnFailure,
	) -> InFlight<'session> {
		state.in_flight = true;

		InFlight {
			state: &self.state,
			generation: state.generation,
			on_failure,
			armed: true,
		}
	}

	async fn load(&self, query: &str, page: u32) -> Result<LoadedPage, Error> {
		let SearchPage {
			page,
			total,
			photos: stubs,
			..
		} = self.api.search(query, page).await?;

		let photos = self.resolver.resolve(stubs).await?;

		Ok(LoadedPage {
			page,
			total,
			photos,
		})
	}

	fn settle(
		&self,
		mut flight: InFlight<'_>,
		res: Result<LoadedPage, Error>,
	) -> Result<Vec<ResolvedPhoto>, Error> {
		flight.disarm();

		let mut state = lock(&self.state);

		if state.generation != flight.generation {
			warn!(
				failed = res.is_err(),
				"Discarding page that settled after the session was reset;"
			);
			return Err(Error::Stopped);
		}

		match res {
			Ok(loaded) => {
				let photos = state.append(loaded);
				debug!(
					new = photos.len(),
					loaded = state.photos.len(),
					total = state.total,
					has_more = state.has_more,
					"Page settled;"
				);
				Ok(photos)
			}
			Err(e) => {
				flight.on_failure.apply(&mut state);
				Err(e)
			}
		}
	}

	#[must_use]
	pub fn total(&self) -> usize {
		lock(&self.state).total
	}

	#[must_use]
	pub fn loaded(&self) -> usize {
		lock(&self.state).photos.len()
	}

	#[must_use]
	pub fn photo(&self, index: usize) -> Option<ResolvedPhoto> {
		lock(&self.state).photos.get(index).cloned()
	}

	#[must_use]
	pub fn is_loaded(&self, index: usize) -> bool {
		index < self.loaded()
	}

	#[must_use]
	pub fn photos(&self) -> Vec<ResolvedPhoto> {
		lock(&self.state).photos.clone()
	}

	#[must_use]
	pub fn query(&self) -> Option<String> {
		lock(&self.state).query.clone()
	}

	/// Whether the active query has pages left to load.
	#[must_use]
	pub fn has_more(&self) -> bool {
		let state = lock(&self.state);
		state.query.is_some() && state.has_more
	}

	#[must_use]
	pub fn is_loading(&self) -> bool {
		lock(&self.state).in_flight
	}

	#[must_use]
	pub fn snapshot(&self) -> SessionSnapshot {
		lock(&self.state).snapshot()
	}
}
