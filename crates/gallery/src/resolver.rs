use std::{
	num::NonZeroUsize,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	},
};

use futures_concurrency::future::Join;
use pf_flickr_api::{FlickrApi, HttpExecutor, PhotoStub};
use tokio::{spawn, sync::Semaphore};
use tracing::{debug, instrument, warn};

use crate::{Error, ResolvedPhoto};

/// Resolves a batch of stubs by looking up each photo's sizes concurrently.
///
/// Every lookup runs on its own task and the batch only settles once all of them finished.
/// A failing lookup never cancels its siblings, and a batch with any failure yields the
/// failure that settled first, without exposing the photos that did resolve.
pub struct SizeResolver<E> {
	api: Arc<FlickrApi<E>>,
	limit: Option<Arc<Semaphore>>,
}

impl<E> Clone for SizeResolver<E> {
	fn clone(&self) -> Self {
		Self {
			api: Arc::clone(&self.api),
			limit: self.limit.clone(),
		}
	}
}

impl<E: HttpExecutor> SizeResolver<E> {
	#[must_use]
	pub const fn new(api: Arc<FlickrApi<E>>) -> Self {
		Self { api, limit: None }
	}

	/// Caps how many lookups may be on the wire at once. Unbounded by default.
	#[must_use]
	pub fn with_concurrency_limit(mut self, limit: NonZeroUsize) -> Self {
		self.limit = Some(Arc::new(Semaphore::new(limit.get())));
		self
	}

	#[instrument(skip_all, fields(stubs = stubs.len()), err)]
	pub async fn resolve(&self, stubs: Vec<PhotoStub>) -> Result<Vec<ResolvedPhoto>, Error> {
		if stubs.is_empty() {
			return Ok(Vec::new());
		}

		let total = stubs.len();
		let settle_order = Arc::new(AtomicUsize::new(0));

		let results = stubs
			.into_iter()
			.map(|stub| {
				let api = Arc::clone(&self.api);
				let limit = self.limit.clone();
				let settle_order = Arc::clone(&settle_order);

				spawn(async move {
					let _permit = match limit {
						Some(semaphore) => semaphore.acquire_owned().await.ok(),
						None => None,
					};

					let sizes = api.get_sizes(&stub.id).await;
					let res = sizes.map(|sizes| ResolvedPhoto::new(stub, &sizes));

					(settle_order.fetch_add(1, Ordering::Relaxed), res)
				})
			})
			.collect::<Vec<_>>()
			.join()
			.await;

		let mut resolved = Vec::with_capacity(total);
		let mut first_error: Option<(usize, Error)> = None;

		for join_res in results {
			let (settled_at, e) = match join_res {
				Ok((_, Ok(photo))) => {
					resolved.push(photo);
					continue;
				}
				Ok((settled_at, Err(e))) => (settled_at, Error::from(e)),
				// Panicked lookups never reached the counter, rank them last
				Err(e) => (usize::MAX, Error::from(e)),
			};

			warn!(?e, settled_at, "Failed to resolve photo sizes;");

			if first_error
				.as_ref()
				.map_or(true, |(first_at, _)| settled_at < *first_at)
			{
				first_error = Some((settled_at, e));
			}
		}

		if let Some((_, e)) = first_error {
			debug!(
				resolved = resolved.len(),
				total, "Discarding partially resolved batch;"
			);
			return Err(e);
		}

		Ok(resolved)
	}
}
