//!
//! # Flickr API
//!
//! Thin client for the two Flickr REST operations the gallery needs: a paginated tag search and
//! the per photo size lookup. The transport is injected through [`HttpExecutor`], so the same
//! client runs over [`ReqwestExecutor`] in production and over scripted executors in tests.
//!
//! Every call is bounded by [`ApiConfig::timeout`] and validated by the response contract in
//! [`contract`] before anything reaches the caller.
//!

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use std::time::Duration;

use tracing::{debug, instrument};

pub mod contract;
mod error;
mod http;
mod search;
mod sizes;

pub use error::{Error, TransportError};
pub use http::{HttpExecutor, HttpRequest, HttpResponse, ReqwestExecutor, TransportFailure};
pub use search::{PhotoStub, SearchPage, DEFAULT_PAGE_SIZE};
pub use sizes::{SizeLabel, SizeSet};

use contract::Contract;
use search::SearchContract;
use sizes::SizesContract;

pub const BASE_URL: &str = "https://api.flickr.com/services/rest";

/// Request time bounds.
pub struct Timeout;

impl Timeout {
	pub const SHORT: Duration = Duration::from_secs(30);
	pub const MEDIUM: Duration = Duration::from_secs(60);
	pub const LONG: Duration = Duration::from_secs(120);
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
	pub base_url: String,
	pub api_key: String,
	pub page_size: u32,
	pub timeout: Duration,
}

impl ApiConfig {
	pub fn new(api_key: impl Into<String>) -> Self {
		Self {
			base_url: BASE_URL.to_string(),
			api_key: api_key.into(),
			page_size: DEFAULT_PAGE_SIZE,
			timeout: Timeout::SHORT,
		}
	}

	pub(crate) fn base_request(&self, method: &'static str) -> HttpRequest {
		HttpRequest::get(&self.base_url, self.timeout)
			.param("method", method)
			.param("api_key", &self.api_key)
			.param("format", "json")
			.param("nojsoncallback", 1)
	}
}

/// Issues the search and get-sizes calls and applies the response contract to them.
///
/// Holds no per session data, a single instance can be shared by any number of concurrent
/// callers.
#[derive(Debug)]
pub struct FlickrApi<E> {
	executor: E,
	config: ApiConfig,
}

impl<E: HttpExecutor> FlickrApi<E> {
	pub const fn new(executor: E, config: ApiConfig) -> Self {
		Self { executor, config }
	}

	pub const fn config(&self) -> &ApiConfig {
		&self.config
	}

	/// Searches photos by tag using the configured page size. Pages start at 1.
	pub async fn search(&self, tag: &str, page: u32) -> Result<SearchPage, Error> {
		self.search_with_page_size(tag, page, self.config.page_size)
			.await
	}

	#[instrument(skip(self), err)]
	pub async fn search_with_page_size(
		&self,
		tag: &str,
		page: u32,
		page_size: u32,
	) -> Result<SearchPage, Error> {
		let page = self
			.call::<SearchContract>(search::request(&self.config, tag, page, page_size))
			.await?;

		debug!(
			page = page.page,
			pages = page.pages,
			total = page.total,
			stubs = page.photos.len(),
			"Search page received;"
		);

		Ok(page)
	}

	#[instrument(skip(self), err)]
	pub async fn get_sizes(&self, photo_id: &str) -> Result<SizeSet, Error> {
		self.call::<SizesContract>(sizes::request(&self.config, photo_id))
			.await
	}

	async fn call<C: Contract>(&self, request: HttpRequest) -> Result<C::Payload, Error> {
		let limit = request.timeout;

		match tokio::time::timeout(limit, self.executor.execute(request)).await {
			Ok(Ok(response)) => contract::parse::<C>(response.status, &response.body),
			Ok(Err(TransportFailure::Network(e))) => Err(TransportError::Network(e).into()),
			Ok(Err(TransportFailure::TimedOut)) | Err(_) => Err(Error::Timeout(limit)),
		}
	}
}
