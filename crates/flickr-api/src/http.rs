use std::{error::Error as StdError, future::Future, sync::Arc, time::Duration};

use bytes::Bytes;
use reqwest::header::ACCEPT;
use thiserror::Error;
use tracing::trace;

/// A single GET-style call against the remote service.
#[derive(Debug, Clone)]
pub struct HttpRequest {
	pub url: String,
	pub query: Vec<(&'static str, String)>,
	pub timeout: Duration,
}

impl HttpRequest {
	#[must_use]
	pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
		Self {
			url: url.into(),
			query: Vec::new(),
			timeout,
		}
	}

	#[must_use]
	pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
		self.query.push((key, value.to_string()));
		self
	}

	/// Looks up a query parameter by name, first occurrence wins.
	#[must_use]
	pub fn param_value(&self, key: &str) -> Option<&str> {
		self.query
			.iter()
			.find_map(|(k, v)| (*k == key).then_some(v.as_str()))
	}
}

/// Raw status and body, before any contract validation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
	pub status: u16,
	pub body: Bytes,
}

impl HttpResponse {
	pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
		Self {
			status,
			body: body.into(),
		}
	}
}

#[derive(Debug, Error)]
pub enum TransportFailure {
	#[error("request timed out")]
	TimedOut,
	#[error(transparent)]
	Network(Box<dyn StdError + Send + Sync>),
}

/// The transport seam: anything able to run a request and hand back status plus body.
pub trait HttpExecutor: Send + Sync + 'static {
	fn execute(
		&self,
		request: HttpRequest,
	) -> impl Future<Output = Result<HttpResponse, TransportFailure>> + Send;
}

impl<E: HttpExecutor> HttpExecutor for Arc<E> {
	fn execute(
		&self,
		request: HttpRequest,
	) -> impl Future<Output = Result<HttpResponse, TransportFailure>> + Send {
		(**self).execute(request)
	}
}

/// [`HttpExecutor`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestExecutor {
	client: reqwest::Client,
}

impl ReqwestExecutor {
	#[must_use]
	pub const fn new(client: reqwest::Client) -> Self {
		Self { client }
	}
}

impl From<reqwest::Error> for TransportFailure {
	fn from(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			Self::TimedOut
		} else {
			Self::Network(Box::new(e))
		}
	}
}

impl HttpExecutor for ReqwestExecutor {
	async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
		let HttpRequest {
			url,
			query,
			timeout,
		} = request;

		let response = self
			.client
			.get(&url)
			.query(&query)
			.header(ACCEPT, "application/json")
			.timeout(timeout)
			.send()
			.await?;

		let status = response.status().as_u16();
		let body = response.bytes().await?;

		trace!(%url, status, body_len = body.len(), "Received response;");

		Ok(HttpResponse { status, body })
	}
}
