use std::{error::Error as StdError, time::Duration};

use thiserror::Error;

/// Failures surfaced by the remote API client.
///
/// Nothing here is retried or recovered locally, callers receive these exactly as the
/// remote call produced them.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Transport(#[from] TransportError),
	#[error("request timed out after {0:?}")]
	Timeout(Duration),
	#[error("remote API failure <code={code}>: {message}")]
	RemoteApi { code: i64, message: String },
	#[error("key '{key}' not found on {entity}")]
	Schema {
		key: &'static str,
		entity: &'static str,
	},
	#[error("wrong response format on {entity}: {source}")]
	Format {
		entity: &'static str,
		#[source]
		source: serde_json::Error,
	},
}

#[derive(Debug, Error)]
pub enum TransportError {
	#[error("remote answered with a non-success status <status={0}>")]
	Status(u16),
	#[error("network failure: {0}")]
	Network(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
	/// The numeric code attached to a structured remote failure, if this is one.
	#[must_use]
	pub const fn remote_code(&self) -> Option<i64> {
		if let Self::RemoteApi { code, .. } = self {
			Some(*code)
		} else {
			None
		}
	}

	/// Payload shape violations, usually meaning the remote contract drifted.
	#[must_use]
	pub const fn is_contract_violation(&self) -> bool {
		matches!(self, Self::Schema { .. } | Self::Format { .. })
	}
}
