use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum Error {
	#[error("the network is not reachable")]
	NoConnection,
	#[error("there is another loading process running")]
	AlreadyLoading,
	#[error("all pages were loaded")]
	NoMorePages,
	#[error("the given input is invalid or empty")]
	InvalidInput,
	#[error("the session was reset before the page settled")]
	Stopped,

	#[error("size lookup task failed: {0}")]
	TaskJoin(#[from] JoinError),
	#[error(transparent)]
	Api(#[from] pf_flickr_api::Error),
}

impl Error {
	/// Expected control flow outcomes, as opposed to remote or transport failures.
	///
	/// Front ends should not show a generic error banner for these.
	#[must_use]
	pub const fn is_precondition(&self) -> bool {
		matches!(
			self,
			Self::NoConnection
				| Self::AlreadyLoading
				| Self::NoMorePages
				| Self::InvalidInput
				| Self::Stopped
		)
	}
}
