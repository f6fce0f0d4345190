use std::sync::{
	atomic::{AtomicBool, Ordering},
	Arc,
};

/// Connectivity gate polled before every page fetch. Must answer without blocking.
pub trait Reachability: Send + Sync + 'static {
	fn is_reachable(&self) -> bool;
}

impl Reachability for AtomicBool {
	fn is_reachable(&self) -> bool {
		self.load(Ordering::Acquire)
	}
}

impl<R: Reachability> Reachability for Arc<R> {
	fn is_reachable(&self) -> bool {
		(**self).is_reachable()
	}
}
