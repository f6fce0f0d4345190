use std::{
	sync::{
		atomic::{AtomicU8, Ordering},
		Arc,
	},
	time::Duration,
};

use pf_gallery::Reachability;
use tokio::{net::TcpStream, spawn, time};
use tracing::{info, warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReachabilityStatus {
	Unknown = 0,
	NotReachable = 1,
	Reachable = 2,
}

impl From<u8> for ReachabilityStatus {
	fn from(value: u8) -> Self {
		match value {
			1 => Self::NotReachable,
			2 => Self::Reachable,
			_ => Self::Unknown,
		}
	}
}

/// Tracks whether the remote host accepts TCP connections.
///
/// Probes run on a background task, [`Reachability::is_reachable`] only reads the last result.
#[derive(Debug)]
pub struct NetworkMonitor {
	host: String,
	status: AtomicU8,
}

impl NetworkMonitor {
	pub fn new(host: impl Into<String>) -> Self {
		Self {
			host: host.into(),
			status: AtomicU8::new(ReachabilityStatus::Unknown as u8),
		}
	}

	/// Probes once, then keeps probing every `interval` for as long as the monitor is alive.
	pub async fn start(host: impl Into<String>, interval: Duration) -> Arc<Self> {
		let monitor = Arc::new(Self::new(host));
		monitor.probe().await;

		let weak = Arc::downgrade(&monitor);
		spawn(async move {
			loop {
				time::sleep(interval).await;

				let Some(monitor) = weak.upgrade() else {
					break;
				};
				monitor.probe().await;
			}
		});

		monitor
	}

	pub async fn probe(&self) -> ReachabilityStatus {
		let status = match time::timeout(PROBE_TIMEOUT, TcpStream::connect(&self.host)).await {
			Ok(Ok(_)) => ReachabilityStatus::Reachable,
			Ok(Err(e)) => {
				warn!(host = %self.host, ?e, "Reachability probe failed;");
				ReachabilityStatus::NotReachable
			}
			Err(_) => {
				warn!(host = %self.host, "Reachability probe timed out;");
				ReachabilityStatus::NotReachable
			}
		};

		let previous = ReachabilityStatus::from(self.status.swap(status as u8, Ordering::AcqRel));
		if previous != status {
			info!(host = %self.host, ?previous, ?status, "Reachability changed;");
		}

		status
	}

	pub fn status(&self) -> ReachabilityStatus {
		ReachabilityStatus::from(self.status.load(Ordering::Acquire))
	}
}

impl Reachability for NetworkMonitor {
	fn is_reachable(&self) -> bool {
		self.status() == ReachabilityStatus::Reachable
	}
}
