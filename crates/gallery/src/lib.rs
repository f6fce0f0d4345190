//!
//! # Gallery
//!
//! The paginated search-and-resolve engine. A [`SearchSession`] turns a tag into pages of
//! [`ResolvedPhoto`]s: each page is one search call followed by one size lookup per photo, fanned
//! out by the [`SizeResolver`] and joined before anything is appended to the session.
//!
//! ## Basic example
//!
//! ```no_run
//! use std::sync::{atomic::AtomicBool, Arc};
//!
//! use pf_flickr_api::{ApiConfig, FlickrApi, ReqwestExecutor};
//! use pf_gallery::SearchSession;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pf_gallery::Error> {
//!     let api = Arc::new(FlickrApi::new(ReqwestExecutor::default(), ApiConfig::new("key")));
//!     let session = SearchSession::new(api, AtomicBool::new(true));
//!
//!     let first = session.search("cats").await?;
//!     println!("{} of {} photos", first.len(), session.total());
//!
//!     while session.has_more() {
//!         session.next_page().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
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

mod error;
mod photo;
mod reachability;
mod resolver;
mod session;

pub use error::Error;
pub use photo::ResolvedPhoto;
pub use reachability::Reachability;
pub use resolver::SizeResolver;
pub use session::{SearchSession, SessionSnapshot};
