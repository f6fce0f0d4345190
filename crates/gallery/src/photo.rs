use std::hash::{Hash, Hasher};

use pf_flickr_api::{PhotoStub, SizeSet};
use serde::Serialize;
use url::Url;

/// A search result with the two renditions the gallery shows.
///
/// Two records with the same `id` are the same photo, whatever the other fields say.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPhoto {
	pub id: String,
	pub title: String,
	pub large_square_url: Option<Url>,
	pub large_url: Option<Url>,
}

impl ResolvedPhoto {
	/// Missing labels and unparsable sources both leave the URL absent.
	#[must_use]
	pub fn new(PhotoStub { id, title }: PhotoStub, sizes: &SizeSet) -> Self {
		Self {
			id,
			title,
			large_square_url: sizes.large_square().and_then(|src| Url::parse(src).ok()),
			large_url: sizes.large().and_then(|src| Url::parse(src).ok()),
		}
	}
}

impl PartialEq for ResolvedPhoto {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for ResolvedPhoto {}

impl Hash for ResolvedPhoto {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}
