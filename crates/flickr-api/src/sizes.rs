use std::{collections::BTreeMap, str::FromStr};

use serde::Deserialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::trace;

use crate::{contract::Contract, http::HttpRequest, ApiConfig};

const METHOD: &str = "flickr.photos.getSizes";

/// Size labels known to the remote service, ordered from smallest to largest.
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	PartialOrd,
	Ord,
	AsRefStr,
	Display,
	EnumIter,
	EnumString,
)]
pub enum SizeLabel {
	#[strum(serialize = "Square")]
	Square,
	#[strum(serialize = "Large Square")]
	LargeSquare,
	#[strum(serialize = "Thumbnail")]
	Thumbnail,
	#[strum(serialize = "Small")]
	Small,
	#[strum(serialize = "Small 320")]
	Small320,
	#[strum(serialize = "Small 400")]
	Small400,
	#[strum(serialize = "Medium")]
	Medium,
	#[strum(serialize = "Medium 640")]
	Medium640,
	#[strum(serialize = "Medium 800")]
	Medium800,
	#[strum(serialize = "Large")]
	Large,
	#[strum(serialize = "Large 1600")]
	Large1600,
	#[strum(serialize = "Large 2048")]
	Large2048,
	#[strum(serialize = "X-Large 3K")]
	XLarge3K,
	#[strum(serialize = "X-Large 4K")]
	XLarge4K,
	#[strum(serialize = "X-Large 5K")]
	XLarge5K,
	#[strum(serialize = "Original")]
	Original,
}

/// Source URL per size label for a single photo. Never mutated once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawSizes")]
pub struct SizeSet(BTreeMap<SizeLabel, String>);

impl SizeSet {
	#[must_use]
	pub fn get(&self, label: SizeLabel) -> Option<&str> {
		self.0.get(&label).map(String::as_str)
	}

	#[must_use]
	pub fn large_square(&self) -> Option<&str> {
		self.get(SizeLabel::LargeSquare)
	}

	#[must_use]
	pub fn large(&self) -> Option<&str> {
		self.get(SizeLabel::Large)
	}

	/// The biggest rendition available, usually `Original`.
	#[must_use]
	pub fn largest(&self) -> Option<(SizeLabel, &str)> {
		self.0
			.iter()
			.next_back()
			.map(|(label, source)| (*label, source.as_str()))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (SizeLabel, &str)> + '_ {
		self.0.iter().map(|(label, source)| (*label, source.as_str()))
	}
}

impl FromIterator<(SizeLabel, String)> for SizeSet {
	fn from_iter<T: IntoIterator<Item = (SizeLabel, String)>>(iter: T) -> Self {
		let mut sizes = BTreeMap::new();
		for (label, source) in iter {
			// The remote lists each label once, if it ever repeats the first one is kept
			sizes.entry(label).or_insert(source);
		}
		Self(sizes)
	}
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSizes {
	size: Vec<RawSize>,
}

#[derive(Debug, Deserialize)]
struct RawSize {
	label: String,
	source: String,
}

impl From<RawSizes> for SizeSet {
	fn from(RawSizes { size }: RawSizes) -> Self {
		size.into_iter()
			.filter_map(|RawSize { label, source }| match SizeLabel::from_str(&label) {
				Ok(label) => Some((label, source)),
				Err(_) => {
					trace!(%label, "Skipping unrecognized size label;");
					None
				}
			})
			.collect()
	}
}

pub(crate) struct SizesContract;

impl Contract for SizesContract {
	const PAYLOAD_KEY: &'static str = "sizes";
	const ENTITY: &'static str = "get sizes response";

	type Payload = SizeSet;
}

pub(crate) fn request(config: &ApiConfig, photo_id: &str) -> HttpRequest {
	config.base_request(METHOD).param("photo_id", photo_id)
}
