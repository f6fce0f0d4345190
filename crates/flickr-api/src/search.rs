use serde::{Deserialize, Serialize};

use crate::{contract::Contract, http::HttpRequest, ApiConfig};

const METHOD: &str = "flickr.photos.search";

pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Identity and title of a photo, as listed by a search page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoStub {
	pub id: String,
	pub title: String,
}

/// One page of search results. `total` may change from page to page and the latest value
/// is the authoritative one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchPage {
	pub page: u32,
	pub pages: u32,
	pub total: usize,
	#[serde(rename = "photo")]
	pub photos: Vec<PhotoStub>,
}

pub(crate) struct SearchContract;

impl Contract for SearchContract {
	const PAYLOAD_KEY: &'static str = "photos";
	const ENTITY: &'static str = "search response";

	type Payload = SearchPage;
}

pub(crate) fn request(config: &ApiConfig, tag: &str, page: u32, page_size: u32) -> HttpRequest {
	config
		.base_request(METHOD)
		.param("tags", tag)
		.param("page", page)
		.param("per_page", page_size)
}
