#![allow(dead_code)]

use pf_flickr_api::{
	ApiConfig, FlickrApi, HttpExecutor, HttpRequest, HttpResponse, TransportFailure,
};
use pf_gallery::{SearchSession, SizeResolver};

use std::{
	collections::HashMap,
	io,
	sync::{
		atomic::{AtomicBool, AtomicUsize, Ordering},
		Arc, Mutex, MutexGuard, PoisonError,
	},
	time::Duration,
};

use serde_json::json;
use tokio::sync::{Notify, Semaphore};

pub type Session = SearchSession<Arc<MockFlickr>, Arc<AtomicBool>>;

#[derive(Debug, Clone)]
pub enum Reply {
	Json(String),
	Status(u16),
	Network,
}

impl Reply {
	fn into_response(self) -> Result<HttpResponse, TransportFailure> {
		match self {
			Self::Json(body) => Ok(HttpResponse::new(200, body)),
			Self::Status(status) => Ok(HttpResponse::new(status, "")),
			Self::Network => Err(TransportFailure::Network(Box::new(io::Error::new(
				io::ErrorKind::ConnectionReset,
				"connection reset by peer",
			)))),
		}
	}
}

#[derive(Debug, Clone)]
struct SizesScript {
	reply: Reply,
	delay: Option<Duration>,
}

/// In memory stand-in for the Flickr REST endpoint.
///
/// Search replies are scripted per page and size replies per photo id, with a default for
/// photos nobody scripted. Searches can be held at a gate to observe a session mid flight.
pub struct MockFlickr {
	search_pages: Mutex<HashMap<u32, Reply>>,
	sizes: Mutex<HashMap<String, SizesScript>>,
	default_sizes: Mutex<Reply>,
	search_gate: Mutex<Option<Arc<Semaphore>>>,
	requested_pages: Mutex<Vec<u32>>,

	pub search_started: Notify,
	pub search_calls: AtomicUsize,
	pub sizes_started: AtomicUsize,
	pub sizes_completed: AtomicUsize,
	sizes_active: AtomicUsize,
	pub sizes_peak: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockFlickr {
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			search_pages: Mutex::new(HashMap::new()),
			sizes: Mutex::new(HashMap::new()),
			default_sizes: Mutex::new(Reply::Json(sizes_json(&[(
				"Thumbnail",
				"https://live.staticflickr.com/65535/default_t.jpg",
			)]))),
			search_gate: Mutex::new(None),
			requested_pages: Mutex::new(Vec::new()),
			search_started: Notify::new(),
			search_calls: AtomicUsize::new(0),
			sizes_started: AtomicUsize::new(0),
			sizes_completed: AtomicUsize::new(0),
			sizes_active: AtomicUsize::new(0),
			sizes_peak: AtomicUsize::new(0),
		})
	}

	pub fn on_search(&self, page: u32, reply: Reply) {
		lock(&self.search_pages).insert(page, reply);
	}

	pub fn on_sizes(&self, photo_id: &str, reply: Reply) {
		self.on_sizes_delayed(photo_id, reply, None);
	}

	pub fn on_sizes_delayed(&self, photo_id: &str, reply: Reply, delay: Option<Duration>) {
		lock(&self.sizes).insert(photo_id.to_string(), SizesScript { reply, delay });
	}

	pub fn default_sizes(&self, reply: Reply) {
		*lock(&self.default_sizes) = reply;
	}

	/// Holds every following search until a permit is added to the returned gate.
	pub fn hold_searches(&self) -> Arc<Semaphore> {
		let gate = Arc::new(Semaphore::new(0));
		*lock(&self.search_gate) = Some(Arc::clone(&gate));
		gate
	}

	pub fn requested_pages(&self) -> Vec<u32> {
		lock(&self.requested_pages).clone()
	}

	async fn search(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
		let page = request
			.param_value("page")
			.and_then(|page| page.parse::<u32>().ok())
			.unwrap_or_default();

		self.search_calls.fetch_add(1, Ordering::SeqCst);
		lock(&self.requested_pages).push(page);
		self.search_started.notify_one();

		let gate = lock(&self.search_gate).clone();
		if let Some(gate) = gate {
			if let Ok(permit) = gate.acquire().await {
				permit.forget();
			}
		}

		let reply = lock(&self.search_pages)
			.get(&page)
			.cloned()
			.unwrap_or(Reply::Status(404));

		reply.into_response()
	}

	async fn sizes(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
		let photo_id = request.param_value("photo_id").unwrap_or_default();

		self.sizes_started.fetch_add(1, Ordering::SeqCst);
		let active = self.sizes_active.fetch_add(1, Ordering::SeqCst) + 1;
		self.sizes_peak.fetch_max(active, Ordering::SeqCst);

		let script = lock(&self.sizes).get(photo_id).cloned();
		let (reply, delay) = match script {
			Some(SizesScript { reply, delay }) => (reply, delay),
			None => (lock(&self.default_sizes).clone(), None),
		};

		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}

		self.sizes_active.fetch_sub(1, Ordering::SeqCst);
		self.sizes_completed.fetch_add(1, Ordering::SeqCst);

		reply.into_response()
	}
}

impl HttpExecutor for MockFlickr {
	async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
		match request.param_value("method") {
			Some("flickr.photos.search") => self.search(&request).await,
			Some("flickr.photos.getSizes") => self.sizes(&request).await,
			_ => Ok(HttpResponse::new(
				200,
				r#"{"stat":"fail","code":112,"message":"Method not found"}"#,
			)),
		}
	}
}

pub fn search_json(page: u32, pages: u32, total: usize, photos: &[(&str, &str)]) -> String {
	json!({
		"photos": {
			"page": page,
			"pages": pages,
			"perpage": 50,
			"total": total,
			"photo": photos
				.iter()
				.map(|(id, title)| json!({
					"id": id,
					"owner": "12345678@N00",
					"secret": "0a1b2c3d4e",
					"server": "65535",
					"farm": 66,
					"title": title,
					"ispublic": 1,
				}))
				.collect::<Vec<_>>(),
		},
		"stat": "ok",
	})
	.to_string()
}

pub fn sizes_json(sizes: &[(&str, &str)]) -> String {
	json!({
		"sizes": {
			"canblog": 0,
			"canprint": 0,
			"candownload": 1,
			"size": sizes
				.iter()
				.map(|(label, source)| json!({
					"label": label,
					"width": 100,
					"height": 100,
					"source": source,
					"media": "photo",
				}))
				.collect::<Vec<_>>(),
		},
		"stat": "ok",
	})
	.to_string()
}

pub fn fail_json(code: i64, message: &str) -> String {
	json!({ "stat": "fail", "code": code, "message": message }).to_string()
}

pub fn api(mock: &Arc<MockFlickr>) -> Arc<FlickrApi<Arc<MockFlickr>>> {
	Arc::new(FlickrApi::new(Arc::clone(mock), ApiConfig::new("test-api-key")))
}

pub fn resolver(mock: &Arc<MockFlickr>) -> SizeResolver<Arc<MockFlickr>> {
	SizeResolver::new(api(mock))
}

pub fn session(mock: &Arc<MockFlickr>) -> (Arc<Session>, Arc<AtomicBool>) {
	let online = Arc::new(AtomicBool::new(true));
	let session = SearchSession::new(api(mock), Arc::clone(&online));

	(Arc::new(session), online)
}
