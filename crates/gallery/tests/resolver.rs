use pf_flickr_api::{PhotoStub, TransportError};
use pf_gallery::Error;

use std::{collections::HashSet, num::NonZeroUsize, sync::atomic::Ordering, time::Duration};

use tracing_test::traced_test;

mod common;

use common::{fail_json, resolver, sizes_json, MockFlickr, Reply};

fn stubs(ids: &[&str]) -> Vec<PhotoStub> {
	ids.iter()
		.map(|id| PhotoStub {
			id: (*id).to_string(),
			title: format!("title {id}"),
		})
		.collect()
}

#[tokio::test]
#[traced_test]
async fn empty_batch_issues_no_calls() {
	let mock = MockFlickr::new();

	let photos = resolver(&mock)
		.resolve(Vec::new())
		.await
		.expect("empty batch resolves");

	assert!(photos.is_empty());
	assert_eq!(mock.sizes_started.load(Ordering::SeqCst), 0);
}

#[tokio::test]
#[traced_test]
async fn resolves_every_stub() {
	let mock = MockFlickr::new();
	mock.on_sizes(
		"a",
		Reply::Json(sizes_json(&[
			("Large Square", "https://live.staticflickr.com/1/a_q.jpg"),
			("Large", "https://live.staticflickr.com/1/a_b.jpg"),
		])),
	);
	mock.on_sizes_delayed(
		"b",
		Reply::Json(sizes_json(&[("Large", "https://live.staticflickr.com/1/b_b.jpg")])),
		Some(Duration::from_millis(20)),
	);

	let photos = resolver(&mock)
		.resolve(stubs(&["a", "b", "c"]))
		.await
		.expect("all lookups succeed");

	assert_eq!(
		photos.iter().map(|p| p.id.as_str()).collect::<HashSet<_>>(),
		HashSet::from(["a", "b", "c"])
	);

	let a = photos.iter().find(|p| p.id == "a").expect("a is resolved");
	assert_eq!(a.title, "title a");
	assert_eq!(
		a.large_square_url.as_ref().map(url::Url::as_str),
		Some("https://live.staticflickr.com/1/a_q.jpg")
	);

	let b = photos.iter().find(|p| p.id == "b").expect("b is resolved");
	assert!(b.large_square_url.is_none());
	assert!(b.large_url.is_some());

	let c = photos.iter().find(|p| p.id == "c").expect("c is resolved");
	assert!(c.large_square_url.is_none());
	assert!(c.large_url.is_none());
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn one_failure_fails_the_batch_after_siblings_finish() {
	let mock = MockFlickr::new();
	mock.on_sizes_delayed(
		"A",
		Reply::Json(sizes_json(&[("Large", "https://live.staticflickr.com/1/a_b.jpg")])),
		Some(Duration::from_secs(2)),
	);
	mock.on_sizes("B", Reply::Status(500));
	mock.on_sizes_delayed(
		"C",
		Reply::Json(sizes_json(&[("Large", "https://live.staticflickr.com/1/c_b.jpg")])),
		Some(Duration::from_secs(3)),
	);

	let res = resolver(&mock).resolve(stubs(&["A", "B", "C"])).await;

	assert!(matches!(
		res,
		Err(Error::Api(pf_flickr_api::Error::Transport(
			TransportError::Status(500)
		)))
	));
	assert_eq!(mock.sizes_started.load(Ordering::SeqCst), 3);
	assert_eq!(mock.sizes_completed.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn earliest_settled_failure_wins() {
	let mock = MockFlickr::new();
	mock.on_sizes_delayed(
		"slow",
		Reply::Json(fail_json(1, "Photo not found")),
		Some(Duration::from_secs(5)),
	);
	mock.on_sizes("ok", Reply::Json(sizes_json(&[])));
	mock.on_sizes_delayed(
		"fast",
		Reply::Json(fail_json(2, "Permission denied")),
		Some(Duration::from_secs(1)),
	);

	let res = resolver(&mock).resolve(stubs(&["slow", "ok", "fast"])).await;

	match res {
		Err(Error::Api(e)) => assert_eq!(e.remote_code(), Some(2)),
		other => panic!("unexpected result: {other:?}"),
	}
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn lookups_run_all_at_once_by_default() {
	let mock = MockFlickr::new();
	let ids = ["1", "2", "3", "4", "5", "6"];
	for id in ids {
		mock.on_sizes_delayed(id, Reply::Json(sizes_json(&[])), Some(Duration::from_secs(1)));
	}

	let photos = resolver(&mock)
		.resolve(stubs(&ids))
		.await
		.expect("all lookups succeed");

	assert_eq!(photos.len(), ids.len());
	assert_eq!(mock.sizes_peak.load(Ordering::SeqCst), ids.len());
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn concurrency_limit_caps_parallel_lookups() {
	let mock = MockFlickr::new();
	let ids = ["1", "2", "3", "4", "5", "6"];
	for id in ids {
		mock.on_sizes_delayed(id, Reply::Json(sizes_json(&[])), Some(Duration::from_secs(1)));
	}

	let limit = NonZeroUsize::new(2).expect("non zero");
	let photos = resolver(&mock)
		.with_concurrency_limit(limit)
		.resolve(stubs(&ids))
		.await
		.expect("all lookups succeed");

	assert_eq!(photos.len(), ids.len());
	assert_eq!(mock.sizes_peak.load(Ordering::SeqCst), 2);
	assert_eq!(mock.sizes_completed.load(Ordering::SeqCst), ids.len());
}
