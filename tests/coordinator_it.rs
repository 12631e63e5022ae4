mod common;

// std
use std::sync::Arc;
// crates.io
use futures::future;
// self
use common::{
	GatedTransport, HELD_PATH, REFRESH_PATH, ReadOnlyStore, RefreshReply, gated_client,
	gated_client_over, wait_until,
};
use refresh_relay::{
	CancellationToken,
	_preludet::{LogoutProbe, seeded_store},
	auth::Credentials,
	client::{AuthClient, RefreshOutcome},
	config::RefreshConfig,
	error::{Error, RefreshError},
	http::StatusCode,
	request::ApiRequest,
	transport::RawResponse,
};

const ROTATE: RefreshReply = RefreshReply::Rotate { access: "A2", refresh: "R2" };

fn spawn_get(
	client: &AuthClient<GatedTransport>,
	request: ApiRequest,
) -> tokio::task::JoinHandle<Result<RawResponse, Error>> {
	let client = client.clone();

	tokio::spawn(async move { client.execute(request).await })
}

async fn join_statuses(
	handles: Vec<tokio::task::JoinHandle<Result<RawResponse, Error>>>,
) -> Vec<StatusCode> {
	future::join_all(handles)
		.await
		.into_iter()
		.map(|joined| {
			joined.expect("Request task should not panic.").expect("Request should complete.").status
		})
		.collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queued_requests_replay_with_rotated_token() {
	let (client, store, logout) =
		gated_client(GatedTransport::new("A2", ROTATE), RefreshConfig::default());
	let handles = (0..4).map(|_| spawn_get(&client, ApiRequest::get("/items"))).collect();

	wait_until(|| client.coordinator().waiting() == 3).await;

	assert!(client.coordinator().is_refreshing());
	assert_eq!(client.transport.refresh_calls(), 1);

	client.transport.release();

	assert_eq!(join_statuses(handles).await, vec![StatusCode::OK; 4]);
	assert_eq!(client.transport.refresh_calls(), 1);
	assert_eq!(client.coordinator().generation(), 1);
	assert_eq!(client.refresh_metrics.coalesced(), 3);
	assert_eq!(store.snapshot(), Some(Credentials::new("A2", "R2")));
	assert_eq!(logout.count(), 0);

	let bearers = client.transport.bearers("/items");

	assert_eq!(bearers.len(), 8);
	assert!(bearers[..4].iter().all(|b| b.as_deref() == Some("Bearer A1")));
	assert!(bearers[4..].iter().all(|b| b.as_deref() == Some("Bearer A2")));
	// The refresh call carries the stale pair, never a refreshed one.
	assert_eq!(client.transport.bearers(REFRESH_PATH), vec![Some("Bearer A1".to_owned())]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_refresh_resolves_every_request_with_original_401() {
	let (client, store, logout) = gated_client(
		GatedTransport::new("A2", RefreshReply::Reject(StatusCode::UNAUTHORIZED)),
		RefreshConfig::default(),
	);
	let handles = (0..3).map(|_| spawn_get(&client, ApiRequest::get("/items"))).collect();

	wait_until(|| client.coordinator().waiting() == 2).await;
	client.transport.release();

	assert_eq!(join_statuses(handles).await, vec![StatusCode::UNAUTHORIZED; 3]);
	// The failing refresh call is not itself refreshed.
	assert_eq!(client.transport.refresh_calls(), 1);
	assert_eq!(client.transport.bearers("/items").len(), 3);
	assert_eq!(client.refresh_metrics.failures(), 1);
	assert_eq!(client.coordinator().generation(), 1);
	assert!(!client.coordinator().is_refreshing());
	assert_eq!(store.snapshot(), None);
	assert_eq!(logout.count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stale_401_after_failed_refresh_does_not_log_out_again() {
	let (client, store, logout) = gated_client(
		GatedTransport::new("A2", RefreshReply::Reject(StatusCode::UNAUTHORIZED)),
		RefreshConfig::default(),
	);
	// Sent with A1 before the episode starts, answered only after it failed.
	let slow = spawn_get(&client, ApiRequest::get(HELD_PATH));

	wait_until(|| client.transport.bearers(HELD_PATH).len() == 1).await;

	let fast = spawn_get(&client, ApiRequest::get("/items"));

	wait_until(|| client.coordinator().is_refreshing()).await;
	client.transport.release();
	wait_until(|| logout.count() == 1).await;
	client.transport.release_held();

	assert_eq!(join_statuses(vec![fast, slow]).await, vec![StatusCode::UNAUTHORIZED; 2]);
	assert_eq!(client.transport.refresh_calls(), 1);
	assert_eq!(client.transport.bearers(HELD_PATH).len(), 1);
	assert_eq!(client.refresh_metrics.failures(), 1);
	assert!(!client.coordinator().is_refreshing());
	assert_eq!(store.snapshot(), None);
	assert_eq!(logout.count(), 1);
}

async fn assert_episode_fails_once(
	client: &AuthClient<GatedTransport>,
	logout: &LogoutProbe,
) {
	let handles = (0..3).map(|_| spawn_get(client, ApiRequest::get("/items"))).collect();

	wait_until(|| client.coordinator().waiting() == 2).await;
	client.transport.release();

	assert_eq!(join_statuses(handles).await, vec![StatusCode::UNAUTHORIZED; 3]);
	assert_eq!(client.transport.refresh_calls(), 1);
	assert_eq!(client.transport.bearers("/items").len(), 3);
	assert_eq!(client.refresh_metrics.failures(), 1);
	assert_eq!(logout.count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn refresh_network_failure_logs_out_once() {
	let (client, store, logout) =
		gated_client(GatedTransport::new("A2", RefreshReply::Reset), RefreshConfig::default());

	assert_episode_fails_once(&client, &logout).await;
	assert_eq!(store.snapshot(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn non_json_refresh_response_logs_out_once() {
	let (client, store, logout) =
		gated_client(GatedTransport::new("A2", RefreshReply::Garbled), RefreshConfig::default());

	assert_episode_fails_once(&client, &logout).await;
	assert_eq!(store.snapshot(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unsaved_refresh_pair_logs_out_once() {
	let backing = seeded_store("A1", "R1");
	let (client, logout) = gated_client_over(
		GatedTransport::new("A2", ROTATE),
		RefreshConfig::default(),
		Arc::new(ReadOnlyStore(backing.clone())),
	);

	assert_episode_fails_once(&client, &logout).await;
	// The rotated pair never reached the store, so nothing replayed with it.
	assert_eq!(backing.snapshot(), None);
}

#[tokio::test]
async fn refresh_now_surfaces_each_failure_kind() {
	let (client, _store, _logout) =
		gated_client(GatedTransport::new("A2", RefreshReply::Reset), RefreshConfig::default());

	client.transport.release();

	assert!(matches!(
		client.refresh_now().await,
		Err(Error::Refresh(RefreshError::Request { .. }))
	));

	let (client, _store, _logout) =
		gated_client(GatedTransport::new("A2", RefreshReply::Garbled), RefreshConfig::default());

	client.transport.release();

	assert!(matches!(
		client.refresh_now().await,
		Err(Error::Refresh(RefreshError::MalformedResponse { .. }))
	));

	let (client, _logout) = gated_client_over(
		GatedTransport::new("A2", ROTATE),
		RefreshConfig::default(),
		Arc::new(ReadOnlyStore(seeded_store("A1", "R1"))),
	);

	client.transport.release();

	assert!(matches!(client.refresh_now().await, Err(Error::Refresh(RefreshError::Save(_)))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn late_arrival_joins_the_running_refresh() {
	let (client, _store, _logout) =
		gated_client(GatedTransport::new("A2", ROTATE), RefreshConfig::default());
	let mut handles: Vec<_> = (0..3).map(|_| spawn_get(&client, ApiRequest::get("/items"))).collect();

	wait_until(|| client.coordinator().waiting() == 2).await;
	handles.push(spawn_get(&client, ApiRequest::get("/items")));
	wait_until(|| client.coordinator().waiting() == 3).await;

	assert_eq!(client.transport.refresh_calls(), 1);

	client.transport.release();

	assert_eq!(join_statuses(handles).await, vec![StatusCode::OK; 4]);
	assert_eq!(client.transport.refresh_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_waiter_leaves_queue_without_disturbing_others() {
	let (client, _store, _logout) =
		gated_client(GatedTransport::new("A2", ROTATE), RefreshConfig::default());
	let leader = spawn_get(&client, ApiRequest::get("/items"));

	wait_until(|| client.coordinator().is_refreshing()).await;

	let token = CancellationToken::new();
	let cancelled = spawn_get(&client, ApiRequest::get("/items").with_cancellation(token.clone()));
	let kept = spawn_get(&client, ApiRequest::get("/items"));

	wait_until(|| client.coordinator().waiting() == 2).await;
	token.cancel();
	wait_until(|| client.coordinator().waiting() == 1).await;

	let cancelled = cancelled.await.expect("Cancelled task should not panic.");

	assert!(matches!(cancelled, Err(Error::Cancelled)));
	assert!(client.coordinator().is_refreshing());

	client.transport.release();

	assert_eq!(join_statuses(vec![leader, kept]).await, vec![StatusCode::OK; 2]);
	assert_eq!(client.transport.refresh_calls(), 1);
	assert_eq!(client.refresh_metrics.cancelled(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn abandoned_leader_hands_episode_to_a_waiter() {
	let (client, store, logout) =
		gated_client(GatedTransport::new("A2", ROTATE), RefreshConfig::default());
	let leader = spawn_get(&client, ApiRequest::get("/items"));

	wait_until(|| client.coordinator().is_refreshing()).await;

	let waiter = spawn_get(&client, ApiRequest::get("/items"));

	wait_until(|| client.coordinator().waiting() == 1).await;
	leader.abort();
	// The former waiter re-enters, leads, and issues the second refresh call.
	wait_until(|| client.transport.refresh_calls() == 2).await;
	client.transport.release();

	assert_eq!(join_statuses(vec![waiter]).await, vec![StatusCode::OK]);
	assert_eq!(client.coordinator().generation(), 1);
	assert_eq!(store.snapshot(), Some(Credentials::new("A2", "R2")));
	assert_eq!(logout.count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn zero_retry_bound_never_refreshes() {
	let (client, store, logout) = gated_client(
		GatedTransport::new("A2", ROTATE),
		RefreshConfig::default().with_max_retry(0),
	);
	let response =
		client.execute(ApiRequest::get("/items")).await.expect("Request should complete.");

	assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	assert_eq!(client.transport.refresh_calls(), 0);
	assert_eq!(store.snapshot(), Some(Credentials::new("A1", "R1")));
	assert_eq!(logout.count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn refresh_now_coalesces_with_running_episode() {
	let (client, _store, _logout) =
		gated_client(GatedTransport::new("A2", ROTATE), RefreshConfig::default());
	let leading = {
		let client = client.clone();

		tokio::spawn(async move { client.refresh_now().await })
	};

	wait_until(|| client.coordinator().is_refreshing()).await;

	let joining = {
		let client = client.clone();

		tokio::spawn(async move { client.refresh_now().await })
	};

	wait_until(|| client.coordinator().waiting() == 1).await;
	client.transport.release();

	assert_eq!(
		leading.await.expect("Task should not panic.").expect("Refresh should succeed."),
		RefreshOutcome::Led
	);
	assert_eq!(
		joining.await.expect("Task should not panic.").expect("Refresh should succeed."),
		RefreshOutcome::Joined
	);
	assert_eq!(client.transport.refresh_calls(), 1);
}

#[tokio::test]
async fn refresh_now_reports_failure_and_logs_out() {
	let (client, store, logout) = gated_client(
		GatedTransport::new("A2", RefreshReply::Reject(StatusCode::INTERNAL_SERVER_ERROR)),
		RefreshConfig::default(),
	);

	client.transport.release();

	let error = client.refresh_now().await.expect_err("Rejected refresh should fail.");

	assert!(matches!(error, Error::Refresh(RefreshError::Rejected { status: 500 })));
	assert_eq!(store.snapshot(), None);
	assert_eq!(logout.count(), 1);
}
