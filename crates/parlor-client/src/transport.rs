//! HTTP transport for the session controller.
//!
//! Provides [`HttpBackend`], which executes [`BackendRequest`]s against the
//! REST backend over reqwest. This is a thin layer that just moves requests
//! and responses over channels - session logic remains in the Sans-IO
//! [`crate::Controller`].
//!
//! Each request runs on its own task, so a slow history poll never delays
//! a send. Responses come back in completion order; the controller's
//! request-id ledger makes that safe.

use std::time::Duration;

use parlor_core::BackendError;
use parlor_proto::api::ErrorBody;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::event::{ApiCall, ApiResult, BackendRequest, BackendResponse};

/// TCP connect timeout for backend calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-request timeout, response body included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Channel capacity for both directions.
const CHANNEL_CAPACITY: usize = 32;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The base URL did not parse.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("client construction failed: {0}")]
    Client(String),
}

/// Handle to a running HTTP backend.
///
/// Push [`BackendRequest`]s into `to_server`, read [`BackendResponse`]s
/// from `from_server`, and feed them back to the controller as
/// [`crate::SessionEvent::Response`] events.
pub struct HttpBackend {
    /// Send requests to the backend.
    pub to_server: mpsc::Sender<BackendRequest>,

    /// Receive completions from the backend.
    pub from_server: mpsc::Receiver<BackendResponse>,

    /// Abort handle to stop the dispatch task.
    abort_handle: tokio::task::AbortHandle,
}

impl HttpBackend {
    /// Stop the dispatch loop. In-flight requests are dropped.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Build an [`HttpBackend`] for the given base URL.
///
/// Must be called within a tokio runtime: the dispatch loop is spawned
/// immediately. The URL gains a trailing slash if it lacks one, so
/// endpoint paths join onto it instead of replacing its last segment.
///
/// # Errors
///
/// Returns [`TransportError`] if the URL does not parse or the client
/// cannot be built.
pub fn connect(base_url: &str) -> Result<HttpBackend, TransportError> {
    let mut base_url = base_url.to_owned();
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    let base = Url::parse(&base_url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| TransportError::Client(e.to_string()))?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<BackendRequest>(CHANNEL_CAPACITY);
    let (from_server_tx, from_server_rx) = mpsc::channel::<BackendResponse>(CHANNEL_CAPACITY);

    let handle = tokio::spawn(run_requests(client, base, to_server_rx, from_server_tx));

    Ok(HttpBackend {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Dispatch loop: one spawned task per request.
async fn run_requests(
    client: reqwest::Client,
    base: Url,
    mut requests: mpsc::Receiver<BackendRequest>,
    responses: mpsc::Sender<BackendResponse>,
) {
    while let Some(request) = requests.recv().await {
        let client = client.clone();
        let base = base.clone();
        let responses = responses.clone();

        tokio::spawn(async move {
            let BackendRequest { id, call } = request;
            let result = perform(&client, &base, call).await;
            if responses.send(BackendResponse { id, result }).await.is_err() {
                tracing::debug!(request = %id, "response receiver dropped, discarding");
            }
        });
    }
}

/// Execute one endpoint call and wrap its typed outcome.
async fn perform(client: &reqwest::Client, base: &Url, call: ApiCall) -> ApiResult {
    match call {
        ApiCall::GetCurrentUser => {
            ApiResult::CurrentUser(get_json(client, base, "get_current_user").await)
        },
        ApiCall::CreateRoom(body) => {
            ApiResult::RoomCreated(post_json(client, base, "create_room", &body).await)
        },
        ApiCall::CheckRoomPassword(body) => {
            ApiResult::PasswordChecked(post_json(client, base, "check_room_password", &body).await)
        },
        ApiCall::GetRoomInfo { room_id } => {
            ApiResult::RoomInfo(get_json(client, base, &format!("get_room_info/{room_id}")).await)
        },
        ApiCall::JoinRoom(body) => {
            ApiResult::Joined(post_json(client, base, "join_room", &body).await)
        },
        ApiCall::CheckWritePermission(body) => ApiResult::WriteChecked(
            post_json(client, base, "check_write_permission", &body).await,
        ),
        ApiCall::SendMessage(body) => {
            ApiResult::MessageSent(post_json(client, base, "send_message", &body).await)
        },
        ApiCall::GetMessages(body) => {
            ApiResult::Messages(post_json(client, base, "get_messages", &body).await)
        },
        ApiCall::GetRooms => ApiResult::Rooms(get_json(client, base, "get_rooms").await),
        ApiCall::UpdateUsername(body) => {
            ApiResult::UsernameUpdated(post_json(client, base, "update_username", &body).await)
        },
    }
}

async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    base: &Url,
    path: &str,
) -> Result<T, BackendError> {
    let url = join_url(base, path)?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| BackendError::Network(e.to_string()))?;
    decode(response).await
}

async fn post_json<T: DeserializeOwned, B: Serialize>(
    client: &reqwest::Client,
    base: &Url,
    path: &str,
    body: &B,
) -> Result<T, BackendError> {
    let url = join_url(base, path)?;
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| BackendError::Network(e.to_string()))?;
    decode(response).await
}

fn join_url(base: &Url, path: &str) -> Result<Url, BackendError> {
    base.join(path)
        .map_err(|e| BackendError::Network(format!("invalid endpoint url: {e}")))
}

/// Turn an HTTP response into a typed body or a [`BackendError`].
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Network(format!("bad response body: {e}")));
    }

    let detail = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    Err(map_status(status, detail))
}

/// The status-code contract of the backend.
fn map_status(status: StatusCode, detail: String) -> BackendError {
    match status {
        StatusCode::NOT_FOUND => BackendError::RoomNotFound,
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
        StatusCode::FORBIDDEN => BackendError::WritePermissionDenied,
        StatusCode::BAD_REQUEST => BackendError::Rejected(detail),
        _ => BackendError::Network(format!("unexpected status {status}: {detail}")),
    }
}
