//! HTTP routes for device management and transaction signing.
//!
//! Successful responses are wrapped as `{"data": ...}`, failures as
//! `{"errors": [...]}`. Device ids must be UUIDs and sign data must be
//! non-empty; both are checked here before anything reaches the core.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chainsign_core::{Device, DeviceService, DeviceStore, NewDevice, SignatureResult, SigningError, TransactionService};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

const INVALID_DEVICE_ID: &str = "Invalid Device ID. UUID format expected";

/// Shared handler state: the two services over one registry.
#[derive(Clone)]
pub struct AppState {
    devices: Arc<DeviceService>,
    transactions: Arc<TransactionService>,
}

impl AppState {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self {
            devices: Arc::new(DeviceService::new(store.clone())),
            transactions: Arc::new(TransactionService::new(store)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v0/health", get(health))
        .route("/api/v0/devices", post(create_device).get(list_devices))
        .route("/api/v0/devices/:device_id", get(get_device))
        .route("/api/v0/devices/:device_id/sign", post(sign_transaction))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CreateDeviceRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub algorithm: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignTransactionRequest {
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Serialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// Failure of an HTTP request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error("{}", .0.join(", "))]
    BadRequest(Vec<String>),
    #[error("internal error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Signing(e) => match e {
                SigningError::DeviceNotFound(_) => StatusCode::NOT_FOUND,
                SigningError::DeviceAlreadyExists(_) => StatusCode::CONFLICT,
                SigningError::InvalidAlgorithm(_) | SigningError::InvalidDeviceId(_) | SigningError::EmptyData => {
                    StatusCode::BAD_REQUEST
                }
                SigningError::SigningFailure(_) | SigningError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "rejected request body");
        ApiError::BadRequest(vec!["Invalid JSON".into()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let errors = match self {
            ApiError::BadRequest(errors) => errors,
            other if status.is_server_error() => {
                // Internal details stay in the log.
                error!(error = %other, "request failed");
                vec!["internal error".to_string()]
            }
            other => vec![other.to_string()],
        };
        (status, Json(ErrorEnvelope { errors })).into_response()
    }
}

fn data<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(DataEnvelope { data })).into_response()
}

fn validate_device_id(id: &str) -> Result<(), ApiError> {
    Uuid::parse_str(id).map(|_| ()).map_err(|_| ApiError::BadRequest(vec![INVALID_DEVICE_ID.into()]))
}

/// Run core work off the async executor. Signing is CPU-bound, and reads can
/// wait on a device lock that a signer holds.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SigningError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => Ok(result?),
        Err(join_err) => {
            error!(error = %join_err, "blocking task failed");
            Err(ApiError::Internal)
        }
    }
}

async fn health() -> Response {
    data(StatusCode::OK, Health { status: "pass", version: "v0" })
}

async fn create_device(
    State(state): State<AppState>,
    body: Result<Json<CreateDeviceRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body?;
    validate_device_id(&req.id)?;

    let request = NewDevice { id: req.id, algorithm: req.algorithm, label: req.label };
    let devices = state.devices.clone();
    let device: Device = blocking(move || devices.create_device(request)).await?;
    Ok(data(StatusCode::CREATED, device))
}

async fn list_devices(State(state): State<AppState>) -> Result<Response, ApiError> {
    let devices = state.devices.clone();
    let all: Vec<Device> = blocking(move || devices.find_all()).await?;
    Ok(data(StatusCode::OK, all))
}

async fn get_device(State(state): State<AppState>, Path(device_id): Path<String>) -> Result<Response, ApiError> {
    validate_device_id(&device_id)?;
    let devices = state.devices.clone();
    let device: Device = blocking(move || devices.get_device(&device_id)).await?;
    Ok(data(StatusCode::OK, device))
}

async fn sign_transaction(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    body: Result<Json<SignTransactionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    validate_device_id(&device_id)?;
    let Json(req) = body?;
    if req.data.is_empty() {
        return Err(SigningError::EmptyData.into());
    }

    let transactions = state.transactions.clone();
    let result: SignatureResult = blocking(move || transactions.sign_transaction(&device_id, &req.data)).await?;
    Ok(data(StatusCode::OK, result))
}
