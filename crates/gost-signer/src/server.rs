use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SignerServerError;
use crate::signing::PayloadSigner;

#[derive(Clone)]
pub struct AppState {
    /// `None` when the service was started without a certificate PIN.
    pub signer: Option<Arc<dyn PayloadSigner>>,
}

impl AppState {
    fn signer(&self) -> Result<&dyn PayloadSigner, SignerServerError> {
        self.signer.as_deref().ok_or(SignerServerError::Unavailable)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignRequest {
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignResponse {
    /// Reversed signature bytes, base64url without padding.
    pub signature: String,
    pub algorithm: String,
    pub container_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerResponse {
    pub container_hash: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(|| async move { (StatusCode::OK, "Ok").into_response() }))
        .route("/sign", post(sign_handler))
        .route("/container", get(container_handler))
        .with_state(state)
}

pub async fn run(host: String, port: u16, signer: Option<Arc<dyn PayloadSigner>>) -> Result<()> {
    let router = router(AppState { signer });

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("binding {host}:{port}"))?;
    info!(addr = %listener.local_addr()?, "signing service listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("serving signing requests")?;

    Ok(())
}

async fn sign_handler(
    State(state): State<AppState>,
    request: Result<Json<SignRequest>, JsonRejection>,
) -> Result<Json<SignResponse>, SignerServerError> {
    let Json(request) =
        request.map_err(|rejection| SignerServerError::BadRequest(rejection.body_text()))?;
    let signer = state.signer()?;

    let signature = signer.sign(&request.data).await?;
    let container_hash = signer.key_id().await?;
    debug!(container_hash = %container_hash, "payload signed");

    Ok(Json(SignResponse {
        signature,
        algorithm: signer.algorithm().to_string(),
        container_hash,
    }))
}

async fn container_handler(
    State(state): State<AppState>,
) -> Result<Json<ContainerResponse>, SignerServerError> {
    let container_hash = state.signer()?.key_id().await?;
    Ok(Json(ContainerResponse { container_hash }))
}
