use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State as AxumState},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::{
    config::PublicClientConfig,
    domain::model::ContactPayload,
    http::{error::AppError, state::State},
};

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub message: &'static str,
}

/// Liveness only: never touches the database or the relay.
pub async fn health_handler() -> Json<Health> {
    Json(Health {
        status: "ok",
        message: "Backend running",
    })
}

#[derive(Serialize)]
pub struct ClientConfigResponse<'a> {
    pub success: bool,
    pub config: &'a PublicClientConfig,
}

pub async fn client_config_handler(AxumState(state): AxumState<Arc<State>>) -> impl IntoResponse {
    Json(ClientConfigResponse {
        success: true,
        config: &state.public_config,
    })
    .into_response()
}

pub async fn contact_handler(
    AxumState(state): AxumState<Arc<State>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    payload: Result<Json<ContactPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let response = state.contact.submit(payload, remote.ip().to_string()).await;
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    Ok((status, Json(response)))
}
