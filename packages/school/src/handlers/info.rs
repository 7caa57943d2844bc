use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::models::info::PortInfo;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/port",
    tag = "Info",
    operation_id = "getPort",
    summary = "Port and profile this instance runs with",
    responses((status = 200, description = "Server info", body = PortInfo)),
)]
#[instrument(skip(state))]
pub async fn port(State(state): State<AppState>) -> Json<PortInfo> {
    Json(PortInfo {
        port: state.config.server.port.to_string(),
        profile: state.config.server.profile.clone(),
    })
}
