use serde::Serialize;

/// Which port and profile this instance was started with.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PortInfo {
    #[schema(example = "8080")]
    pub port: String,
    #[schema(example = "default")]
    pub profile: String,
}
