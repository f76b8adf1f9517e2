use serde::Deserialize;

/// Bot API envelope; only the fields needed to judge delivery.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
}
