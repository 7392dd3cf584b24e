use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct VideoQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub id: Option<String>,
}
