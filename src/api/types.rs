//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::data::store::Insight;

#[derive(Debug, Clone, Deserialize)]
pub struct InsightRequest {
    pub theme_type: String,
    pub theme_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightDto {
    pub key: String,
    pub found: bool,
    #[serde(flatten)]
    pub insight: Insight,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReloadDto {
    pub entries: usize,
}
