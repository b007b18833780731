use serde::{Deserialize, Serialize};

/// Dense vector produced by the model; dimensionality is fixed by the model
pub type Embedding = Vec<f32>;

/// Prediction request: one instance per input text
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<String>,
}

impl PredictRequest {
    /// Single-item batch
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            instances: vec![text.into()],
        }
    }
}

/// Prediction response: one embedding per instance, in request order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Option<Embedding>>,

    #[serde(default)]
    pub deployed_model_id: Option<String>,
}
