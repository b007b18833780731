//! Post Search Embedding Client
//!
//! Turns query text into a dense vector by calling a hosted model endpoint.

mod client;
mod embedder;
mod types;

pub use client::VertexEmbeddingClient;
pub use embedder::Embedder;
pub use types::{Embedding, PredictRequest, PredictResponse};
