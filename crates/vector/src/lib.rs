//! Post Search Vector Index Client
//!
//! Nearest-neighbor lookup against a hosted approximate-nearest-neighbor
//! service. The index itself is built offline; this crate only queries it.

mod client;
mod index;
mod types;

pub use client::MatchingEngineClient;
pub use index::NeighborIndex;
pub use types::{
    FindNeighborsRequest, FindNeighborsResponse, IndexDatapoint, Neighbor, NeighborQuery,
    NearestNeighbors, QueryNeighbor,
};
