use serde::{Deserialize, Serialize};

/// A candidate match returned by the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Document id (metadata store key)
    pub id: String,

    /// Distance to the query as reported by the index, lower is closer
    /// (may be negative for dot-product indexes)
    pub distance: f64,
}

impl Neighbor {
    pub fn new(id: impl Into<String>, distance: f64) -> Self {
        Self {
            id: id.into(),
            distance,
        }
    }
}

/// `findNeighbors` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindNeighborsRequest {
    pub deployed_index_id: String,
    pub queries: Vec<NeighborQuery>,
}

/// One query vector and how many neighbors to return for it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborQuery {
    pub datapoint: IndexDatapoint,
    pub neighbor_count: usize,
}

/// Datapoint as understood by the index service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDatapoint {
    #[serde(default)]
    pub datapoint_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_vector: Vec<f32>,
}

/// `findNeighbors` response body: one neighbor list per query, in query order
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindNeighborsResponse {
    #[serde(default)]
    pub nearest_neighbors: Vec<NearestNeighbors>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearestNeighbors {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub neighbors: Vec<QueryNeighbor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryNeighbor {
    pub datapoint: IndexDatapoint,

    #[serde(default)]
    pub distance: f64,
}

impl From<QueryNeighbor> for Neighbor {
    fn from(n: QueryNeighbor) -> Self {
        Neighbor::new(n.datapoint.datapoint_id, n.distance)
    }
}
