use postsearch_common::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Separator of the tags field in a stored record
pub const TAG_DELIMITER: char = '|';

const FIELD_TITLE: &str = "title";
const FIELD_BODY: &str = "body";
const FIELD_TAGS: &str = "tags";

/// Stored document fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Title of the post
    pub title: String,

    /// Body content of the post
    pub body: String,

    /// Tags associated with the post
    pub tags: Vec<String>,
}

impl Post {
    pub fn new(title: impl Into<String>, body: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tags,
        }
    }

    /// Decode a flat hash as returned by HGETALL.
    ///
    /// Returns `None` for an absent key (empty hash) or a record missing any
    /// of the three fields or holding a value that is not UTF-8.
    pub fn from_fields(fields: &HashMap<String, Vec<u8>>) -> Option<Self> {
        let text = |name: &str| -> Option<String> { String::from_utf8(fields.get(name)?.clone()).ok() };

        Some(Self {
            title: text(FIELD_TITLE)?,
            body: text(FIELD_BODY)?,
            tags: decode_tags(&text(FIELD_TAGS)?),
        })
    }

    /// Encode as hash field/value pairs for HSET
    pub fn to_fields(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            (FIELD_TITLE, self.title.clone()),
            (FIELD_BODY, self.body.clone()),
            (FIELD_TAGS, encode_tags(&self.tags)?),
        ])
    }
}

/// Split a stored tags field. An empty field means no tags.
pub fn decode_tags(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(TAG_DELIMITER).map(str::to_string).collect()
}

/// Join tags for storage; a tag containing the delimiter would not survive
/// the round trip and is rejected.
pub fn encode_tags(tags: &[String]) -> Result<String> {
    if let Some(bad) = tags.iter().find(|t| t.contains(TAG_DELIMITER) || t.is_empty()) {
        return Err(SearchError::invalid_argument(format!(
            "Tag {:?} is empty or contains '{}'",
            bad, TAG_DELIMITER
        )));
    }
    Ok(tags.join(&TAG_DELIMITER.to_string()))
}

/// One document as produced by the offline export, keyed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,

    #[serde(flatten)]
    pub post: Post,
}
