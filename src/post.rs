use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

use crate::error::FeedError;

/// One social post as delivered by the feed endpoint.
///
/// Every field is optional. Empty strings and non-string values are treated
/// as absent, so a record never fails to deserialize on field content. URLs
/// that are not absolute `http(s)` are treated as absent too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, rename = "created_time", deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(default, rename = "full_picture", deserialize_with = "lenient_url")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_url")]
    pub permalink_url: Option<String>,
}

impl PostRecord {
    /// Builds a record from an arbitrary list item. Anything that is not an
    /// object becomes an empty record.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// Envelope of the feed response. Only `posts` drives behaviour; the rest is
/// what the feed server reports about its own cache and fallback state.
#[derive(Debug, Deserialize)]
pub struct FeedEnvelope {
    #[serde(default)]
    pub posts: Option<Value>,
    #[serde(default)]
    pub cached: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fallback_reason: Option<String>,
}

/// Parses a response body into post records, in response order.
pub fn parse_feed(body: &[u8]) -> Result<Vec<PostRecord>, FeedError> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(FeedError::Shape("body is not an object"));
    }
    let envelope: FeedEnvelope = serde_json::from_value(value)?;

    if let Some(reason) = envelope.fallback_reason.as_deref() {
        let cached = envelope
            .cached
            .as_ref()
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        tracing::debug!(
            source = envelope.source.as_deref().unwrap_or(""),
            cached,
            reason,
            "feed server reported a fallback"
        );
    }

    match envelope.posts {
        Some(Value::Array(items)) => Ok(items.into_iter().map(PostRecord::from_value).collect()),
        Some(_) => Err(FeedError::Shape("`posts` is not a list")),
        None => Err(FeedError::Shape("`posts` is missing")),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.filter(|raw| is_web_url(raw)))
}

pub fn is_web_url(raw: &str) -> bool {
    Url::parse(raw.trim()).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
