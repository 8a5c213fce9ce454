//! Core domain types for the Upload-Post node.
//!
//! These describe what a single item asks for (operation, platforms, media)
//! and what the resolver hands to the dispatcher.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use node_api::BinaryData;
use regex::Regex;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::UploadPostError;

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// The kind of content being published. Exactly one per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    UploadPhotos,
    UploadVideo,
    UploadText,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Self::UploadPhotos, Self::UploadVideo, Self::UploadText];

    /// Endpoint path, relative to the API base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::UploadPhotos => "/upload_photos",
            Self::UploadVideo => "/upload",
            Self::UploadText => "/upload_text",
        }
    }

    pub fn method(self) -> Method {
        Method::POST
    }

    /// How the request body for this operation is encoded.
    pub fn encoding(self) -> BodyEncoding {
        match self {
            Self::UploadPhotos | Self::UploadVideo => BodyEncoding::Multipart,
            Self::UploadText => BodyEncoding::Json,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UploadPhotos => write!(f, "uploadPhotos"),
            Self::UploadVideo => write!(f, "uploadVideo"),
            Self::UploadText => write!(f, "uploadText"),
        }
    }
}

impl FromStr for Operation {
    type Err = UploadPostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploadPhotos" => Ok(Self::UploadPhotos),
            "uploadVideo" => Ok(Self::UploadVideo),
            "uploadText" => Ok(Self::UploadText),
            other => Err(UploadPostError::UnknownOperation(other.to_owned())),
        }
    }
}

/// Wire format of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// `application/json`; textual payloads only.
    Json,
    /// `multipart/form-data`; can carry file parts.
    Multipart,
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// A social network the content is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    LinkedIn,
    Threads,
    TikTok,
    X,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Self::Facebook,
        Self::Instagram,
        Self::LinkedIn,
        Self::Threads,
        Self::TikTok,
        Self::X,
        Self::YouTube,
    ];

    /// Whether the remote API accepts this platform for `operation`.
    pub fn supports(self, operation: Operation) -> bool {
        use Operation::*;
        match self {
            Self::Facebook | Self::LinkedIn => true,
            Self::Instagram | Self::TikTok => matches!(operation, UploadPhotos | UploadVideo),
            Self::Threads | Self::X => matches!(operation, UploadVideo | UploadText),
            Self::YouTube => operation == UploadVideo,
        }
    }

    /// Value sent in `platform[]`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::LinkedIn => "linkedin",
            Self::Threads => "threads",
            Self::TikTok => "tiktok",
            Self::X => "x",
            Self::YouTube => "youtube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UploadPostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UploadPostError::UnknownPlatform(s.to_owned()))
    }
}

/// Keep the platforms valid for `operation`, dropping duplicates while
/// preserving the caller's order.
pub fn filter_platforms(operation: Operation, requested: &[Platform]) -> Vec<Platform> {
    let mut kept: Vec<Platform> = Vec::with_capacity(requested.len());
    for &platform in requested {
        if platform.supports(operation) && !kept.contains(&platform) {
            kept.push(platform);
        }
    }
    kept
}

// ---------------------------------------------------------------------------
// MediaReference
// ---------------------------------------------------------------------------

static BINARY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\{\{\s*\$binary\.([A-Za-z0-9_.\-]+)\s*\}\}|\$binary\.([A-Za-z0-9_.\-]+))$")
        .expect("binary marker pattern is valid")
});

/// A photo or video as supplied by the user: a remote URL, or the name of a
/// binary attachment on the current item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaReference {
    Url { url: String },
    Binary { property: String },
}

impl MediaReference {
    /// Parse a raw parameter value.
    ///
    /// Values starting with `http` are URLs and are kept verbatim.
    /// `{{ $binary.name }}` and `$binary.name` name an attachment, as does any
    /// other non-empty string. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.starts_with("http") {
            return Some(Self::Url { url: trimmed.to_owned() });
        }

        let property = BINARY_MARKER
            .captures(trimmed)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str())
            .unwrap_or(trimmed);

        Some(Self::Binary { property: property.to_owned() })
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url { url: url.into() }
    }

    pub fn binary(property: impl Into<String>) -> Self {
        Self::Binary { property: property.into() }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// A single request body value.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    List(Vec<String>),
    Media(MediaReference),
    /// A binary media reference after the host resolved it.
    File(BinaryData),
}

impl PayloadValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered map from API field name to value.
///
/// Order matters for multipart bodies, where `photos[0]`, `photos[1]`, …
/// must reach the API in the user's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPayload {
    fields: Vec<(String, PayloadValue)>,
}

impl RequestPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: PayloadValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayloadValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut PayloadValue)> {
        self.fields.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Everything the dispatcher needs to send one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub operation: Operation,
    pub endpoint: &'static str,
    pub method: Method,
    pub payload: RequestPayload,
}
