//! Domain identifiers (strongly-typed IDs).
//!
//! - `ArtifactId`: UUID v4、成果物ファイル名 `<uuid>.msg` の元
//! - `ContentId`: ULID ベース、HTML に埋め込む画像の Content-ID
//!
//! 衝突回避は UUID の一意性に任せる（既存ファイルとの照合はしない）。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;
use uuid::Uuid;

/// File extension of a composed message artifact.
pub const ARTIFACT_EXTENSION: &str = "msg";

/// Identifier of a composed message artifact.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// `<uuid>.msg`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, ARTIFACT_EXTENSION)
    }
}

impl From<Uuid> for ArtifactId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Content-ID of an inline part, without the surrounding angle brackets.
///
/// The HTML body references it as `cid:<value>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// `<ulid>@<domain>`
    pub fn new(ulid: Ulid, domain: &str) -> Self {
        Self(format!("{}@{}", ulid, domain))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
