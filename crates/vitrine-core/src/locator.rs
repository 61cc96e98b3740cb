//! Locator parsing and rendering.
//!
//! A locator is any string that names displayable content. Parsing follows a
//! fixed precedence so that every input maps to exactly one [`Locator`]:
//!
//! 1. `data:` prefix: [`Locator::Inline`]
//! 2. `http` prefix without a `/dev-storage/` segment: [`Locator::External`]
//! 3. contains `/dev-storage/<id>/`: [`Locator::Internal`]
//! 4. anything else: [`Locator::Unrecognized`]
//!
//! Rendering a parsed locator with `Display` reproduces the input exactly.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::asset::{AssetId, DataUrl};

/// Path segment that marks an internal locator.
pub const DEV_STORAGE_SEGMENT: &str = "dev-storage";

static INTERNAL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"/dev-storage/([^/]+)/").ok());

/// A parsed locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// The locator is the content itself.
    Inline(String),
    /// An absolute reference outside the store.
    External(String),
    /// A reference to an asset held in local storage.
    Internal(InternalLocator),
    /// Matches no known shape; resolves to itself.
    Unrecognized(String),
}

impl Locator {
    /// Classifies a locator string.
    pub fn parse(value: &str) -> Self {
        if value.starts_with(DataUrl::PREFIX) {
            return Self::Inline(value.to_owned());
        }

        if value.starts_with("http") && !value.contains("/dev-storage/") {
            return Self::External(value.to_owned());
        }

        match InternalLocator::parse(value) {
            Some(internal) => Self::Internal(internal),
            None => Self::Unrecognized(value.to_owned()),
        }
    }

    /// Returns the asset id if this is an internal locator.
    pub fn asset_id(&self) -> Option<&AssetId> {
        match self {
            Self::Internal(internal) => Some(&internal.id),
            _ => None,
        }
    }

    /// Returns true if resolving this locator requires a storage lookup.
    pub fn needs_lookup(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(value) | Self::External(value) | Self::Unrecognized(value) => {
                f.write_str(value)
            }
            Self::Internal(internal) => fmt::Display::fmt(internal, f),
        }
    }
}

impl From<InternalLocator> for Locator {
    fn from(value: InternalLocator) -> Self {
        Self::Internal(value)
    }
}

/// `{origin}/dev-storage/{id}/{file_name}`.
///
/// `origin` is everything before the marker segment and may be empty.
/// `file_name` is kept in its encoded form so rendering is lossless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalLocator {
    /// Prefix preceding `/dev-storage/`.
    pub origin: String,
    /// Identifier of the stored asset.
    pub id: AssetId,
    /// URL-encoded original file name.
    pub file_name: String,
}

impl InternalLocator {
    /// Builds a locator for a freshly stored asset, encoding the file name.
    pub fn new(origin: &str, id: AssetId, file_name: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_owned(),
            id,
            file_name: encode_uri_component(file_name),
        }
    }

    /// Extracts the first `/dev-storage/<id>/` occurrence.
    pub fn parse(value: &str) -> Option<Self> {
        let captures = INTERNAL_PATTERN.as_ref()?.captures(value)?;
        let whole = captures.get(0)?;
        let id = captures.get(1)?;

        Some(Self {
            origin: value[..whole.start()].to_owned(),
            id: AssetId::new(id.as_str()),
            file_name: value[whole.end()..].to_owned(),
        })
    }

    /// Returns the decoded file name, or the raw segment if it is not valid UTF-8.
    pub fn decoded_file_name(&self) -> String {
        urlencoding::decode(&self.file_name)
            .map(|name| name.into_owned())
            .unwrap_or_else(|_| self.file_name.clone())
    }
}

impl fmt::Display for InternalLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{DEV_STORAGE_SEGMENT}/{}/{}",
            self.origin, self.id, self.file_name
        )
    }
}

/// Percent-encodes a path component, leaving `A-Z a-z 0-9 - _ . ! ~ * ' ( )` intact.
pub fn encode_uri_component(value: &str) -> String {
    urlencoding::encode(value)
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
}
