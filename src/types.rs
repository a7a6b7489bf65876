//! Data types shared by the chat side and the music side of a scrape.
//!
//! This module contains the pagination primitives ([`Cursor`], [`Page`]) and
//! the small records both remote services hand back.

use serde::{Deserialize, Serialize};
use std::fmt;

// ================================================================================================
// PAGINATION
// ================================================================================================

/// Opaque, service-issued pagination position.
///
/// An empty cursor means "no further pages" when it comes back from a service,
/// and "start from the first page" when it is sent to one. Cursors from different
/// services are not comparable.
///
/// # Examples
///
/// ```rust
/// use spotctl::Cursor;
///
/// let start = Cursor::start();
/// assert!(start.is_end());
///
/// let next = Cursor::from("dXNlcjpVMDYxTkZUVDI=");
/// assert!(!next.is_end());
/// assert_eq!(next.as_str(), "dXNlcjpVMDYxTkZUVDI=");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// The cursor to send for the first page of a listing.
    pub fn start() -> Self {
        Self(String::new())
    }

    /// Whether this cursor marks the end of a listing.
    pub fn is_end(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<Option<String>> for Cursor {
    fn from(value: Option<String>) -> Self {
        Self(value.unwrap_or_default())
    }
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page, in service order
    pub items: Vec<T>,
    /// Cursor for the following page; empty when this is the last page
    pub next_cursor: Cursor,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: impl Into<Cursor>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.into(),
        }
    }

    /// A page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, Cursor::start())
    }
}

// ================================================================================================
// CHAT SIDE
// ================================================================================================

/// A channel or group as listed by the chat service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

impl Channel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A single message from a channel's history.
///
/// Messages are consumed once by the extractor and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Raw message body, including the chat service's `<...>` link markup
    pub text: String,
    /// Channel the message was read from
    pub channel_id: String,
}

impl Message {
    pub fn new(text: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            channel_id: channel_id.into(),
        }
    }
}

// ================================================================================================
// MUSIC SIDE
// ================================================================================================

/// A playlist owned or followed by the authenticated music-service user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

impl Playlist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Canonical track identifier, e.g. `4uLU6hMCjMI75M1A2tKUQC`.
///
/// Identifiers are not deduplicated: the same track posted twice yields two
/// equal `TrackId`s, and both are committed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `spotify:track:<id>` form the playlist API expects.
    pub fn to_uri(&self) -> String {
        format!("spotify:track:{}", self.0)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for TrackId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
