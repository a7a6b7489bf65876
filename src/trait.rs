use crate::types::{Channel, Cursor, Message, Page, Playlist, TrackId};
use crate::Result;
use async_trait::async_trait;

/// Read-only operations consumed from the chat service.
///
/// Both calls are single page reads; pagination is driven by
/// [`CursorIterator`](crate::CursorIterator).
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockChatClient`
/// that implements this trait using the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait ChatClient {
    /// Fetch one page of the channels and groups visible to the token.
    async fn list_channels(&self, cursor: &Cursor) -> Result<Page<Channel>>;

    /// Fetch one page of a channel's history, most recent messages first.
    async fn channel_history(&self, channel_id: &str, cursor: &Cursor) -> Result<Page<Message>>;
}

/// Operations consumed from the music service.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockMusicClient`
/// that implements this trait using the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait MusicClient {
    /// Fetch one page of the authenticated user's playlists.
    async fn list_playlists(&self, cursor: &Cursor) -> Result<Page<Playlist>>;

    /// Append tracks to the end of a playlist, in the given order.
    ///
    /// The service accepts at most [`MAX_TRACKS_PER_REQUEST`] tracks per call.
    async fn add_tracks(&self, playlist_id: &str, tracks: &[TrackId]) -> Result<()>;
}

/// Upper bound the music service places on a single `add_tracks` call.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;
