//! Name-to-identifier resolution for the source channel and destination playlist.
//!
//! Both lookups walk the full cursor chain of their listing and stop at the
//! first exact name match, so they cost one pass over the listing per run.

use crate::iterator::{AsyncPaginatedIterator, CursorIterator};
use crate::r#trait::{ChatClient, MusicClient};
use crate::types::{Channel, Cursor, Playlist};
use crate::{Result, ScrapeError};
use futures::FutureExt;

/// Iterate over every channel visible to the chat client.
pub fn channels<C: ChatClient>(chat: &C) -> CursorIterator<'_, Channel> {
    CursorIterator::new(move |cursor: Cursor| {
        async move { chat.list_channels(&cursor).await }.boxed_local()
    })
}

/// Iterate over every playlist of the music-service user.
pub fn playlists<M: MusicClient>(music: &M) -> CursorIterator<'_, Playlist> {
    CursorIterator::new(move |cursor: Cursor| {
        async move { music.list_playlists(&cursor).await }.boxed_local()
    })
}

/// Resolve a channel name to its identifier.
///
/// Fails with [`ScrapeError::NotFound`] if no page of the listing contains a
/// channel with exactly this name.
pub async fn resolve_channel<C: ChatClient>(chat: &C, name: &str) -> Result<String> {
    let mut listing = channels(chat);
    let found = listing.find(|channel| channel.name == name).await?;

    match found {
        Some(channel) => {
            log::debug!(
                "Resolved channel '{name}' to {} after {} page(s)",
                channel.id,
                listing.pages_fetched()
            );
            Ok(channel.id)
        }
        None => Err(ScrapeError::NotFound {
            kind: "channel",
            name: name.to_string(),
        }),
    }
}

/// Resolve a playlist name to its identifier.
///
/// Fails with [`ScrapeError::NotFound`] if no page of the listing contains a
/// playlist with exactly this name.
pub async fn resolve_playlist<M: MusicClient>(music: &M, name: &str) -> Result<String> {
    let mut listing = playlists(music);
    let found = listing.find(|playlist| playlist.name == name).await?;

    match found {
        Some(playlist) => {
            log::debug!(
                "Resolved playlist '{name}' to {} after {} page(s)",
                playlist.id,
                listing.pages_fetched()
            );
            Ok(playlist.id)
        }
        None => Err(ScrapeError::NotFound {
            kind: "playlist",
            name: name.to_string(),
        }),
    }
}
