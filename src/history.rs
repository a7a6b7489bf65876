use crate::iterator::{AsyncPaginatedIterator, CursorIterator};
use crate::r#trait::ChatClient;
use crate::types::{Cursor, Message};
use crate::Result;

use async_trait::async_trait;
use futures::FutureExt;

/// Lazy scan over one channel's message history.
///
/// Every scan starts from the most recent page; nothing is remembered between
/// runs. A failed page fetch is returned from [`next`](AsyncPaginatedIterator::next)
/// and ends the scan, so a truncated history is never mistaken for a complete one.
pub struct HistoryScanner<'a> {
    channel_id: String,
    pages: CursorIterator<'a, Message>,
    messages_seen: u64,
}

impl<'a> HistoryScanner<'a> {
    pub fn new<C: ChatClient>(chat: &'a C, channel_id: impl Into<String>) -> Self {
        let channel_id = channel_id.into();
        let fetch_id = channel_id.clone();
        let pages = CursorIterator::new(move |cursor: Cursor| {
            let channel_id = fetch_id.clone();
            async move { chat.channel_history(&channel_id, &cursor).await }.boxed_local()
        });

        Self {
            channel_id,
            pages,
            messages_seen: 0,
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn messages_seen(&self) -> u64 {
        self.messages_seen
    }
}

#[async_trait(?Send)]
impl<'a> AsyncPaginatedIterator<Message> for HistoryScanner<'a> {
    async fn next(&mut self) -> Result<Option<Message>> {
        let message = self.pages.next().await.map_err(|e| {
            log::warn!(
                "History scan of {} stopped after {} messages: {e}",
                self.channel_id,
                self.messages_seen
            );
            e
        })?;

        if message.is_some() {
            self.messages_seen += 1;
        }
        Ok(message)
    }

    fn pages_fetched(&self) -> u32 {
        self.pages.pages_fetched()
    }
}
