#![allow(dead_code)]
use async_trait::async_trait;
use spotctl::{
    Channel, ChatClient, Cursor, Message, MusicClient, Page, Playlist, Result, ScrapeError, TrackId,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Remote calls in the order the fakes saw them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ChannelPage(usize),
    HistoryPage(usize),
    PlaylistPage(usize),
    Commit(usize),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Cursor that requests page `index` of a listing; page 0 uses the empty cursor.
fn cursor_for(prefix: &str, index: usize) -> Cursor {
    if index == 0 {
        Cursor::start()
    } else {
        Cursor::from(format!("{prefix}-{index}"))
    }
}

fn page_index(cursor: &Cursor) -> usize {
    if cursor.is_end() {
        return 0;
    }
    cursor
        .as_str()
        .rsplit('-')
        .next()
        .and_then(|n| n.parse().ok())
        .expect("cursor issued by a fake")
}

fn paged<T: Clone>(pages: &[Vec<T>], prefix: &str, index: usize) -> Page<T> {
    let next = if index + 1 < pages.len() {
        cursor_for(prefix, index + 1)
    } else {
        Cursor::start()
    };
    Page::new(pages[index].clone(), next)
}

/// In-memory chat service with paginated channels and histories.
pub struct FakeChat {
    channel_pages: Vec<Vec<Channel>>,
    history_pages: HashMap<String, Vec<Vec<String>>>,
    failing_history_page: Option<usize>,
    events: EventLog,
}

impl FakeChat {
    pub fn new(events: EventLog) -> Self {
        Self {
            channel_pages: vec![vec![]],
            history_pages: HashMap::new(),
            failing_history_page: None,
            events,
        }
    }

    /// Channel listing, one inner vec of `(id, name)` per page.
    pub fn with_channel_pages(mut self, pages: Vec<Vec<(&str, &str)>>) -> Self {
        self.channel_pages = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|(id, name)| Channel::new(id, name))
                    .collect()
            })
            .collect();
        self
    }

    /// History of one channel, one inner vec of message bodies per page.
    pub fn with_history(mut self, channel_id: &str, pages: Vec<Vec<String>>) -> Self {
        self.history_pages.insert(channel_id.to_string(), pages);
        self
    }

    pub fn failing_history_page(mut self, index: usize) -> Self {
        self.failing_history_page = Some(index);
        self
    }

    pub fn history_pages_requested(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::HistoryPage(_)))
            .count()
    }

    pub fn channel_pages_requested(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::ChannelPage(_)))
            .count()
    }
}

#[async_trait(?Send)]
impl ChatClient for FakeChat {
    async fn list_channels(&self, cursor: &Cursor) -> Result<Page<Channel>> {
        let index = page_index(cursor);
        self.events.borrow_mut().push(Event::ChannelPage(index));
        Ok(paged(&self.channel_pages, "channels", index))
    }

    async fn channel_history(&self, channel_id: &str, cursor: &Cursor) -> Result<Page<Message>> {
        let index = page_index(cursor);
        self.events.borrow_mut().push(Event::HistoryPage(index));

        if self.failing_history_page == Some(index) {
            return Err(ScrapeError::Transport(
                "conversations.history: ratelimited".to_string(),
            ));
        }

        let pages = self
            .history_pages
            .get(channel_id)
            .cloned()
            .unwrap_or_else(|| vec![vec![]]);
        let page = paged(&pages, "history", index);
        Ok(Page::new(
            page.items
                .into_iter()
                .map(|text| Message::new(text, channel_id))
                .collect(),
            page.next_cursor,
        ))
    }
}

/// In-memory music service that records every `add_tracks` call.
pub struct FakeMusic {
    playlist_pages: Vec<Vec<Playlist>>,
    commits: RefCell<Vec<(String, Vec<TrackId>)>>,
    reject_commit: Option<usize>,
    events: EventLog,
}

impl FakeMusic {
    pub fn new(events: EventLog) -> Self {
        Self {
            playlist_pages: vec![vec![]],
            commits: RefCell::new(Vec::new()),
            reject_commit: None,
            events,
        }
    }

    pub fn with_playlist_pages(mut self, pages: Vec<Vec<(&str, &str)>>) -> Self {
        self.playlist_pages = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|(id, name)| Playlist::new(id, name))
                    .collect()
            })
            .collect();
        self
    }

    /// Reject the `add_tracks` call with this zero-based index.
    pub fn rejecting_commit(mut self, index: usize) -> Self {
        self.reject_commit = Some(index);
        self
    }

    pub fn commit_sizes(&self) -> Vec<usize> {
        self.commits.borrow().iter().map(|(_, t)| t.len()).collect()
    }

    pub fn committed_ids(&self) -> Vec<String> {
        self.commits
            .borrow()
            .iter()
            .flat_map(|(_, tracks)| tracks.iter().map(|t| t.as_str().to_string()))
            .collect()
    }

    pub fn commit_playlists(&self) -> Vec<String> {
        self.commits.borrow().iter().map(|(p, _)| p.clone()).collect()
    }
}

#[async_trait(?Send)]
impl MusicClient for FakeMusic {
    async fn list_playlists(&self, cursor: &Cursor) -> Result<Page<Playlist>> {
        let index = page_index(cursor);
        self.events.borrow_mut().push(Event::PlaylistPage(index));
        Ok(paged(&self.playlist_pages, "playlists", index))
    }

    async fn add_tracks(&self, playlist_id: &str, tracks: &[TrackId]) -> Result<()> {
        let call = self.events.borrow().iter().filter(|e| matches!(e, Event::Commit(_))).count();
        self.events.borrow_mut().push(Event::Commit(tracks.len()));

        if self.reject_commit == Some(call) {
            return Err(ScrapeError::Transport(
                "POST /playlists/PL/tracks returned HTTP 403".to_string(),
            ));
        }

        self.commits
            .borrow_mut()
            .push((playlist_id.to_string(), tracks.to_vec()));
        Ok(())
    }
}

/// `count` message bodies, each linking a distinct track `T0`, `T1`, ...
pub fn track_messages(start: usize, count: usize) -> Vec<String> {
    (start..start + count)
        .map(|i| format!("check this out <spotify:track:T{i}>"))
        .collect()
}
