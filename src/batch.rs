use crate::r#trait::{MusicClient, MAX_TRACKS_PER_REQUEST};
use crate::types::TrackId;
use crate::{Result, ScrapeError};

/// Number of tracks committed per `add_tracks` call.
pub const BATCH_SIZE: usize = MAX_TRACKS_PER_REQUEST;

/// Accumulates tracks and appends them to a playlist in fixed-size groups.
///
/// A batch is committed as soon as it is full; whatever is left is committed by
/// [`flush`](Self::flush) once the input ends. Batches go out one at a time in
/// the order their tracks were added.
pub struct BatchCommitter<'a, M: MusicClient> {
    music: &'a M,
    playlist_id: String,
    capacity: usize,
    batch: Vec<TrackId>,
    committed: usize,
    batches_committed: usize,
}

impl<'a, M: MusicClient> BatchCommitter<'a, M> {
    pub fn new(music: &'a M, playlist_id: impl Into<String>) -> Self {
        Self::with_capacity(music, playlist_id, BATCH_SIZE)
    }

    /// Create a committer with a smaller batch size.
    ///
    /// The capacity is clamped to `1..=MAX_TRACKS_PER_REQUEST`, the most the
    /// music service accepts in one call.
    pub fn with_capacity(music: &'a M, playlist_id: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_TRACKS_PER_REQUEST);
        Self {
            music,
            playlist_id: playlist_id.into(),
            capacity,
            batch: Vec::with_capacity(capacity),
            committed: 0,
            batches_committed: 0,
        }
    }

    /// Queue a track, committing the batch if this fills it.
    pub async fn add(&mut self, track: TrackId) -> Result<()> {
        self.batch.push(track);
        if self.batch.len() >= self.capacity {
            self.flush().await?;
        }
        Ok(())
    }

    /// Commit whatever is queued. Does nothing when the batch is empty.
    ///
    /// On rejection the batch is dropped and the error reports how many tracks
    /// earlier batches had already committed.
    pub async fn flush(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let batch = std::mem::take(&mut self.batch);
        if let Err(e) = self.music.add_tracks(&self.playlist_id, &batch).await {
            return Err(ScrapeError::Commit {
                committed: self.committed,
                source: Box::new(e),
            });
        }

        self.committed += batch.len();
        self.batches_committed += 1;
        log::info!("added {} tracks ({} so far)", batch.len(), self.committed);
        Ok(())
    }

    /// Tracks successfully committed so far.
    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn batches_committed(&self) -> usize {
        self.batches_committed
    }

    /// Tracks queued but not yet committed.
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cursor, Page, Playlist};
    use async_trait::async_trait;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingMusic {
        calls: RefCell<Vec<Vec<TrackId>>>,
        reject_call: Option<usize>,
    }

    #[async_trait(?Send)]
    impl MusicClient for RecordingMusic {
        async fn list_playlists(&self, _cursor: &Cursor) -> Result<Page<Playlist>> {
            Ok(Page::last(vec![]))
        }

        async fn add_tracks(&self, _playlist_id: &str, tracks: &[TrackId]) -> Result<()> {
            let call = self.calls.borrow().len();
            if self.reject_call == Some(call) {
                return Err(ScrapeError::Transport("403 Forbidden".to_string()));
            }
            self.calls.borrow_mut().push(tracks.to_vec());
            Ok(())
        }
    }

    fn tracks(n: usize) -> Vec<TrackId> {
        (0..n).map(|i| TrackId::new(format!("T{i}"))).collect()
    }

    async fn commit_all(music: &RecordingMusic, input: Vec<TrackId>) -> Result<usize> {
        let mut committer = BatchCommitter::new(music, "PL1");
        for track in input {
            committer.add(track).await?;
        }
        committer.flush().await?;
        Ok(committer.committed())
    }

    #[tokio::test]
    async fn test_batch_counts_and_order() {
        for n in [0, 1, 99, 100, 101, 250] {
            let music = RecordingMusic::default();
            let input = tracks(n);

            assert_eq!(commit_all(&music, input.clone()).await.unwrap(), n);

            let calls = music.calls.borrow();
            assert_eq!(calls.len(), n.div_ceil(BATCH_SIZE), "calls for {n} tracks");
            if let Some((last, full)) = calls.split_last() {
                assert!(full.iter().all(|c| c.len() == BATCH_SIZE));
                assert!(!last.is_empty() && last.len() <= BATCH_SIZE);
            }
            assert_eq!(calls.concat(), input);
        }
    }

    #[tokio::test]
    async fn test_full_batch_commits_before_flush() {
        let music = RecordingMusic::default();
        let mut committer = BatchCommitter::with_capacity(&music, "PL1", 2);

        committer.add(TrackId::new("a")).await.unwrap();
        assert!(music.calls.borrow().is_empty());
        committer.add(TrackId::new("b")).await.unwrap();
        assert_eq!(music.calls.borrow().len(), 1);
        committer.add(TrackId::new("c")).await.unwrap();
        assert_eq!(committer.pending(), 1);

        committer.flush().await.unwrap();
        assert_eq!(music.calls.borrow().len(), 2);
        assert_eq!(committer.batches_committed(), 2);
        committer.flush().await.unwrap();
        assert_eq!(music.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_capacity_is_clamped_to_service_limit() {
        let music = RecordingMusic::default();
        assert_eq!(BatchCommitter::with_capacity(&music, "PL1", 500).capacity(), 100);
        assert_eq!(BatchCommitter::with_capacity(&music, "PL1", 0).capacity(), 1);
    }

    #[tokio::test]
    async fn test_rejection_reports_resume_point() {
        let music = RecordingMusic {
            reject_call: Some(2),
            ..Default::default()
        };

        match commit_all(&music, tracks(250)).await {
            Err(ScrapeError::Commit { committed, source }) => {
                assert_eq!(committed, 200);
                assert!(matches!(*source, ScrapeError::Transport(_)));
            }
            other => panic!("expected commit error, got {other:?}"),
        }
    }
}
