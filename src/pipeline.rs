//! Scrape orchestration: resolve names, stream the channel history through the
//! extractor into a bounded queue, and commit the queue in batches.
//!
//! The scan (producer) and the committer (consumer) run concurrently on the
//! current task. They share nothing but the queue: closing it is how the
//! producer says it is done, and dropping its receiving end is how the
//! consumer says it has given up.

use crate::batch::{BatchCommitter, BATCH_SIZE};
use crate::extract::extract_track;
use crate::history::HistoryScanner;
use crate::iterator::AsyncPaginatedIterator;
use crate::r#trait::{ChatClient, MusicClient};
use crate::resolve::{resolve_channel, resolve_playlist};
use crate::types::TrackId;
use crate::{Result, ScrapeError};

use std::cell::Cell;
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Capacity of the queue between the history scan and the committer.
pub const QUEUE_CAPACITY: usize = BATCH_SIZE;

/// The part of a run an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    Scanning,
    Committing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Resolving => "resolving",
            Stage::Scanning => "scanning",
            Stage::Committing => "committing",
        })
    }
}

/// Lifecycle of a [`ScrapePipeline`].
///
/// `Idle → Resolving → Scanning → Draining → Done`, with a jump to `Failed`
/// from any running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Resolving,
    Scanning,
    Draining,
    Done,
    Failed,
}

/// The first hard error of a run, tagged with the stage that raised it.
#[derive(Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: ScrapeError,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeReport {
    pub channel_id: String,
    pub playlist_id: String,
    /// Messages read from the channel history
    pub messages_scanned: u64,
    /// History pages fetched
    pub pages_fetched: u32,
    /// Tracks appended to the playlist
    pub tracks_committed: usize,
    /// `add_tracks` calls made
    pub batches: usize,
}

/// Copies track references from a chat channel into a playlist.
///
/// # Examples
///
/// ```rust,no_run
/// use spotctl::{ScrapePipeline, SlackClient, SpotifyClient};
///
/// # async fn run(slack: SlackClient, spotify: SpotifyClient) {
/// let pipeline = ScrapePipeline::new(&slack, &spotify);
/// match pipeline.run("music", "Heard in #music").await {
///     Ok(report) => println!("added {} tracks", report.tracks_committed),
///     Err(e) => eprintln!("{e}"),
/// }
/// # }
/// ```
pub struct ScrapePipeline<'a, C: ChatClient, M: MusicClient> {
    chat: &'a C,
    music: &'a M,
    state: Cell<PipelineState>,
    batch_size: usize,
    queue_capacity: usize,
}

impl<'a, C: ChatClient, M: MusicClient> ScrapePipeline<'a, C, M> {
    pub fn new(chat: &'a C, music: &'a M) -> Self {
        Self {
            chat,
            music,
            state: Cell::new(PipelineState::Idle),
            batch_size: BATCH_SIZE,
            queue_capacity: QUEUE_CAPACITY,
        }
    }

    /// Commit in smaller batches. Clamped to what the music service accepts.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    /// Run the whole scrape once.
    ///
    /// Both names must resolve before any history is read. Batches committed
    /// before a failure stay committed; the error's [`Stage`] and, for commit
    /// failures, the committed count tell the operator where things stopped.
    pub async fn run(
        &self,
        channel_name: &str,
        playlist_name: &str,
    ) -> std::result::Result<ScrapeReport, PipelineError> {
        self.transition(PipelineState::Resolving);
        let channel_id = resolve_channel(self.chat, channel_name)
            .await
            .map_err(|e| self.fail(Stage::Resolving, e))?;
        let playlist_id = resolve_playlist(self.music, playlist_name)
            .await
            .map_err(|e| self.fail(Stage::Resolving, e))?;

        log::info!(
            "Copying tracks from channel '{channel_name}' ({channel_id}) to playlist '{playlist_name}' ({playlist_id})"
        );

        self.transition(PipelineState::Scanning);
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let first_failure = Cell::new(None);
        let mut scanner = HistoryScanner::new(self.chat, channel_id.clone());
        let mut committer =
            BatchCommitter::with_capacity(self.music, playlist_id.clone(), self.batch_size);

        let (scanned, committed) = tokio::join!(
            self.produce(&mut scanner, tx, &first_failure),
            consume(&mut committer, rx, &first_failure),
        );

        let found = match (scanned, committed) {
            (Ok(found), Ok(())) => found,
            (Err(e), Ok(())) => return Err(self.fail(Stage::Scanning, e)),
            (Ok(_), Err(e)) => return Err(self.fail(Stage::Committing, e)),
            (Err(scan), Err(commit)) => {
                return Err(match first_failure.get() {
                    Some(Stage::Committing) => self.fail(Stage::Committing, commit),
                    _ => self.fail(Stage::Scanning, scan),
                });
            }
        };

        self.transition(PipelineState::Done);
        log::info!(
            "Scanned {} messages, found {found} tracks, added {} tracks in {} batches",
            scanner.messages_seen(),
            committer.committed(),
            committer.batches_committed()
        );

        Ok(ScrapeReport {
            channel_id,
            playlist_id,
            messages_scanned: scanner.messages_seen(),
            pages_fetched: scanner.pages_fetched(),
            tracks_committed: committer.committed(),
            batches: committer.batches_committed(),
        })
    }

    /// Scan the history into the queue, then close it.
    async fn produce(
        &self,
        scanner: &mut HistoryScanner<'_>,
        tx: mpsc::Sender<TrackId>,
        first_failure: &Cell<Option<Stage>>,
    ) -> Result<usize> {
        let result = scan_into(scanner, &tx).await;
        drop(tx);
        self.transition(PipelineState::Draining);

        if result.is_err() {
            record_failure(first_failure, Stage::Scanning);
        }
        result
    }

    fn transition(&self, next: PipelineState) {
        let previous = self.state.replace(next);
        if previous != next {
            log::debug!("Pipeline {previous:?} -> {next:?}");
        }
    }

    fn fail(&self, stage: Stage, source: ScrapeError) -> PipelineError {
        self.transition(PipelineState::Failed);
        PipelineError { stage, source }
    }
}

async fn scan_into(scanner: &mut HistoryScanner<'_>, tx: &mpsc::Sender<TrackId>) -> Result<usize> {
    let mut found = 0;
    while let Some(message) = scanner.next().await? {
        let Some(track) = extract_track(&message.text) else {
            continue;
        };
        if tx.send(track).await.is_err() {
            log::debug!("Committer stopped, ending history scan early");
            break;
        }
        found += 1;
    }
    Ok(found)
}

/// Commit everything the queue yields, then flush the remainder.
///
/// Returning drops the receiver, which unblocks a producer waiting on a full
/// queue after a commit failure.
async fn consume<M: MusicClient>(
    committer: &mut BatchCommitter<'_, M>,
    mut rx: mpsc::Receiver<TrackId>,
    first_failure: &Cell<Option<Stage>>,
) -> Result<()> {
    let result = commit_from(committer, &mut rx).await;
    if result.is_err() {
        record_failure(first_failure, Stage::Committing);
    }
    result
}

async fn commit_from<M: MusicClient>(
    committer: &mut BatchCommitter<'_, M>,
    rx: &mut mpsc::Receiver<TrackId>,
) -> Result<()> {
    while let Some(track) = rx.recv().await {
        committer.add(track).await?;
    }
    committer.flush().await
}

fn record_failure(first_failure: &Cell<Option<Stage>>, stage: Stage) {
    if first_failure.get().is_none() {
        first_failure.set(Some(stage));
    }
}
