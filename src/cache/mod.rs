//! Per-buffer word cache
//!
//! One [`CachedBufferEntry`] per tracked buffer, keyed by buffer handle. The
//! cache decides when an entry is (re)built and when it is dropped:
//!
//! ```text
//! absent ──rebuild──▶ cached(stamp S) ──host stamp ≠ S──▶ stale
//!    ▲                    │    ▲                            │
//!    │                    │    └────────rebuild─────────────┘
//!    └──evict (hidden and unlisted)
//! ```
//!
//! A rebuild that the size guard rejects changes nothing: an absent buffer
//! stays absent and a cached one keeps its previous words until eviction.
//!
//! # Thread Safety
//!
//! The map sits behind a `parking_lot::RwLock` that is only held for the
//! entry swap and the eviction removal, never across a host call. Every
//! rebuild takes a ticket before talking to the host; a finished rebuild whose
//! ticket is older than the one already stored is discarded, so when two
//! rebuilds of the same buffer overlap the one that started last wins.

pub mod entry;
pub mod size_guard;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{HostResult, SourceResult};
use crate::host::{BufferHost, BufferId, RevisionStamp};
use crate::words::{WordPattern, extract_words, split_ranges};

pub use entry::CachedBufferEntry;
pub use size_guard::Eligibility;

/// Default number of lines requested per host fetch
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Cache statistics for debugging and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries written (new or replacing an older one)
    pub rebuilds: u64,

    /// Visible buffers skipped because their stamp was unchanged
    pub skipped_fresh: u64,

    /// Rebuilds refused by the size guard
    pub rejected: u64,

    /// Entries removed because their buffer was hidden and unlisted
    pub evictions: u64,

    /// Finished rebuilds dropped because a later-started one had committed
    pub discarded_stale: u64,

    /// Current number of entries
    pub entries: usize,
}

/// What a single refresh did to a buffer's entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new entry was committed
    Rebuilt,

    /// The cached stamp matched the host; nothing was fetched
    Fresh,

    /// The size guard refused the buffer; the cache was not touched
    Rejected(Eligibility),

    /// The rebuild finished after a later-started one and was dropped
    Discarded,
}

#[derive(Debug)]
pub struct BufferCache {
    entries: RwLock<BTreeMap<BufferId, Arc<CachedBufferEntry>>>,
    next_sequence: AtomicU64,
    page_size: usize,
    stats: RwLock<CacheStats>,
}

impl BufferCache {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a cache that fetches buffer lines `page_size` lines at a time
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            next_sequence: AtomicU64::new(1),
            page_size: page_size.max(1),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn get(&self, buffer: BufferId) -> Option<Arc<CachedBufferEntry>> {
        self.entries.read().get(&buffer).cloned()
    }

    pub fn contains(&self, buffer: BufferId) -> bool {
        self.entries.read().contains_key(&buffer)
    }

    /// All entries in ascending buffer order
    pub fn snapshot(&self) -> Vec<Arc<CachedBufferEntry>> {
        self.entries.read().values().cloned().collect()
    }

    pub fn buffer_ids(&self) -> Vec<BufferId> {
        self.entries.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry (engine deactivation)
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().clone();
        stats.entries = self.len();
        stats
    }

    /// Whether `buffer` has an entry whose stamp matches the host's.
    pub async fn is_fresh<H>(&self, host: &H, buffer: BufferId) -> HostResult<bool>
    where
        H: BufferHost + ?Sized,
    {
        let Some(cached) = self.get(buffer) else {
            return Ok(false);
        };
        Ok(host.changed_tick(buffer).await? == cached.revision)
    }

    /// Rebuild the entry of the buffer being edited.
    ///
    /// The stamp is not compared: the host may not have advanced it yet for
    /// edits made just before the event, so the buffer is always rescanned
    /// when the size guard allows it.
    pub async fn refresh_active<H>(
        &self,
        host: &H,
        file_type: &str,
        pattern: &WordPattern,
        limit: u64,
        force: bool,
    ) -> SourceResult<RefreshOutcome>
    where
        H: BufferHost + ?Sized,
    {
        let buffer = host.current_buffer().await?;
        let sequence = self.next_ticket();

        let eligibility = size_guard::check_active(host, buffer, limit, force).await?;
        if !eligibility.is_eligible() {
            debug!(buffer, ?eligibility, "active buffer not cached");
            self.stats.write().rejected += 1;
            return Ok(RefreshOutcome::Rejected(eligibility));
        }

        let revision = host.changed_tick(buffer).await?;
        let display_name = host.buffer_name(buffer).await?;
        let words = self.collect_words(host, buffer, pattern).await?;

        Ok(self.commit(CachedBufferEntry {
            buffer,
            file_type: file_type.to_string(),
            display_name,
            words,
            revision,
            sequence,
        }))
    }

    /// Build entries for visible buffers that are absent or stale.
    ///
    /// Buffers are measured by the file they edit. Returns the number of
    /// entries committed.
    pub async fn refresh_visible<H>(
        &self,
        host: &H,
        visible: &[BufferId],
        pattern: &WordPattern,
        limit: u64,
        force: bool,
    ) -> SourceResult<usize>
    where
        H: BufferHost + ?Sized,
    {
        let mut seen = HashSet::new();
        let mut rebuilt = 0;

        for &buffer in visible {
            if !seen.insert(buffer) {
                continue;
            }

            let outcome = self
                .refresh_file_buffer(host, buffer, pattern, limit, force)
                .await?;
            if outcome == RefreshOutcome::Rebuilt {
                rebuilt += 1;
            }
        }

        Ok(rebuilt)
    }

    async fn refresh_file_buffer<H>(
        &self,
        host: &H,
        buffer: BufferId,
        pattern: &WordPattern,
        limit: u64,
        force: bool,
    ) -> SourceResult<RefreshOutcome>
    where
        H: BufferHost + ?Sized,
    {
        let sequence = self.next_ticket();
        let revision = host.changed_tick(buffer).await?;

        if self.has_revision(buffer, revision) {
            trace!(buffer, revision, "buffer unchanged, skipping");
            self.stats.write().skipped_fresh += 1;
            return Ok(RefreshOutcome::Fresh);
        }

        let display_name = host.buffer_name(buffer).await?;
        let eligibility = size_guard::check_file(host, &display_name, limit, force).await;
        if !eligibility.is_eligible() {
            debug!(buffer, name = %display_name, ?eligibility, "buffer not cached");
            self.stats.write().rejected += 1;
            return Ok(RefreshOutcome::Rejected(eligibility));
        }

        let file_type = host.file_type(buffer).await?;
        let words = self.collect_words(host, buffer, pattern).await?;

        Ok(self.commit(CachedBufferEntry {
            buffer,
            file_type,
            display_name,
            words,
            revision,
            sequence,
        }))
    }

    /// Remove entries of buffers that are neither visible nor listed.
    ///
    /// Hidden but listed buffers are kept. Nothing is removed if any listed
    /// query fails. An entry recommitted while the queries were in flight
    /// stays. Returns the removed handles.
    pub async fn evict<H>(&self, host: &H, visible: &[BufferId]) -> SourceResult<Vec<BufferId>>
    where
        H: BufferHost + ?Sized,
    {
        let visible: HashSet<BufferId> = visible.iter().copied().collect();
        let snapshot: Vec<(BufferId, u64)> = self
            .entries
            .read()
            .iter()
            .map(|(&buffer, entry)| (buffer, entry.sequence))
            .collect();

        let mut closed = Vec::new();
        for (buffer, sequence) in snapshot {
            if visible.contains(&buffer) {
                continue;
            }
            if !host.is_listed(buffer).await? {
                closed.push((buffer, sequence));
            }
        }

        let mut evicted = Vec::with_capacity(closed.len());
        if !closed.is_empty() {
            let mut entries = self.entries.write();
            for (buffer, sequence) in closed {
                let unchanged = entries
                    .get(&buffer)
                    .is_some_and(|entry| entry.sequence == sequence);
                if unchanged {
                    entries.remove(&buffer);
                    evicted.push(buffer);
                } else {
                    trace!(buffer, "entry recommitted during eviction, keeping");
                }
            }
        }

        if !evicted.is_empty() {
            debug!(buffers = ?evicted, "evicted closed buffers");
            self.stats.write().evictions += evicted.len() as u64;
        }

        Ok(evicted)
    }

    fn next_ticket(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn has_revision(&self, buffer: BufferId, revision: RevisionStamp) -> bool {
        self.entries
            .read()
            .get(&buffer)
            .is_some_and(|entry| entry.revision == revision)
    }

    async fn collect_words<H>(
        &self,
        host: &H,
        buffer: BufferId,
        pattern: &WordPattern,
    ) -> HostResult<Vec<String>>
    where
        H: BufferHost + ?Sized,
    {
        let line_count = host.line_count(buffer).await?;

        let mut lines = Vec::with_capacity(line_count);
        for (start, end) in split_ranges(1, line_count, self.page_size) {
            lines.extend(host.lines(buffer, start, end).await?);
        }

        Ok(extract_words(&lines, pattern))
    }

    fn commit(&self, entry: CachedBufferEntry) -> RefreshOutcome {
        let buffer = entry.buffer;
        let sequence = entry.sequence;

        let mut entries = self.entries.write();
        let newer = entries
            .get(&buffer)
            .map(|current| current.sequence)
            .filter(|&current| current > sequence);
        if let Some(current) = newer {
            drop(entries);
            trace!(buffer, sequence, current, "dropping stale rebuild");
            self.stats.write().discarded_stale += 1;
            return RefreshOutcome::Discarded;
        }

        debug!(buffer, revision = entry.revision, words = entry.words.len(), "cached buffer words");
        entries.insert(buffer, Arc::new(entry));
        drop(entries);

        self.stats.write().rebuilds += 1;
        RefreshOutcome::Rebuilt
    }
}

impl Default for BufferCache {
    fn default() -> Self {
        Self::new()
    }
}
