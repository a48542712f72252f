//! The buffer word completion source
//!
//! `BufferSource` owns the word cache for its whole lifetime: it is created
//! when the host activates the source and the cache is dropped with it (or
//! cleared by [`BufferSource::shutdown`]). The host drives it through three
//! entry points:
//!
//! - [`BufferSource::on_init`] once after activation
//! - [`BufferSource::on_event`] on buffer lifecycle and edit notifications
//! - [`BufferSource::gather_candidates`] per completion request
//!
//! Each refresh pass rebuilds the active buffer first, then sweeps the other
//! visible buffers. The active buffer is sized in memory and never by the
//! sweep's file size, so a buffer the active path rejected stays uncached.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::{BufferCache, CacheStats, RefreshOutcome};
use crate::config::SourceConfig;
use crate::error::SourceResult;
use crate::filter::{self, Candidate};
use crate::host::{BufferHost, BufferId};
use crate::words::WordPattern;

/// Host notifications the source reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A buffer was displayed in a window
    BufWinEnter,
    /// A buffer was written to its file
    BufWritePost,
    /// Insert mode ended (the usual end of an edit)
    InsertLeave,
    /// The cursor entered another buffer
    BufEnter,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::BufWinEnter,
        EventKind::BufWritePost,
        EventKind::InsertLeave,
        EventKind::BufEnter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::BufWinEnter => "BufWinEnter",
            EventKind::BufWritePost => "BufWritePost",
            EventKind::InsertLeave => "InsertLeave",
            EventKind::BufEnter => "BufEnter",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| format!("unknown event '{}'", s))
    }
}

/// What one refresh pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Outcome for the active buffer; `None` when its rebuild was skipped
    pub active: Option<RefreshOutcome>,
    /// Visible buffers rebuilt by the sweep
    pub rebuilt: usize,
    /// Buffers whose entries were evicted
    pub evicted: Vec<BufferId>,
}

pub struct BufferSource<H: BufferHost + ?Sized> {
    host: Arc<H>,
    cache: BufferCache,
    /// Last compiled keyword pattern, reused while the host sends the same string
    pattern: Mutex<Option<Arc<WordPattern>>>,
}

impl<H: BufferHost + ?Sized> BufferSource<H> {
    /// Events the source subscribes to
    pub const EVENTS: [EventKind; 4] = EventKind::ALL;

    pub fn new(host: Arc<H>) -> Self {
        Self::with_cache(host, BufferCache::new())
    }

    /// Create a source whose cache fetches lines `page_size` at a time
    pub fn with_page_size(host: Arc<H>, page_size: usize) -> Self {
        Self::with_cache(host, BufferCache::with_page_size(page_size))
    }

    fn with_cache(host: Arc<H>, cache: BufferCache) -> Self {
        Self {
            host,
            cache,
            pattern: Mutex::new(None),
        }
    }

    /// Default source params
    pub fn default_params() -> SourceConfig {
        SourceConfig::default()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn cache(&self) -> &BufferCache {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Initial pass after activation: cache the active buffer, then every
    /// visible buffer.
    pub async fn on_init(&self, pattern: &str, config: &SourceConfig) -> SourceResult<RefreshSummary> {
        let pattern = self.compile(pattern)?;
        let host = &*self.host;

        let current = host.current_buffer().await?;
        let file_type = host.file_type(current).await?;

        let active = self
            .cache
            .refresh_active(host, &file_type, &pattern, config.limit_bytes, config.force_collect)
            .await?;

        let visible = host.visible_buffers().await?;
        let rebuilt = self
            .cache
            .refresh_visible(
                host,
                &sweep_targets(&visible, current),
                &pattern,
                config.limit_bytes,
                config.force_collect,
            )
            .await?;

        info!("Buffer source initialized with {} cached buffers", self.cache.len());

        Ok(RefreshSummary {
            active: Some(active),
            rebuilt,
            evicted: Vec::new(),
        })
    }

    /// Refresh pass for a host notification.
    ///
    /// `file_type` is the file type of the buffer being edited and `pattern`
    /// the keyword pattern as resolved by the host for this request.
    pub async fn on_event(
        &self,
        event: EventKind,
        file_type: &str,
        pattern: &str,
        config: &SourceConfig,
    ) -> SourceResult<RefreshSummary> {
        let start = Instant::now();
        let pattern = self.compile(pattern)?;
        let host = &*self.host;
        let current = host.current_buffer().await?;

        // Entering a buffer does not edit it
        let skip_active = event == EventKind::BufEnter && self.cache.is_fresh(host, current).await?;

        let active = if skip_active {
            debug!("{}: active buffer already cached", event);
            None
        } else {
            Some(
                self.cache
                    .refresh_active(host, file_type, &pattern, config.limit_bytes, config.force_collect)
                    .await?,
            )
        };

        let visible = host.visible_buffers().await?;
        let rebuilt = self
            .cache
            .refresh_visible(
                host,
                &sweep_targets(&visible, current),
                &pattern,
                config.limit_bytes,
                config.force_collect,
            )
            .await?;
        let evicted = self.cache.evict(host, &visible).await?;

        debug!(
            "{} handled in {:?}: active={:?}, rebuilt={}, evicted={}",
            event,
            start.elapsed(),
            active,
            rebuilt,
            evicted.len()
        );

        Ok(RefreshSummary {
            active,
            rebuilt,
            evicted,
        })
    }

    /// Candidates for a completion request.
    ///
    /// Visible buffers that no event has covered yet (or that changed since)
    /// are scanned first, so the result never misses a buffer on screen. The
    /// active buffer is left to the event passes.
    pub async fn gather_candidates(
        &self,
        file_type: &str,
        pattern: &str,
        config: &SourceConfig,
    ) -> SourceResult<Vec<Candidate>> {
        let pattern = self.compile(pattern)?;
        let host = &*self.host;

        let current = host.current_buffer().await?;
        let visible = host.visible_buffers().await?;
        let alt_buffer = host.alternate_buffer().await?;

        self.cache
            .refresh_visible(
                host,
                &sweep_targets(&visible, current),
                &pattern,
                config.limit_bytes,
                config.force_collect,
            )
            .await?;

        let entries = self.cache.snapshot();
        let candidates = filter::gather(&entries, file_type, &visible, alt_buffer, config);

        debug!(
            "Gathered {} candidates from {} cached buffers",
            candidates.len(),
            entries.len()
        );

        Ok(candidates)
    }

    /// Drop all cached words (source deactivation)
    pub fn shutdown(&self) {
        self.cache.clear();
        *self.pattern.lock() = None;
        info!("Buffer source shut down");
    }

    fn compile(&self, pattern: &str) -> SourceResult<Arc<WordPattern>> {
        let mut last = self.pattern.lock();
        if let Some(compiled) = last.as_ref() {
            if compiled.as_str() == pattern {
                return Ok(Arc::clone(compiled));
            }
        }

        let compiled = Arc::new(WordPattern::new(pattern)?);
        *last = Some(Arc::clone(&compiled));
        Ok(compiled)
    }
}

/// Visible buffers other than the active one
fn sweep_targets(visible: &[BufferId], current: BufferId) -> Vec<BufferId> {
    visible.iter().copied().filter(|&buffer| buffer != current).collect()
}

impl<H: BufferHost + ?Sized> fmt::Debug for BufferSource<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferSource")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;

    #[test]
    fn test_event_names_round_trip() {
        for event in BufferSource::<MemoryHost>::EVENTS {
            assert_eq!(event.as_str().parse::<EventKind>().unwrap(), event);
        }
        assert!("CursorHold".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_pattern_reused_until_changed() {
        let source = BufferSource::new(Arc::new(MemoryHost::new()));

        let first = source.compile(r"\w+").unwrap();
        let again = source.compile(r"\w+").unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let other = source.compile(r"[a-z]+").unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(other.as_str(), "[a-z]+");
    }

    #[test]
    fn test_sweep_targets_skip_active_buffer() {
        assert_eq!(sweep_targets(&[1, 2, 1, 3], 1), vec![2, 3]);
        assert_eq!(sweep_targets(&[2, 3], 1), vec![2, 3]);
        assert!(sweep_targets(&[], 1).is_empty());
    }

    #[test]
    fn test_default_params() {
        assert_eq!(
            BufferSource::<MemoryHost>::default_params(),
            SourceConfig::default()
        );
    }
}
