//! Editor host abstraction
//!
//! The engine never touches editor state directly. Everything it needs (line
//! content, buffer metadata, which buffers are visible, file sizes) comes
//! through [`BufferHost`], so the same cache logic can sit behind an RPC
//! bridge to a running editor or the in-process [`memory::MemoryHost`].

pub mod memory;

use std::io;
use std::path::Path;

use crate::error::HostResult;

/// Opaque buffer handle assigned by the host (Vim's `bufnr`).
pub type BufferId = u32;

/// Per-buffer edit counter (Vim's `b:changedtick`).
pub type RevisionStamp = u64;

/// Common interface for editor hosts
///
/// Line numbers are 1-based and ranges are inclusive, following the editor
/// convention. Every call may suspend for an arbitrary time; the engine
/// imposes no timeout of its own.
#[async_trait::async_trait]
pub trait BufferHost: Send + Sync {
    /// Handle of the buffer currently being edited
    async fn current_buffer(&self) -> HostResult<BufferId>;

    /// Handle of the alternate buffer, if there is one
    async fn alternate_buffer(&self) -> HostResult<Option<BufferId>>;

    /// Handles of the buffers displayed in any window of the current tab page.
    ///
    /// A buffer shown in several windows may appear more than once.
    async fn visible_buffers(&self) -> HostResult<Vec<BufferId>>;

    /// Whether the buffer is still listed (open, even if not displayed)
    async fn is_listed(&self, buffer: BufferId) -> HostResult<bool>;

    /// Number of lines in the buffer; zero for an empty or unloaded buffer
    async fn line_count(&self, buffer: BufferId) -> HostResult<usize>;

    /// Lines `start..=end` of the buffer.
    ///
    /// `end` may lie past the last line, in which case fewer lines are
    /// returned rather than an error.
    async fn lines(&self, buffer: BufferId, start: usize, end: usize) -> HostResult<Vec<String>>;

    /// Byte offset just past the end of line `line`, newline included.
    ///
    /// For the last line this is the in-memory byte size of the buffer.
    async fn line_end_byte(&self, buffer: BufferId, line: usize) -> HostResult<u64>;

    /// File-type tag of the buffer (may be empty)
    async fn file_type(&self, buffer: BufferId) -> HostResult<String>;

    /// Name of the buffer, usually the path of the file it edits (may be empty)
    async fn buffer_name(&self, buffer: BufferId) -> HostResult<String>;

    /// Current revision stamp of the buffer
    async fn changed_tick(&self, buffer: BufferId) -> HostResult<RevisionStamp>;

    /// Size in bytes of the file at `path`.
    ///
    /// Callers distinguish `ErrorKind::NotFound` from other failures for
    /// logging only; both make a buffer ineligible for caching.
    async fn file_size(&self, path: &Path) -> io::Result<u64> {
        tokio::fs::metadata(path).await.map(|metadata| metadata.len())
    }
}
