//! In-process editor host
//!
//! `MemoryHost` keeps buffers in memory and answers [`BufferHost`] calls the
//! way an editor would: 1-based inclusive line ranges, a change tick bumped on
//! every edit, byte offsets that count one newline per line, and a
//! listed/visible distinction. The command-line driver loads files into it;
//! tests drive buffer lifecycles through it.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::{BufferHost, BufferId, RevisionStamp};
use crate::error::{HostError, HostResult};

#[derive(Debug, Clone)]
struct MemoryBuffer {
    name: String,
    file_type: String,
    lines: Vec<String>,
    changed_tick: RevisionStamp,
    listed: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    buffers: BTreeMap<BufferId, MemoryBuffer>,
    next_id: BufferId,
    current: Option<BufferId>,
    alternate: Option<BufferId>,
    visible: Vec<BufferId>,
}

impl MemoryState {
    fn buffer(&self, call: &'static str, id: BufferId) -> HostResult<&MemoryBuffer> {
        self.buffers
            .get(&id)
            .ok_or_else(|| HostError::new(call, format!("invalid buffer {}", id)))
    }

    fn buffer_mut(&mut self, call: &'static str, id: BufferId) -> HostResult<&mut MemoryBuffer> {
        self.buffers
            .get_mut(&id)
            .ok_or_else(|| HostError::new(call, format!("invalid buffer {}", id)))
    }
}

#[derive(Debug)]
pub struct MemoryHost {
    state: RwLock<MemoryState>,
    line_requests: AtomicUsize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                next_id: 1,
                ..MemoryState::default()
            }),
            line_requests: AtomicUsize::new(0),
        }
    }

    /// Add a listed, hidden buffer. The first buffer added becomes current
    /// and visible.
    pub fn add_buffer<S: AsRef<str>>(&self, name: &str, file_type: &str, lines: &[S]) -> BufferId {
        let mut state = self.state.write();
        let id = state.next_id;
        state.next_id += 1;

        state.buffers.insert(
            id,
            MemoryBuffer {
                name: name.to_string(),
                file_type: file_type.to_string(),
                lines: lines.iter().map(|l| l.as_ref().to_string()).collect(),
                changed_tick: 1,
                listed: true,
            },
        );

        if state.current.is_none() {
            state.current = Some(id);
            state.visible.push(id);
        }

        id
    }

    /// Load a file from disk into a new buffer named after its path.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD rather than refused.
    pub async fn load_file(&self, path: &Path, file_type: &str) -> io::Result<BufferId> {
        let bytes = tokio::fs::read(path).await?;
        let text = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = text.lines().collect();
        Ok(self.add_buffer(&path.to_string_lossy(), file_type, &lines))
    }

    /// Make `id` the buffer being edited; the previous one becomes alternate.
    pub fn set_current(&self, id: BufferId) {
        let mut state = self.state.write();
        if state.current != Some(id) {
            state.alternate = state.current;
            state.current = Some(id);
        }
        if !state.visible.contains(&id) {
            state.visible.push(id);
        }
    }

    pub fn set_alternate(&self, id: Option<BufferId>) {
        self.state.write().alternate = id;
    }

    /// Replace the set of buffers displayed in the current tab page
    pub fn set_visible(&self, ids: &[BufferId]) {
        self.state.write().visible = ids.to_vec();
    }

    pub fn show(&self, id: BufferId) {
        let mut state = self.state.write();
        if !state.visible.contains(&id) {
            state.visible.push(id);
        }
    }

    pub fn hide(&self, id: BufferId) {
        self.state.write().visible.retain(|&v| v != id);
    }

    /// Replace a buffer's content, bumping its change tick.
    pub fn set_lines<S: AsRef<str>>(&self, id: BufferId, lines: &[S]) -> HostResult<()> {
        let mut state = self.state.write();
        let buffer = state.buffer_mut("setbufline", id)?;
        buffer.lines = lines.iter().map(|l| l.as_ref().to_string()).collect();
        buffer.changed_tick += 1;
        Ok(())
    }

    /// Append a line, bumping the change tick.
    pub fn append_line(&self, id: BufferId, line: &str) -> HostResult<()> {
        let mut state = self.state.write();
        let buffer = state.buffer_mut("appendbufline", id)?;
        buffer.lines.push(line.to_string());
        buffer.changed_tick += 1;
        Ok(())
    }

    /// Replace a buffer's content without touching its change tick, like an
    /// edit the host has not yet accounted for.
    pub fn set_lines_silently<S: AsRef<str>>(&self, id: BufferId, lines: &[S]) -> HostResult<()> {
        let mut state = self.state.write();
        let buffer = state.buffer_mut("setbufline", id)?;
        buffer.lines = lines.iter().map(|l| l.as_ref().to_string()).collect();
        Ok(())
    }

    pub fn set_file_type(&self, id: BufferId, file_type: &str) -> HostResult<()> {
        let mut state = self.state.write();
        state.buffer_mut("setbufvar", id)?.file_type = file_type.to_string();
        Ok(())
    }

    /// Unlist a buffer (`:bdelete`): it stays known but is no longer open.
    pub fn unlist(&self, id: BufferId) -> HostResult<()> {
        let mut state = self.state.write();
        state.buffer_mut("bdelete", id)?.listed = false;
        state.visible.retain(|&v| v != id);
        Ok(())
    }

    /// Number of `lines` calls served so far
    pub fn line_requests(&self) -> usize {
        self.line_requests.load(Ordering::Relaxed)
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BufferHost for MemoryHost {
    async fn current_buffer(&self) -> HostResult<BufferId> {
        self.state
            .read()
            .current
            .ok_or_else(|| HostError::new("bufnr", "no current buffer"))
    }

    async fn alternate_buffer(&self) -> HostResult<Option<BufferId>> {
        Ok(self.state.read().alternate)
    }

    async fn visible_buffers(&self) -> HostResult<Vec<BufferId>> {
        Ok(self.state.read().visible.clone())
    }

    async fn is_listed(&self, buffer: BufferId) -> HostResult<bool> {
        Ok(self
            .state
            .read()
            .buffers
            .get(&buffer)
            .is_some_and(|b| b.listed))
    }

    async fn line_count(&self, buffer: BufferId) -> HostResult<usize> {
        Ok(self.state.read().buffer("line", buffer)?.lines.len())
    }

    async fn lines(&self, buffer: BufferId, start: usize, end: usize) -> HostResult<Vec<String>> {
        self.line_requests.fetch_add(1, Ordering::Relaxed);

        let state = self.state.read();
        let lines = &state.buffer("getbufline", buffer)?.lines;

        let start = start.max(1);
        let end = end.min(lines.len());
        if start > end {
            return Ok(Vec::new());
        }
        Ok(lines[start - 1..end].to_vec())
    }

    async fn line_end_byte(&self, buffer: BufferId, line: usize) -> HostResult<u64> {
        let state = self.state.read();
        let lines = &state.buffer("line2byte", buffer)?.lines;

        Ok(lines
            .iter()
            .take(line)
            .map(|l| l.len() as u64 + 1)
            .sum())
    }

    async fn file_type(&self, buffer: BufferId) -> HostResult<String> {
        Ok(self.state.read().buffer("getbufvar", buffer)?.file_type.clone())
    }

    async fn buffer_name(&self, buffer: BufferId) -> HostResult<String> {
        Ok(self.state.read().buffer("bufname", buffer)?.name.clone())
    }

    async fn changed_tick(&self, buffer: BufferId) -> HostResult<RevisionStamp> {
        Ok(self.state.read().buffer("changedtick", buffer)?.changed_tick)
    }
}
