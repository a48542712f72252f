//! A `MemoryHost` wrapper whose calls can be made to fail or to stall

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use buffer_words::error::{HostError, HostResult};
use buffer_words::host::memory::MemoryHost;
use buffer_words::{BufferHost, BufferId, RevisionStamp};

/// Handshake for a stalled host call
#[derive(Debug, Default)]
pub struct Gate {
    /// Signalled when the stalled call has been entered
    pub entered: Notify,
    /// Notify to let the stalled call proceed
    pub release: Notify,
}

#[derive(Debug, Default)]
pub struct ScriptedHost {
    inner: MemoryHost,
    failing: Mutex<HashSet<&'static str>>,
    gate: Mutex<Option<(&'static str, Arc<Gate>)>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call of `call` (a trait method name) fail
    pub fn fail(&self, call: &'static str) {
        self.failing.lock().insert(call);
    }

    pub fn recover(&self) {
        self.failing.lock().clear();
    }

    /// Stall the next call of `call` until the returned gate is released
    pub fn stall_next(&self, call: &'static str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock() = Some((call, Arc::clone(&gate)));
        gate
    }

    fn check(&self, call: &'static str) -> HostResult<()> {
        if self.failing.lock().contains(call) {
            return Err(HostError::new(call, "scripted failure"));
        }
        Ok(())
    }

    async fn pass_gate(&self, call: &'static str) {
        let gate = {
            let mut slot = self.gate.lock();
            let stalled = matches!(slot.as_ref(), Some((name, _)) if *name == call);
            if stalled { slot.take().map(|(_, gate)| gate) } else { None }
        };
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

impl Deref for ScriptedHost {
    type Target = MemoryHost;

    fn deref(&self) -> &MemoryHost {
        &self.inner
    }
}

#[async_trait::async_trait]
impl BufferHost for ScriptedHost {
    async fn current_buffer(&self) -> HostResult<BufferId> {
        self.check("current_buffer")?;
        self.inner.current_buffer().await
    }

    async fn alternate_buffer(&self) -> HostResult<Option<BufferId>> {
        self.check("alternate_buffer")?;
        self.inner.alternate_buffer().await
    }

    async fn visible_buffers(&self) -> HostResult<Vec<BufferId>> {
        self.check("visible_buffers")?;
        self.inner.visible_buffers().await
    }

    async fn is_listed(&self, buffer: BufferId) -> HostResult<bool> {
        self.check("is_listed")?;
        self.pass_gate("is_listed").await;
        self.inner.is_listed(buffer).await
    }

    async fn line_count(&self, buffer: BufferId) -> HostResult<usize> {
        self.check("line_count")?;
        self.inner.line_count(buffer).await
    }

    async fn lines(&self, buffer: BufferId, start: usize, end: usize) -> HostResult<Vec<String>> {
        self.check("lines")?;
        self.pass_gate("lines").await;
        self.inner.lines(buffer, start, end).await
    }

    async fn line_end_byte(&self, buffer: BufferId, line: usize) -> HostResult<u64> {
        self.check("line_end_byte")?;
        self.inner.line_end_byte(buffer, line).await
    }

    async fn file_type(&self, buffer: BufferId) -> HostResult<String> {
        self.check("file_type")?;
        self.inner.file_type(buffer).await
    }

    async fn buffer_name(&self, buffer: BufferId) -> HostResult<String> {
        self.check("buffer_name")?;
        self.inner.buffer_name(buffer).await
    }

    async fn changed_tick(&self, buffer: BufferId) -> HostResult<RevisionStamp> {
        self.check("changed_tick")?;
        self.inner.changed_tick(buffer).await
    }
}
