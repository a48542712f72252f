#![allow(dead_code)]

pub mod scripted_host;

use std::path::{Path, PathBuf};

use buffer_words::BufferId;
use buffer_words::host::memory::MemoryHost;

pub use scripted_host::ScriptedHost;

/// Write `content` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Load a file-backed buffer and display it
pub async fn open_file(host: &MemoryHost, dir: &Path, name: &str, file_type: &str, content: &str) -> BufferId {
    let path = write_file(dir, name, content);
    let id = host.load_file(&path, file_type).await.unwrap();
    host.show(id);
    id
}

/// Words of a cached entry, or `None` when the buffer is not cached
pub fn cached_words<H>(source: &buffer_words::BufferSource<H>, buffer: BufferId) -> Option<Vec<String>>
where
    H: buffer_words::BufferHost + ?Sized,
{
    source.cache().get(buffer).map(|entry| entry.words.clone())
}
