//! Turning cached words into completion candidates
//!
//! With `require_same_filetype` set, an entry contributes when any of these
//! holds (checked in this order):
//! - its file type equals the current one
//! - its buffer is visible in the current tab page
//! - `from_alt_buf` is set and it is the alternate buffer
//!
//! Otherwise every entry contributes. Candidates keep the cache order and each
//! entry's word order. The same word coming from two buffers is offered twice,
//! once per buffer, each with its own annotation.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::CachedBufferEntry;
use crate::config::{BufferNameStyle, SourceConfig};
use crate::host::BufferId;

/// One completion candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub word: String,
    /// Buffer annotation; omitted entirely when the style is `none`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<String>,
}

impl Candidate {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            menu: None,
        }
    }

    pub fn with_menu(mut self, menu: impl Into<String>) -> Self {
        self.menu = Some(menu.into());
        self
    }
}

/// Whether `entry` may contribute candidates in the current context
pub fn is_included(
    entry: &CachedBufferEntry,
    current_file_type: &str,
    visible: &[BufferId],
    alt_buffer: Option<BufferId>,
    config: &SourceConfig,
) -> bool {
    !config.require_same_filetype
        || entry.file_type == current_file_type
        || visible.contains(&entry.buffer)
        || (config.from_alt_buf && alt_buffer == Some(entry.buffer))
}

/// Annotation for candidates coming from a buffer named `display_name`
pub fn annotation(display_name: &str, style: BufferNameStyle) -> Option<String> {
    match style {
        BufferNameStyle::None => None,
        BufferNameStyle::Full => Some(display_name.to_string()),
        BufferNameStyle::Basename => Some(
            Path::new(display_name)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| display_name.to_string()),
        ),
    }
}

/// Build the candidate list from a cache snapshot.
pub fn gather(
    entries: &[Arc<CachedBufferEntry>],
    current_file_type: &str,
    visible: &[BufferId],
    alt_buffer: Option<BufferId>,
    config: &SourceConfig,
) -> Vec<Candidate> {
    entries
        .iter()
        .filter(|entry| is_included(entry, current_file_type, visible, alt_buffer, config))
        .flat_map(|entry| {
            let menu = annotation(&entry.display_name, config.buffer_name_style);
            entry.words.iter().map(move |word| Candidate {
                word: word.clone(),
                menu: menu.clone(),
            })
        })
        .collect()
}
