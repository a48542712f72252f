use crate::host::{BufferId, RevisionStamp};

/// Words collected from one buffer, with the metadata needed to filter and
/// annotate them.
///
/// Entries are immutable once built. A rebuild produces a new entry and swaps
/// it into the cache, so `words` and `revision` always belong to the same scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedBufferEntry {
    pub buffer: BufferId,
    pub file_type: String,
    /// Buffer name (usually a path), for annotations only
    pub display_name: String,
    /// Distinct words in first-occurrence order
    pub words: Vec<String>,
    /// Host revision stamp read before the lines were fetched
    pub revision: RevisionStamp,
    /// Rebuild ticket; a commit carrying an older ticket than this is dropped
    pub sequence: u64,
}
