//! Word completion from open editor buffers
//!
//! Scans the buffers of an editor host for keyword-like words, caches them
//! per buffer keyed by the host's change tick, and turns the cache into
//! completion candidates filtered by file type, visibility and alternate
//! buffer. See [`source::BufferSource`] for the entry points.

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod host;
pub mod logging;
pub mod serde_helpers;
pub mod source;
pub mod words;

pub use cache::{BufferCache, CacheStats, CachedBufferEntry, Eligibility, RefreshOutcome};
pub use config::{BufferNameStyle, SourceConfig, SourceParams};
pub use error::{HostError, SourceError};
pub use filter::Candidate;
pub use host::{BufferHost, BufferId, RevisionStamp};
pub use source::{BufferSource, EventKind, RefreshSummary};
pub use words::{WordPattern, extract_words, split_ranges};
