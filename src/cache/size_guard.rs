//! Size limits for caching a buffer's words
//!
//! The active buffer is measured in memory (byte offset of its last line's
//! end). Any other buffer is measured by the size of the file it edits, since
//! it may not even be loaded. A buffer whose file cannot be statted is not
//! cached unless collection is forced.
//!
//! `force` bypasses the measurement on both paths.

use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::HostResult;
use crate::host::{BufferHost, BufferId};

/// Outcome of a size check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Measured size is within the limit
    Eligible { size: u64 },

    /// Collection was forced; nothing was measured
    Forced,

    /// Measured size exceeds the limit
    TooLarge { size: u64, limit: u64 },

    /// The buffer has no file that could be statted
    NoBackingFile,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible { .. } | Eligibility::Forced)
    }
}

/// Compare a measured size against the limit. Inclusive: `size == limit` is eligible.
pub fn check_size(size: u64, limit: u64) -> Eligibility {
    if size <= limit {
        Eligibility::Eligible { size }
    } else {
        Eligibility::TooLarge { size, limit }
    }
}

/// Size check for the buffer being edited, measured from host line metadata.
pub async fn check_active<H>(
    host: &H,
    buffer: BufferId,
    limit: u64,
    force: bool,
) -> HostResult<Eligibility>
where
    H: BufferHost + ?Sized,
{
    if force {
        return Ok(Eligibility::Forced);
    }

    let line_count = host.line_count(buffer).await?;
    let size = if line_count == 0 {
        0
    } else {
        host.line_end_byte(buffer, line_count).await?
    };

    Ok(check_size(size, limit))
}

/// Size check for a buffer that is not being edited, measured on disk.
///
/// Stat failures never propagate: a missing file and an unreadable one both
/// make the buffer ineligible.
pub async fn check_file<H>(host: &H, name: &str, limit: u64, force: bool) -> Eligibility
where
    H: BufferHost + ?Sized,
{
    if force {
        return Eligibility::Forced;
    }

    if name.is_empty() {
        return Eligibility::NoBackingFile;
    }

    match host.file_size(Path::new(name)).await {
        Ok(size) => check_size(size, limit),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(name, "no file behind buffer");
            Eligibility::NoBackingFile
        }
        Err(e) => {
            warn!(name, error = %e, "failed to stat buffer file");
            Eligibility::NoBackingFile
        }
    }
}
