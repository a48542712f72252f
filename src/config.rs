//! Source configuration
//!
//! The host sends a loose JSON block of source params with every request.
//! [`SourceParams`] is that block as received (every key optional, unknown
//! keys rejected); [`SourceParams::normalize`] turns it into the fixed
//! [`SourceConfig`] the engine works with, resolving the legacy
//! `showBufName` flag once so filtering never looks at it.

use serde::{Deserialize, Serialize};

use crate::error::SourceResult;
use crate::serde_helpers::deserialize_byte_limit;

/// Default byte limit above which a buffer is not scanned
pub const DEFAULT_LIMIT_BYTES: u64 = 1_000_000;

/// How candidates are annotated with the buffer they came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferNameStyle {
    /// No annotation
    #[default]
    None,
    /// The buffer name as the host reports it
    Full,
    /// Last path component of the buffer name
    Basename,
}

/// Source params as received from the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceParams {
    #[serde(default, alias = "requireSameFileType", skip_serializing_if = "Option::is_none")]
    pub require_same_filetype: Option<bool>,

    #[serde(
        default,
        deserialize_with = "deserialize_byte_limit",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit_bytes: Option<u64>,

    #[serde(default, alias = "fromAltBuffer", skip_serializing_if = "Option::is_none")]
    pub from_alt_buf: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_collect: Option<bool>,

    /// Legacy flag; `true` means [`BufferNameStyle::Full`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_buf_name: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_name_style: Option<BufferNameStyle>,
}

impl SourceParams {
    /// Parse a params block from a JSON value
    ///
    /// # Errors
    /// Returns [`crate::error::SourceError::InvalidParams`] for unknown keys
    /// or values of the wrong type.
    pub fn from_json(value: serde_json::Value) -> SourceResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Fill in defaults and resolve the legacy `showBufName` flag.
    ///
    /// An explicit `bufferNameStyle` always wins over `showBufName`.
    pub fn normalize(&self) -> SourceConfig {
        let defaults = SourceConfig::default();

        let buffer_name_style = match (self.buffer_name_style, self.show_buf_name) {
            (Some(style), _) => style,
            (None, Some(true)) => BufferNameStyle::Full,
            (None, _) => defaults.buffer_name_style,
        };

        SourceConfig {
            require_same_filetype: self
                .require_same_filetype
                .unwrap_or(defaults.require_same_filetype),
            limit_bytes: self.limit_bytes.unwrap_or(defaults.limit_bytes),
            from_alt_buf: self.from_alt_buf.unwrap_or(defaults.from_alt_buf),
            force_collect: self.force_collect.unwrap_or(defaults.force_collect),
            buffer_name_style,
        }
    }
}

/// Normalized configuration for one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    /// Only offer words from buffers of the current file type (plus visible
    /// and, optionally, alternate buffers)
    pub require_same_filetype: bool,
    /// Buffers larger than this are not scanned
    pub limit_bytes: u64,
    /// Always include the alternate buffer when filtering by file type
    pub from_alt_buf: bool,
    /// Scan buffers regardless of size or backing file
    pub force_collect: bool,
    pub buffer_name_style: BufferNameStyle,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            require_same_filetype: true,
            limit_bytes: DEFAULT_LIMIT_BYTES,
            from_alt_buf: false,
            force_collect: false,
            buffer_name_style: BufferNameStyle::None,
        }
    }
}

impl From<SourceParams> for SourceConfig {
    fn from(params: SourceParams) -> Self {
        params.normalize()
    }
}
