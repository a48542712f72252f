//! Line range windows for capped bulk line fetches
//!
//! Some hosts limit how many lines one fetch may return. Scanning a large
//! buffer then goes window by window; the windows are concatenated in order
//! before tokenizing, so the word list does not depend on the window size.

/// Split `[min_line, max_line]` into inclusive windows of `size` lines.
///
/// Windows start at `min_line` and are all exactly `size` lines long, so the
/// last window may end past `max_line`; the host returns fewer lines rather
/// than failing. Window ends saturate at `usize::MAX`. An empty range yields
/// no windows. A `size` of zero is treated as one.
pub fn split_ranges(
    min_line: usize,
    max_line: usize,
    size: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let size = size.max(1);
    let starts = (min_line <= max_line).then(|| (min_line..=max_line).step_by(size));

    starts
        .into_iter()
        .flatten()
        .map(move |start| (start, start.saturating_add(size - 1)))
}
