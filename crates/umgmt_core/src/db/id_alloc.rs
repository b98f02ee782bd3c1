//! Next-free identifier search.

use crate::config::IdRange;
use std::collections::BTreeSet;

/// Picks the id for a new account from `range`.
///
/// Ids outside `range` are ignored. Returns one past the highest in-range id
/// (or `range.min()` when none is in range); when the highest is already
/// `range.max()`, falls back to the lowest unused id. `None` means the range
/// is full.
pub(crate) fn next_free_id(used: impl IntoIterator<Item = u32>, range: IdRange) -> Option<u32> {
    let in_range: BTreeSet<u32> = used.into_iter().filter(|id| range.contains(*id)).collect();

    match in_range.last() {
        None => Some(range.min()),
        Some(&highest) if highest < range.max() => Some(highest + 1),
        Some(_) => (range.min()..=range.max()).find(|id| !in_range.contains(id)),
    }
}
