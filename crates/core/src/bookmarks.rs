//! Bookmark reconciliation.
//!
//! A document's bookmarks come from two sources: entries the parsing engine
//! reads out of the file and entries the user created in the app. Display
//! wants one list, deduplicated by `(page_number, title)`.

use doc_model::Bookmark;
use std::collections::HashSet;

/// Merges native and user bookmarks into one ordered list.
///
/// Native entries come first, then user entries, keeping each list's relative
/// order; the first occurrence of a `(page_number, title)` key wins, so a
/// native bookmark beats a user bookmark for the same jump target. Pure and
/// deterministic, so re-merging the same inputs yields the same list.
pub fn merge_bookmarks(native: &[Bookmark], user: &[Bookmark]) -> Vec<Bookmark> {
    let mut seen: HashSet<(u32, String)> = HashSet::new();
    let mut merged = Vec::with_capacity(native.len() + user.len());

    for bookmark in native.iter().chain(user.iter()) {
        let (page, title) = bookmark.dedup_key();
        if seen.insert((page, title.to_owned())) {
            merged.push(bookmark.clone());
        }
    }

    merged
}
