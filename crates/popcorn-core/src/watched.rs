// Watched list operations. Entries are unique by imdb id.

use popcorn_models::WatchedEntry;

/// Append `entry` unless its id is already present; returns whether it was added
pub fn add_unique(watched: &mut Vec<WatchedEntry>, entry: WatchedEntry) -> bool {
    if contains(watched, &entry.imdb_id) {
        return false;
    }
    watched.push(entry);
    true
}

/// Remove the entry with `imdb_id`, keeping the order of the rest
pub fn remove_by_id(watched: &mut Vec<WatchedEntry>, imdb_id: &str) -> bool {
    let before = watched.len();
    watched.retain(|entry| entry.imdb_id != imdb_id);
    watched.len() != before
}

pub fn contains(watched: &[WatchedEntry], imdb_id: &str) -> bool {
    watched.iter().any(|entry| entry.imdb_id == imdb_id)
}

pub fn find<'a>(watched: &'a [WatchedEntry], imdb_id: &str) -> Option<&'a WatchedEntry> {
    watched.iter().find(|entry| entry.imdb_id == imdb_id)
}
