use std::cmp::Ordering;

use crate::model::{DirectoryEntry, SortColumn, SortDirection, SortSettings};

/// Orders two entries for display. Directories always precede files, the
/// direction only inverts the order inside each group.
pub fn compare(
    a: &DirectoryEntry,
    b: &DirectoryEntry,
    column: SortColumn,
    direction: SortDirection,
) -> Ordering {
    if a.is_directory != b.is_directory {
        return if a.is_directory {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    let ordering = match column {
        SortColumn::Name => by_name(a, b),
        SortColumn::Size if a.is_directory => by_name(a, b),
        SortColumn::Size => a.size.cmp(&b.size).then_with(|| by_name(a, b)),
        SortColumn::Type => a
            .entry_type
            .to_lowercase()
            .cmp(&b.entry_type.to_lowercase())
            .then_with(|| by_name(a, b)),
        SortColumn::Modified => a.modified.cmp(&b.modified).then_with(|| by_name(a, b)),
    };

    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Sorts the whole set from scratch.
pub fn sort_entries(entries: &mut [DirectoryEntry], settings: &SortSettings) {
    entries.sort_by(|a, b| compare(a, b, settings.column, settings.direction));
}

// NOTE: the exact name breaks ties between names only differing in case to keep the order total
fn by_name(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}
