pub use compare::{compare, sort_entries};
pub use error::ListingError;
pub use read::{read_directory, to_directory_entry};

mod compare;
mod error;
pub mod model;
mod read;

use model::{DirectoryEntry, SortSettings};

/// Reads `path` and returns its entries in display order.
pub fn list(
    path: &std::path::Path,
    show_hidden: bool,
    sort: &SortSettings,
) -> Result<Vec<DirectoryEntry>, ListingError> {
    let mut entries = read_directory(path, show_hidden)?;
    sort_entries(&mut entries, sort);
    Ok(entries)
}
