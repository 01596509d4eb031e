use std::{fs, io, path::Path, time::SystemTime};

use crate::{error::ListingError, model::DirectoryEntry};

/// Reads all entries of `path` into snapshots. Entries vanishing or
/// turning unreadable while reading are skipped.
#[tracing::instrument]
pub fn read_directory(path: &Path, show_hidden: bool) -> Result<Vec<DirectoryEntry>, ListingError> {
    let read_dir = fs::read_dir(path).map_err(|err| ListingError::from_io(err, path))?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(it) => it,
            Err(err) => {
                tracing::warn!("reading entry in {:?} failed: {:?}", path, err);
                continue;
            }
        };

        let entry_path = entry.path();
        let entry = match to_directory_entry(&entry_path) {
            Ok(it) => it,
            Err(err) => {
                tracing::warn!("reading metadata for {:?} failed: {:?}", entry_path, err);
                continue;
            }
        };

        if !show_hidden && entry.is_hidden() {
            continue;
        }

        entries.push(entry);
    }

    tracing::debug!("read {} entries from {:?}", entries.len(), path);

    Ok(entries)
}

pub fn to_directory_entry(path: &Path) -> Result<DirectoryEntry, io::Error> {
    // NOTE: follows symlinks, a link to a directory lists as directory
    let metadata = fs::metadata(path)?;
    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

    if metadata.is_dir() {
        Ok(DirectoryEntry::directory(path, modified))
    } else {
        Ok(DirectoryEntry::file(path, metadata.len(), modified))
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use pretty_assertions::assert_eq;

    use crate::error::ListingError;

    #[test]
    fn read_directory_respects_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();
        fs::write(dir.path().join(".env"), "KEY=1").unwrap();

        let mut names: Vec<_> = super::read_directory(dir.path(), false)
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        names.sort();
        assert_eq!(vec!["notes.md", "sub"], names);

        let entries = super::read_directory(dir.path(), true).unwrap();
        assert_eq!(3, entries.len());

        let notes = entries.iter().find(|entry| entry.name == "notes.md").unwrap();
        assert_eq!(7, notes.size);
        assert_eq!("MD", notes.entry_type);

        let sub = entries.iter().find(|entry| entry.name == "sub").unwrap();
        assert!(sub.is_directory);
    }

    #[test]
    fn read_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let result = super::read_directory(&missing, true);
        assert!(matches!(result, Err(ListingError::NotFound(path)) if path == missing));
    }
}
