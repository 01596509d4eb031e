use std::{
    fs,
    path::Path,
    time::{Duration, SystemTime},
};

use duett_listing::model::{DirectoryEntry, SortColumn, SortDirection, SortSettings};
use pretty_assertions::assert_eq;

fn fixture() -> Vec<DirectoryEntry> {
    let at = |secs| SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
    vec![
        DirectoryEntry::file(Path::new("/w/zz.TXT"), 5, at(10)),
        DirectoryEntry::directory(Path::new("/w/music"), at(99)),
        DirectoryEntry::file(Path::new("/w/a.png"), 500, at(5)),
        DirectoryEntry::directory(Path::new("/w/Books"), at(1)),
        DirectoryEntry::file(Path::new("/w/readme"), 0, at(50)),
        DirectoryEntry::directory(Path::new("/w/.cache"), at(50)),
        DirectoryEntry::file(Path::new("/w/b.txt"), 5, at(10)),
    ]
}

#[test]
fn folders_precede_files_for_every_column_and_direction() {
    for column in SortColumn::ALL {
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let mut entries = fixture();
            duett_listing::sort_entries(&mut entries, &SortSettings { column, direction });

            let first_file = entries
                .iter()
                .position(|entry| !entry.is_directory)
                .unwrap();

            assert!(
                entries[first_file..].iter().all(|entry| !entry.is_directory),
                "folder after file for {} {:?}",
                column,
                direction
            );
            assert_eq!(3, first_file);
        }
    }
}

#[test]
fn type_ascending_fixture() {
    let mut entries = fixture();
    duett_listing::sort_entries(
        &mut entries,
        &SortSettings {
            column: SortColumn::Type,
            direction: SortDirection::Ascending,
        },
    );

    let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(
        vec![".cache", "Books", "music", "readme", "a.png", "b.txt", "zz.TXT"],
        names
    );
}

#[test]
fn sorting_is_deterministic_regardless_of_input_order() {
    let settings = SortSettings {
        column: SortColumn::Size,
        direction: SortDirection::Descending,
    };

    let mut forward = fixture();
    let mut backward = fixture();
    backward.reverse();

    duett_listing::sort_entries(&mut forward, &settings);
    duett_listing::sort_entries(&mut backward, &settings);

    assert_eq!(forward, backward);
}

#[test]
fn list_reads_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.log"), "12345").unwrap();
    fs::write(dir.path().join("a.log"), "1").unwrap();
    fs::create_dir(dir.path().join("z")).unwrap();

    let entries = duett_listing::list(
        dir.path(),
        false,
        &SortSettings {
            column: SortColumn::Size,
            direction: SortDirection::Descending,
        },
    )
    .unwrap();

    let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(vec!["z", "b.log", "a.log"], names);
}
