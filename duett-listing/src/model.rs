use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
    time::SystemTime,
};

pub const FOLDER_TYPE: &str = "Folder";
pub const FILE_TYPE: &str = "File";

/// Snapshot of one row of a directory listing. Re-listing a directory
/// produces a fresh set, entries are never updated in place.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size: u64,
    pub entry_type: String,
    pub modified: SystemTime,
}

impl DirectoryEntry {
    pub fn directory(path: &Path, modified: SystemTime) -> Self {
        Self {
            name: get_name(path),
            path: path.to_path_buf(),
            is_directory: true,
            size: 0,
            entry_type: FOLDER_TYPE.to_owned(),
            modified,
        }
    }

    pub fn file(path: &Path, size: u64, modified: SystemTime) -> Self {
        let entry_type = match path.extension() {
            Some(ext) if !ext.is_empty() => ext.to_string_lossy().to_uppercase(),
            _ => FILE_TYPE.to_owned(),
        };

        Self {
            name: get_name(path),
            path: path.to_path_buf(),
            is_directory: false,
            size,
            entry_type,
            modified,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

fn get_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SortColumn {
    #[default]
    Name,
    Size,
    Type,
    Modified,
}

impl SortColumn {
    pub const ALL: [SortColumn; 4] = [
        SortColumn::Name,
        SortColumn::Size,
        SortColumn::Type,
        SortColumn::Modified,
    ];
}

impl Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortColumn::Name => "name",
            SortColumn::Size => "size",
            SortColumn::Type => "type",
            SortColumn::Modified => "modified",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortColumn::Name),
            "size" => Ok(SortColumn::Size),
            "type" => Ok(SortColumn::Type),
            "modified" | "date" => Ok(SortColumn::Modified),
            _ => Err(format!("unknown sort column '{}'", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SortSettings {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSettings {
    /// Header click: the active column flips its direction, any other
    /// column starts ascending.
    pub fn select(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.toggle();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }
}
