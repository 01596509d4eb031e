use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::SystemTime,
};

use chrono::{Local, NaiveDateTime};

use crate::{error::AppError, ops};

pub const TRASH_INFO_EXTENSION: &str = ".trashinfo";
const TRASH_INFO_HEADER: &str = "[Trash Info]";
const DELETION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Desktop trash with a `files` area for content and an `info` area with
/// one `<name>.trashinfo` sidecar per trashed item.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trash {
    pub files: PathBuf,
    pub info: PathBuf,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrashInfo {
    pub original: PathBuf,
    pub deleted_at: NaiveDateTime,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrashEntry {
    pub name: OsString,
    pub content: PathBuf,
    pub info_path: PathBuf,
    pub info: TrashInfo,
}

impl Display for TrashInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", TRASH_INFO_HEADER)?;
        writeln!(f, "Path={}", encode_path(&self.original))?;
        writeln!(f, "DeletionDate={}", self.deleted_at.format(DELETION_DATE_FORMAT))
    }
}

impl FromStr for TrashInfo {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines().map(str::trim).filter(|line| !line.is_empty());
        if lines.next() != Some(TRASH_INFO_HEADER) {
            return Err(AppError::InvalidTrashInfo("missing header".to_string()));
        }

        let mut original = None;
        let mut deleted_at = None;
        for line in lines {
            match line.split_once('=') {
                Some(("Path", value)) => {
                    let decoded = urlencoding::decode_binary(value.as_bytes()).into_owned();
                    original = Some(PathBuf::from(from_bytes(decoded)));
                }
                Some(("DeletionDate", value)) => {
                    let date = NaiveDateTime::parse_from_str(value, DELETION_DATE_FORMAT)
                        .map_err(|err| AppError::InvalidTrashInfo(err.to_string()))?;
                    deleted_at = Some(date);
                }
                _ => tracing::trace!("ignoring trash info line: {:?}", line),
            }
        }

        match (original, deleted_at) {
            (Some(original), Some(deleted_at)) => Ok(Self {
                original,
                deleted_at,
            }),
            (None, _) => Err(AppError::InvalidTrashInfo("missing Path".to_string())),
            (_, None) => Err(AppError::InvalidTrashInfo("missing DeletionDate".to_string())),
        }
    }
}

impl Trash {
    pub fn new(root: &Path) -> Result<Self, AppError> {
        let trash = Self {
            files: root.join("files"),
            info: root.join("info"),
        };
        trash.ensure_areas()?;

        Ok(trash)
    }

    #[tracing::instrument(skip(self))]
    pub fn move_to_trash(&self, path: &Path) -> Result<TrashEntry, AppError> {
        if !ops::exists(path) {
            tracing::warn!("cannot move to trash: {:?} does not exist", path);
            return Err(AppError::NotFound(path.to_path_buf()));
        }

        let original = std::path::absolute(path).map_err(|err| AppError::from_io(err, path))?;
        let name = match original.file_name() {
            Some(it) => it.to_os_string(),
            None => return Err(AppError::InvalidTargetPath(original)),
        };

        self.ensure_areas()?;

        let name = self.reserve_name(&name);
        let content = self.files.join(&name);
        let info_path = self.info_path(&name);

        ops::move_path(&original, &content).map_err(|err| AppError::from_io(err, &original))?;

        let info = TrashInfo {
            original: original.clone(),
            deleted_at: Local::now().naive_local(),
        };

        if let Err(err) = fs::write(&info_path, info.to_string()) {
            tracing::error!("writing trash info failed, moving {:?} back: {:?}", original, err);

            if let Err(rollback) = ops::move_path(&content, &original) {
                tracing::error!("moving {:?} back failed: {:?}", original, rollback);
            }
            return Err(AppError::from_io(err, &info_path));
        }

        tracing::info!("moved to trash: {:?} -> {:?}", original, content);

        Ok(TrashEntry {
            name,
            content,
            info_path,
            info,
        })
    }

    /// Restores the most recently trashed item whose recorded origin is
    /// `original` and removes its sidecar.
    #[tracing::instrument(skip(self))]
    pub fn restore(&self, original: &Path) -> Result<PathBuf, AppError> {
        let entry = match self
            .entries()?
            .into_iter()
            .find(|entry| entry.info.original == original)
        {
            Some(it) => it,
            None => {
                tracing::warn!("cannot restore {:?}: not found in trash", original);
                return Err(AppError::NotInTrash(original.to_path_buf()));
            }
        };

        if ops::exists(original) {
            tracing::warn!("cannot restore {:?}: path is occupied", original);
            return Err(AppError::AlreadyExists(original.to_path_buf()));
        }

        if let Some(parent) = original.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::from_io(err, parent))?;
        }

        ops::move_path(&entry.content, original)
            .map_err(|err| AppError::from_io(err, &entry.content))?;

        if let Err(err) = fs::remove_file(&entry.info_path) {
            tracing::warn!("removing trash info {:?} failed: {:?}", entry.info_path, err);
        }

        tracing::info!("restored {:?} from trash", original);

        Ok(original.to_path_buf())
    }

    /// All entries with readable sidecars and existing content, most
    /// recently trashed first.
    pub fn entries(&self) -> Result<Vec<TrashEntry>, AppError> {
        let read_dir = match fs::read_dir(&self.info) {
            Ok(it) => it,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(AppError::from_io(err, &self.info)),
        };

        let mut entries = Vec::new();
        for entry in read_dir.flatten() {
            let info_path = entry.path();
            let file_name = entry.file_name();
            let name = match to_bytes(&file_name).strip_suffix(TRASH_INFO_EXTENSION.as_bytes()) {
                Some(it) if !it.is_empty() => from_bytes(it.to_vec()),
                _ => continue,
            };

            let info = match fs::read_to_string(&info_path)
                .map_err(AppError::FileOperationFailed)
                .and_then(|content| content.parse::<TrashInfo>())
            {
                Ok(it) => it,
                Err(err) => {
                    tracing::warn!("skipping trash info {:?}: {}", info_path, err);
                    continue;
                }
            };

            let content = self.files.join(&name);
            if !ops::exists(&content) {
                tracing::warn!("skipping trash info {:?}: content is missing", info_path);
                continue;
            }

            // NOTE: sidecar mtime orders deletions within the same second
            let written = entry
                .metadata()
                .and_then(|metadata| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);

            entries.push((
                written,
                TrashEntry {
                    name,
                    content,
                    info_path,
                    info,
                },
            ));
        }

        entries.sort_by(|(a_written, a), (b_written, b)| {
            b.info
                .deleted_at
                .cmp(&a.info.deleted_at)
                .then_with(|| b_written.cmp(a_written))
                .then_with(|| b.name.cmp(&a.name))
        });

        Ok(entries.into_iter().map(|(_, entry)| entry).collect())
    }

    /// Irreversibly purges both areas and recreates them empty.
    pub fn empty(&self) -> Result<(), AppError> {
        for area in [&self.files, &self.info] {
            if ops::exists(area) {
                fs::remove_dir_all(area).map_err(|err| AppError::from_io(err, area))?;
            }
        }
        self.ensure_areas()?;

        tracing::info!("emptied trash");

        Ok(())
    }

    fn ensure_areas(&self) -> Result<(), AppError> {
        for area in [&self.files, &self.info] {
            fs::create_dir_all(area).map_err(|err| AppError::from_io(err, area))?;
        }
        Ok(())
    }

    fn info_path(&self, name: &OsStr) -> PathBuf {
        let mut file_name = name.to_os_string();
        file_name.push(TRASH_INFO_EXTENSION);
        self.info.join(file_name)
    }

    // NOTE: content and sidecar names must stay in sync, both must be free
    fn reserve_name(&self, name: &OsStr) -> OsString {
        let is_free = |candidate: &OsStr| {
            !ops::exists(&self.files.join(candidate)) && !ops::exists(&self.info_path(candidate))
        };

        if is_free(name) {
            return name.to_os_string();
        }

        let mut counter = 1u32;
        loop {
            let candidate =
                ops::with_stem_suffix(Path::new(name), &format!("_{}", counter)).into_os_string();

            if is_free(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Percent-encodes every segment of the raw path bytes, `/` is kept.
fn encode_path(path: &Path) -> String {
    to_bytes(path.as_os_str())
        .split(|byte| *byte == b'/')
        .map(|segment| urlencoding::encode_binary(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn to_bytes(value: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(value.as_bytes())
}

#[cfg(unix)]
fn from_bytes(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn to_bytes(value: &OsStr) -> Cow<'_, [u8]> {
    Cow::Owned(value.to_string_lossy().into_owned().into_bytes())
}

#[cfg(not(unix))]
fn from_bytes(bytes: Vec<u8>) -> OsString {
    OsString::from(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod test {
    use std::{ffi::OsString, fs, path::PathBuf};

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::error::AppError;

    use super::{Trash, TrashInfo};

    fn trash() -> (tempfile::TempDir, Trash) {
        let dir = tempfile::tempdir().unwrap();
        let trash = Trash::new(&dir.path().join("Trash")).unwrap();
        (dir, trash)
    }

    #[test]
    fn trash_info_format() {
        let info = TrashInfo {
            original: PathBuf::from("/home/user/my notes/100%.txt"),
            deleted_at: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(8, 5, 1)
                .unwrap(),
        };

        let content = info.to_string();
        assert_eq!(
            "[Trash Info]\nPath=/home/user/my%20notes/100%25.txt\nDeletionDate=2024-03-09T08:05:01\n",
            content
        );
        assert_eq!(info, content.parse::<TrashInfo>().unwrap());
    }

    #[test]
    fn trash_info_requires_header_and_keys() {
        assert!(matches!(
            "Path=/a\nDeletionDate=2024-03-09T08:05:01".parse::<TrashInfo>(),
            Err(AppError::InvalidTrashInfo(_))
        ));
        assert!(matches!(
            "[Trash Info]\nPath=/a\n".parse::<TrashInfo>(),
            Err(AppError::InvalidTrashInfo(_))
        ));
    }

    #[test]
    fn move_missing_path_leaves_no_artifacts() {
        let (dir, trash) = trash();
        let missing = dir.path().join("ghost.txt");

        let result = trash.move_to_trash(&missing);
        assert!(matches!(result, Err(AppError::NotFound(path)) if path == missing));
        assert_eq!(0, fs::read_dir(&trash.files).unwrap().count());
        assert_eq!(0, fs::read_dir(&trash.info).unwrap().count());
    }

    #[test]
    fn move_writes_content_and_sidecar() {
        let (dir, trash) = trash();
        let file = dir.path().join("report.txt");
        fs::write(&file, "numbers").unwrap();

        let entry = trash.move_to_trash(&file).unwrap();
        assert!(!file.exists());
        assert_eq!(OsString::from("report.txt"), entry.name);
        assert_eq!("numbers", fs::read_to_string(&entry.content).unwrap());

        let info = fs::read_to_string(trash.info.join("report.txt.trashinfo")).unwrap();
        let info: TrashInfo = info.parse().unwrap();
        assert_eq!(file, info.original);
    }

    #[test]
    fn same_base_name_is_disambiguated_and_restorable() {
        let (dir, trash) = trash();
        let first = dir.path().join("one").join("a.txt");
        let second = dir.path().join("two").join("a.txt");
        fs::create_dir_all(first.parent().unwrap()).unwrap();
        fs::create_dir_all(second.parent().unwrap()).unwrap();
        fs::write(&first, "first").unwrap();
        fs::write(&second, "second").unwrap();

        let first_entry = trash.move_to_trash(&first).unwrap();
        let second_entry = trash.move_to_trash(&second).unwrap();
        assert_eq!(OsString::from("a.txt"), first_entry.name);
        assert_eq!(OsString::from("a_1.txt"), second_entry.name);
        assert!(trash.info.join("a_1.txt.trashinfo").exists());

        trash.restore(&first).unwrap();
        trash.restore(&second).unwrap();
        assert_eq!("first", fs::read_to_string(&first).unwrap());
        assert_eq!("second", fs::read_to_string(&second).unwrap());
        assert!(trash.entries().unwrap().is_empty());
    }

    #[test]
    fn restore_recreates_parents() {
        let (dir, trash) = trash();
        let nested = dir.path().join("deep").join("er");
        fs::create_dir_all(&nested).unwrap();
        let file = nested.join("keep.md");
        fs::write(&file, "x").unwrap();

        trash.move_to_trash(&file).unwrap();
        fs::remove_dir_all(dir.path().join("deep")).unwrap();

        assert_eq!(file, trash.restore(&file).unwrap());
        assert_eq!("x", fs::read_to_string(&file).unwrap());
    }

    #[test]
    fn restore_does_not_overwrite() {
        let (dir, trash) = trash();
        let file = dir.path().join("taken.txt");
        fs::write(&file, "old").unwrap();
        trash.move_to_trash(&file).unwrap();
        fs::write(&file, "new").unwrap();

        let result = trash.restore(&file);
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
        assert_eq!("new", fs::read_to_string(&file).unwrap());
        assert_eq!(1, trash.entries().unwrap().len());
    }

    #[test]
    fn empty_purges_everything() {
        let (dir, trash) = trash();
        let folder = dir.path().join("folder");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("inner"), "x").unwrap();
        trash.move_to_trash(&folder).unwrap();

        trash.empty().unwrap();
        assert!(trash.files.is_dir());
        assert!(trash.info.is_dir());
        assert!(trash.entries().unwrap().is_empty());

        let result = trash.restore(&folder);
        assert!(matches!(result, Err(AppError::NotInTrash(path)) if path == folder));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_is_kept_and_restorable() {
        use std::os::unix::ffi::OsStrExt;

        let (dir, trash) = trash();
        let file = dir.path().join(std::ffi::OsStr::from_bytes(b"caf\xe9.txt"));
        fs::write(&file, "latin1").unwrap();

        let entry = trash.move_to_trash(&file).unwrap();
        assert_eq!(file, entry.info.original);
        assert_eq!(trash.files.join(std::ffi::OsStr::from_bytes(b"caf\xe9.txt")), entry.content);

        let sidecar = fs::read_to_string(&entry.info_path).unwrap();
        assert!(sidecar.contains("caf%E9.txt"));

        let originals: Vec<_> = trash
            .entries()
            .unwrap()
            .into_iter()
            .map(|entry| entry.info.original)
            .collect();
        assert_eq!(vec![file.clone()], originals);

        trash.restore(&file).unwrap();
        assert_eq!("latin1", fs::read_to_string(&file).unwrap());
        assert!(trash.entries().unwrap().is_empty());
    }
}
