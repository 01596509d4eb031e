use std::{
    ffi::OsStr,
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// True for anything at `path`, including dangling symlinks.
pub fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

pub fn is_directory(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|metadata| metadata.file_type().is_dir())
}

/// Removes a file, symlink or a whole directory tree.
pub fn remove_path(path: &Path) -> io::Result<()> {
    if is_directory(path) {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Renames `source` to `target`, copying and removing when the rename
/// would cross devices.
pub fn move_path(source: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::CrossesDevices => {
            tracing::debug!("rename crosses devices, copying {:?} to {:?}", source, target);

            copy_path(source, target)?;
            remove_path(source)
        }
        Err(err) => Err(err),
    }
}

pub fn copy_path(source: &Path, target: &Path) -> io::Result<()> {
    if is_directory(source) {
        fs::create_dir_all(target)?;
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            copy_path(&entry.path(), &target.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(source, target).map(|_| ())
    }
}

/// Returns `target` if free, otherwise the first free of
/// `<stem> (copy)<ext>`, `<stem> (copy 2)<ext>`, ...
pub fn unique_path(target: &Path) -> PathBuf {
    if !exists(target) {
        return target.to_path_buf();
    }

    let mut n = 1u32;
    loop {
        let suffix = if n == 1 {
            " (copy)".to_string()
        } else {
            format!(" (copy {})", n)
        };

        let candidate = with_stem_suffix(target, &suffix);
        if !exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Returns `parent/name` if free, otherwise the first free of
/// `<stem> (1)<ext>`, `<stem> (2)<ext>`, ...
pub fn numbered_path(parent: &Path, name: &str) -> PathBuf {
    let target = parent.join(name);
    if !exists(&target) {
        return target;
    }

    let mut n = 1u32;
    loop {
        let candidate = with_stem_suffix(&target, &format!(" ({})", n));
        if !exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

pub fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_stem().map(OsStr::to_os_string).unwrap_or_default();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }

    path.parent().unwrap_or(Path::new(".")).join(name)
}
