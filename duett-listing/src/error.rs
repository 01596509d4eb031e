use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Directory not found: {0:?}")]
    NotFound(PathBuf),
    #[error("Path is not a directory: {0:?}")]
    NotADirectory(PathBuf),
    #[error("Permission denied: {0:?}")]
    PermissionDenied(PathBuf),
    #[error("Reading directory failed")]
    ReadFailed(#[from] io::Error),
}

impl ListingError {
    pub fn from_io(error: io::Error, path: &Path) -> Self {
        match error.kind() {
            ErrorKind::NotFound => ListingError::NotFound(path.to_path_buf()),
            ErrorKind::NotADirectory => ListingError::NotADirectory(path.to_path_buf()),
            ErrorKind::PermissionDenied => ListingError::PermissionDenied(path.to_path_buf()),
            _ => ListingError::ReadFailed(error),
        }
    }
}
