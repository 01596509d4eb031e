use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use duett_listing::ListingError;
use thiserror::Error;

use crate::{event::Envelope, model::undo::ActionKind};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Sending message failed")]
    ActionSendFailed(#[from] tokio::sync::mpsc::error::SendError<Envelope>),
    #[error("Error aggregation")]
    Aggregate(Vec<AppError>),
    #[error("Target already exists: {0:?}")]
    AlreadyExists(PathBuf),
    #[error("Operation crosses devices: {0:?}")]
    CrossesDevices(PathBuf),
    #[error("Nothing to undo")]
    EmptyLog,
    #[error("File operation failed")]
    FileOperationFailed(#[from] io::Error),
    #[error("Trash info is invalid: {0}")]
    InvalidTrashInfo(String),
    #[error("Path target is invalid: {0:?}")]
    InvalidTargetPath(PathBuf),
    #[error("Listing directory failed")]
    ListingFailed(#[from] ListingError),
    #[error("Resolving trash directory failed")]
    LoadTrashFailed,
    #[error("Action {0:?} is missing parameter {1}")]
    Malformed(ActionKind, &'static str),
    #[error("Directory is not empty: {0:?}")]
    NotEmpty(PathBuf),
    #[error("Path not found: {0:?}")]
    NotFound(PathBuf),
    #[error("No trashed item for {0:?}")]
    NotInTrash(PathBuf),
    #[error("Permission denied: {0:?}")]
    PermissionDenied(PathBuf),
    #[error("Watch operation on path failed")]
    WatchOperationFailed(#[from] notify::Error),
}

impl AppError {
    pub fn from_io(error: io::Error, path: &Path) -> Self {
        let path = path.to_path_buf();
        match error.kind() {
            ErrorKind::AlreadyExists => AppError::AlreadyExists(path),
            ErrorKind::CrossesDevices => AppError::CrossesDevices(path),
            ErrorKind::DirectoryNotEmpty => AppError::NotEmpty(path),
            ErrorKind::NotFound => AppError::NotFound(path),
            ErrorKind::PermissionDenied => AppError::PermissionDenied(path),
            _ => AppError::FileOperationFailed(error),
        }
    }
}
