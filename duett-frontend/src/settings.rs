use std::path::PathBuf;

use duett_listing::model::SortSettings;

use crate::{error::AppError, model::undo::DEFAULT_UNDO_CAPACITY};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub max_undo: usize,
    pub second_path: Option<PathBuf>,
    pub show_hidden: bool,
    pub sort: SortSettings,
    pub startup_path: Option<PathBuf>,
    pub trash_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_UNDO_CAPACITY,
            second_path: None,
            show_hidden: false,
            sort: SortSettings::default(),
            startup_path: None,
            trash_path: None,
        }
    }
}

impl Settings {
    /// Configured trash root, or the desktop trash in the local data dir.
    pub fn trash_root(&self) -> Result<PathBuf, AppError> {
        if let Some(path) = &self.trash_path {
            return Ok(path.clone());
        }

        match dirs::data_local_dir() {
            Some(data_dir) => Ok(data_dir.join("Trash")),
            None => Err(AppError::LoadTrashFailed),
        }
    }
}
