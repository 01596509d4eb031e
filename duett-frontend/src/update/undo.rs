use std::{fs, path::Path};

use crate::{
    action::{self, Action},
    error::AppError,
    model::{
        trash::Trash,
        undo::{UndoAction, UndoLog, UndoOperation},
        Model,
    },
    ops,
};

use super::pane;

#[derive(Debug, Eq, PartialEq)]
pub enum UndoOutcome {
    Reverted(UndoAction),
    Skipped(UndoAction, String),
}

/// Pops the newest action and applies its inverse. On failure the action
/// is put back, the log is left as it was before the call.
#[tracing::instrument(skip(log, trash))]
pub fn undo_last(log: &mut UndoLog, trash: &Trash) -> Result<UndoOutcome, AppError> {
    let action = match log.pop() {
        Some(it) => it,
        None => {
            tracing::info!("undo log is empty");
            return Err(AppError::EmptyLog);
        }
    };

    tracing::info!("undoing action: {}", action.operation);

    match revert(&action.operation, trash) {
        Ok(None) => Ok(UndoOutcome::Reverted(action)),
        Ok(Some(reason)) => {
            tracing::warn!("cannot undo {}: {}", action.operation, reason);
            Ok(UndoOutcome::Skipped(action, reason))
        }
        Err(err) => {
            tracing::error!("failed to undo {}: {:?}", action.operation, err);
            log.restore(action);
            Err(err)
        }
    }
}

pub fn undo(model: &mut Model) -> Vec<Action> {
    let mut actions = match undo_last(&mut model.undo, &model.trash) {
        Ok(UndoOutcome::Reverted(action)) => {
            vec![action::info(format!("undone: {}", action.operation))]
        }
        Ok(UndoOutcome::Skipped(action, reason)) => vec![action::info(format!(
            "skipped undo of {}: {}",
            action.operation, reason
        ))],
        Err(err) => return vec![action::error(err)],
    };

    actions.extend(pane::refresh_all(model));
    actions
}

fn revert(operation: &UndoOperation, trash: &Trash) -> Result<Option<String>, AppError> {
    match operation {
        UndoOperation::Copy { dest_path } => {
            if !ops::exists(dest_path) {
                return Ok(Some(format!("{:?} does not exist", dest_path)));
            }

            ops::remove_path(dest_path).map_err(|err| AppError::from_io(err, dest_path))?;
            tracing::info!("undid copy: removed {:?}", dest_path);
        }
        UndoOperation::Move {
            src_path,
            dest_path,
        } => {
            if let Some(reason) = check_reversible(dest_path, src_path) {
                return Ok(Some(reason));
            }

            ops::move_path(dest_path, src_path).map_err(|err| AppError::from_io(err, dest_path))?;
            tracing::info!("undid move: {:?} -> {:?}", dest_path, src_path);
        }
        UndoOperation::Delete { path } => {
            trash.restore(path)?;
        }
        UndoOperation::CreateFolder { path } => {
            ensure_exists(path)?;
            fs::remove_dir(path).map_err(|err| AppError::from_io(err, path))?;
            tracing::info!("undid folder creation: removed {:?}", path);
        }
        UndoOperation::CreateFile { path } => {
            ensure_exists(path)?;
            fs::remove_file(path).map_err(|err| AppError::from_io(err, path))?;
            tracing::info!("undid file creation: removed {:?}", path);
        }
        UndoOperation::Rename { old_path, new_path } => {
            if let Some(reason) = check_reversible(new_path, old_path) {
                return Ok(Some(reason));
            }

            fs::rename(new_path, old_path).map_err(|err| AppError::from_io(err, new_path))?;
            tracing::info!("undid rename: {:?} -> {:?}", new_path, old_path);
        }
    }

    Ok(None)
}

fn ensure_exists(path: &Path) -> Result<(), AppError> {
    if ops::exists(path) {
        Ok(())
    } else {
        tracing::warn!("cannot undo creation: {:?} does not exist", path);
        Err(AppError::NotFound(path.to_path_buf()))
    }
}

fn check_reversible(current: &Path, previous: &Path) -> Option<String> {
    if !ops::exists(current) {
        Some(format!("{:?} does not exist", current))
    } else if ops::exists(previous) {
        Some(format!("{:?} already exists", previous))
    } else {
        None
    }
}
