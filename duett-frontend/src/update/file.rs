use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use crate::{
    action::{self, Action},
    error::AppError,
    model::{
        undo::{ActionKind, ActionParams},
        Model, TransferState,
    },
    ops,
    task::{
        transfer::{TransferJob, TransferMode},
        Task,
    },
};

use super::pane;

const DEFAULT_FOLDER_NAME: &str = "New Folder";
const DEFAULT_FILE_NAME: &str = "New File.txt";

#[tracing::instrument(skip(model))]
pub fn create_folder(model: &mut Model, name: Option<&str>) -> Vec<Action> {
    let path = match target_path(model, name, DEFAULT_FOLDER_NAME) {
        Ok(it) => it,
        Err(err) => return vec![action::error(err)],
    };

    if let Err(err) = fs::create_dir(&path) {
        return vec![action::error(AppError::from_io(err, &path))];
    }

    tracing::info!("created folder: {:?}", path);
    model
        .undo
        .record(ActionKind::CreateFolder, ActionParams::default().path(&path));

    finish(model, format!("created folder {}", path.to_string_lossy()))
}

#[tracing::instrument(skip(model))]
pub fn create_file(model: &mut Model, name: Option<&str>) -> Vec<Action> {
    let path = match target_path(model, name, DEFAULT_FILE_NAME) {
        Ok(it) => it,
        Err(err) => return vec![action::error(err)],
    };

    if let Err(err) = OpenOptions::new().write(true).create_new(true).open(&path) {
        return vec![action::error(AppError::from_io(err, &path))];
    }

    tracing::info!("created file: {:?}", path);
    model
        .undo
        .record(ActionKind::CreateFile, ActionParams::default().path(&path));

    finish(model, format!("created file {}", path.to_string_lossy()))
}

#[tracing::instrument(skip(model))]
pub fn rename(model: &mut Model, old: &str, new: &str) -> Vec<Action> {
    let base = &model.active_pane().path;
    let (old_path, new_path) = match (item_path(base, old), item_path(base, new)) {
        (Ok(old_path), Ok(new_path)) => (old_path, new_path),
        (Err(err), _) | (_, Err(err)) => return vec![action::error(err)],
    };

    if !ops::exists(&old_path) {
        return vec![action::error(AppError::NotFound(old_path))];
    }

    if ops::exists(&new_path) {
        return vec![action::error(AppError::AlreadyExists(new_path))];
    }

    if let Err(err) = fs::rename(&old_path, &new_path) {
        return vec![action::error(AppError::from_io(err, &old_path))];
    }

    tracing::info!("renamed {:?} to {:?}", old_path, new_path);
    model.undo.record(
        ActionKind::Rename,
        ActionParams::default()
            .old_path(&old_path)
            .new_path(&new_path),
    );

    finish(
        model,
        format!(
            "renamed {} to {}",
            old_path.to_string_lossy(),
            new_path.to_string_lossy()
        ),
    )
}

/// Moves every named item to the trash. Failing items are reported, the
/// remaining ones are still processed.
#[tracing::instrument(skip(model))]
pub fn trash(model: &mut Model, names: &[String]) -> Vec<Action> {
    if names.is_empty() {
        return vec![action::error(AppError::InvalidTargetPath(PathBuf::new()))];
    }

    let base = model.active_pane().path.clone();

    let mut actions = Vec::new();
    for name in names {
        let path = match item_path(&base, name) {
            Ok(it) => it,
            Err(err) => {
                actions.push(action::error(err));
                continue;
            }
        };

        match model.trash.move_to_trash(&path) {
            Ok(entry) => {
                model.undo.record(
                    ActionKind::Delete,
                    ActionParams::default().path(&entry.info.original),
                );

                actions.push(action::info(format!(
                    "trashed {}",
                    entry.info.original.to_string_lossy()
                )));
            }
            Err(err) => actions.push(action::error(err)),
        }
    }

    actions.extend(pane::refresh_all(model));
    actions
}

/// Starts a background transfer of `args` into the other pane's directory,
/// or into the directory given with `--to <dir>`.
#[tracing::instrument(skip(model))]
pub fn transfer(model: &mut Model, args: &[String], mode: TransferMode) -> Vec<Action> {
    let base = model.active_pane().path.clone();

    let mut destination = None;
    let mut sources = Vec::new();
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        if arg == "--to" {
            match args.next() {
                Some(dir) if !dir.is_empty() => destination = Some(pane::resolve(&base, dir)),
                Some(_) => return vec![action::error(AppError::InvalidTargetPath(base))],
                None => return vec![action::error("--to requires a directory")],
            }
        } else {
            match item_path(&base, arg) {
                Ok(it) => sources.push(it),
                Err(err) => return vec![action::error(err)],
            }
        }
    }

    let destination = match destination.or_else(|| model.other_path().cloned()) {
        Some(it) => it,
        None => return vec![action::error("no target, open a second pane or use --to")],
    };

    if !ops::is_directory(&destination) {
        return vec![action::error(AppError::InvalidTargetPath(destination))];
    }

    if sources.is_empty() {
        return vec![action::error("nothing to transfer")];
    }

    let id = model.next_transfer_id();
    model.transfers.insert(
        id,
        TransferState {
            destination: destination.clone(),
            mode,
            progress: 0,
        },
    );

    tracing::info!("starting {} transfer {} of {} items", mode, id, sources.len());

    let message = format!(
        "[{}] {} of {} items to {} started",
        id,
        mode,
        sources.len(),
        destination.to_string_lossy()
    );

    vec![
        action::info(message),
        Action::Task(Task::Transfer(TransferJob {
            id,
            sources,
            destination,
            mode,
        })),
    ]
}

fn target_path(model: &Model, name: Option<&str>, default: &str) -> Result<PathBuf, AppError> {
    let base = &model.active_pane().path;
    match name {
        Some(name) => {
            let path = item_path(base, name)?;
            if ops::exists(&path) {
                Err(AppError::AlreadyExists(path))
            } else {
                Ok(path)
            }
        }
        None => Ok(ops::numbered_path(base, default)),
    }
}

/// Resolves `name` against `base`. Names without a final component, like
/// `''`, `.` or `..`, would address the pane directory or a parent.
fn item_path(base: &Path, name: &str) -> Result<PathBuf, AppError> {
    if name.is_empty() || Path::new(name).file_name().is_none() {
        return Err(AppError::InvalidTargetPath(base.join(name)));
    }

    Ok(pane::resolve(base, name))
}

fn finish(model: &mut Model, message: String) -> Vec<Action> {
    let mut actions = vec![action::info(message)];
    actions.extend(pane::refresh_all(model));
    actions
}
