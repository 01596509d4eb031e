use std::{
    fmt::Display,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use tokio::{fs, sync::mpsc::Sender};
use tokio_util::sync::CancellationToken;

use crate::{
    error::AppError,
    event::{Envelope, Message, MessageSource},
    ops,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransferMode {
    Copy,
    Move,
}

impl Display for TransferMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferMode::Copy => write!(f, "copy"),
            TransferMode::Move => write!(f, "move"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferJob {
    pub id: u16,
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
    pub mode: TransferMode,
}

/// Copies or moves every source into the job destination, one after the
/// other. Item results are reported as messages, only a closed channel
/// fails the job itself.
#[tracing::instrument(skip(sender, cancellation))]
pub async fn run(
    job: TransferJob,
    sender: Sender<Envelope>,
    cancellation: CancellationToken,
) -> Result<(), AppError> {
    let total = job.sources.len();
    for (index, source) in job.sources.iter().enumerate() {
        if cancellation.is_cancelled() {
            tracing::warn!(
                "transfer {} cancelled with {} items remaining",
                job.id,
                total - index
            );
            break;
        }

        let message = match transfer_item(source, &job.destination, job.mode).await {
            Ok(target) => {
                tracing::info!("{} done: {:?} -> {:?}", job.mode, source, target);
                Message::TransferItemDone {
                    id: job.id,
                    source: source.clone(),
                    target,
                    mode: job.mode,
                }
            }
            Err(err) => {
                tracing::error!("{} failed for {:?}: {:?}", job.mode, source, err);
                Message::TransferItemFailed {
                    id: job.id,
                    source: source.clone(),
                    error: err.to_string(),
                }
            }
        };

        let progress = ((index + 1) * 100 / total) as u8;
        let messages = vec![message, Message::TransferProgress(job.id, progress)];
        emit(&sender, &cancellation, messages).await?;
    }

    emit(&sender, &cancellation, vec![Message::TransferFinished(job.id)]).await
}

async fn emit(
    sender: &Sender<Envelope>,
    cancellation: &CancellationToken,
    messages: Vec<Message>,
) -> Result<(), AppError> {
    let envelope = Envelope {
        messages,
        source: MessageSource::Task,
    };

    match sender.send(envelope).await {
        Ok(()) => Ok(()),
        Err(_) if cancellation.is_cancelled() => {
            tracing::debug!("session closed, dropping transfer messages");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn transfer_item(
    source: &Path,
    destination: &Path,
    mode: TransferMode,
) -> Result<PathBuf, AppError> {
    let metadata = fs::symlink_metadata(source)
        .await
        .map_err(|err| AppError::from_io(err, source))?;

    let name = match source.file_name() {
        Some(it) => it,
        None => return Err(AppError::InvalidTargetPath(source.to_path_buf())),
    };

    // NOTE: guards compare resolved paths, `--to dir/../dir` must not slip by
    let resolved_destination = fs::canonicalize(destination)
        .await
        .map_err(|err| AppError::from_io(err, destination))?;
    let resolved_source = match source.parent() {
        Some(parent) => fs::canonicalize(parent)
            .await
            .map_err(|err| AppError::from_io(err, parent))?
            .join(name),
        None => source.to_path_buf(),
    };

    if metadata.is_dir() && resolved_destination.starts_with(&resolved_source) {
        return Err(AppError::InvalidTargetPath(destination.to_path_buf()));
    }

    if mode == TransferMode::Move && resolved_source.parent() == Some(&resolved_destination) {
        return Err(AppError::InvalidTargetPath(destination.to_path_buf()));
    }

    let target = ops::unique_path(&destination.join(name));
    match mode {
        TransferMode::Copy => copy_tree(source, &target).await,
        TransferMode::Move => move_tree(source, &target).await,
    }
    .map_err(|err| AppError::from_io(err, source))?;

    Ok(target)
}

async fn move_tree(source: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(source, target).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::CrossesDevices => {
            tracing::debug!("rename crosses devices, copying {:?}", source);

            copy_tree(source, target).await?;
            if fs::symlink_metadata(source).await?.is_dir() {
                fs::remove_dir_all(source).await
            } else {
                fs::remove_file(source).await
            }
        }
        Err(err) => Err(err),
    }
}

async fn copy_tree(source: &Path, target: &Path) -> io::Result<()> {
    if !fs::symlink_metadata(source).await?.is_dir() {
        fs::copy(source, target).await?;
        return Ok(());
    }

    let mut pending = vec![(source.to_path_buf(), target.to_path_buf())];
    while let Some((from, to)) = pending.pop() {
        fs::create_dir(&to).await?;

        let mut read_dir = fs::read_dir(&from).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let next = to.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((entry.path(), next));
            } else {
                fs::copy(entry.path(), next).await?;
            }
        }
    }

    Ok(())
}
