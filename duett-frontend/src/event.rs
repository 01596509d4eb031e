use std::{
    io::{self, BufRead},
    path::{Path, PathBuf},
    thread,
};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::{
    error::AppError,
    task::{transfer::TransferMode, Task, TaskManager},
};

#[derive(Debug)]
pub struct Envelope {
    pub messages: Vec<Message>,
    pub source: MessageSource,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageSource {
    Filesystem,
    Task,
    User,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Message {
    Command(String),
    InputClosed,
    PathsChanged(Vec<PathBuf>),
    TransferFinished(u16),
    TransferItemDone {
        id: u16,
        source: PathBuf,
        target: PathBuf,
        mode: TransferMode,
    },
    TransferItemFailed {
        id: u16,
        source: PathBuf,
        error: String,
    },
    TransferProgress(u16, u8),
}

pub struct Emitter {
    pub receiver: Receiver<Envelope>,
    tasks: TaskManager,
    watcher: RecommendedWatcher,
}

impl Emitter {
    pub fn start() -> Result<Self, AppError> {
        let (sender, receiver) = mpsc::channel(16);

        let (watcher_sender, mut notify_receiver) = mpsc::unbounded_channel();
        let watcher = notify::recommended_watcher(move |res| {
            if let Err(error) = watcher_sender.send(res) {
                tracing::error!("sending watched directory changes failed: {:?}", error);
            }
        })?;

        let internal_sender = sender.clone();
        tokio::spawn(async move {
            while let Some(result) = notify_receiver.recv().await {
                let event = match result {
                    Ok(it) => it,
                    Err(error) => {
                        tracing::error!("watching directory failed: {:?}", error);
                        continue;
                    }
                };

                if let Some(messages) = handle_notify_event(event) {
                    let envelope = Envelope {
                        messages,
                        source: MessageSource::Filesystem,
                    };

                    if internal_sender.send(envelope).await.is_err() {
                        break;
                    }
                }
            }
        });

        start_stdin_listener(sender.clone());

        Ok(Self {
            receiver,
            tasks: TaskManager::new(sender),
            watcher,
        })
    }

    pub fn run(&mut self, task: Task) {
        self.tasks.run(task);
    }

    /// Errors of tasks that completed since the last call.
    pub fn reap(&mut self) -> Vec<AppError> {
        self.tasks.reap()
    }

    pub fn watch(&mut self, path: &Path) -> Result<(), AppError> {
        Ok(self.watcher.watch(path, RecursiveMode::NonRecursive)?)
    }

    pub fn unwatch(&mut self, path: &Path) -> Result<(), AppError> {
        Ok(self.watcher.unwatch(path)?)
    }

    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.tasks.cancel();
        self.receiver.close();
        self.tasks.finishing().await
    }
}

/// Reads commands line by line on a dedicated thread. Blocking stdin reads
/// would otherwise keep the runtime from shutting down.
fn start_stdin_listener(sender: Sender<Envelope>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(it) => it,
                Err(error) => {
                    tracing::error!("reading stdin failed: {:?}", error);
                    break;
                }
            };

            let envelope = Envelope {
                messages: vec![Message::Command(line)],
                source: MessageSource::User,
            };

            if sender.blocking_send(envelope).is_err() {
                return;
            }
        }

        tracing::info!("stdin closed");

        let _ = sender.blocking_send(Envelope {
            messages: vec![Message::InputClosed],
            source: MessageSource::User,
        });
    });
}

#[tracing::instrument]
fn handle_notify_event(event: notify::Event) -> Option<Vec<Message>> {
    match event.kind {
        notify::EventKind::Create(_)
        | notify::EventKind::Modify(_)
        | notify::EventKind::Remove(_) => {
            if event.paths.is_empty() {
                tracing::warn!("event is invalid: {:?}", event);
                None
            } else {
                Some(vec![Message::PathsChanged(event.paths)])
            }
        }
        notify::EventKind::Any | notify::EventKind::Access(_) | notify::EventKind::Other => {
            tracing::trace!("missed handle for notify event: {:?}", event);
            None
        }
    }
}
