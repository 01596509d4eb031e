use tokio::{sync::mpsc::Sender, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{error::AppError, event::Envelope};

use self::transfer::TransferJob;

pub mod transfer;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Task {
    Transfer(TransferJob),
}

pub struct TaskManager {
    cancellation: CancellationToken,
    sender: Sender<Envelope>,
    tasks: JoinSet<Result<(), AppError>>,
}

impl TaskManager {
    pub fn new(sender: Sender<Envelope>) -> Self {
        Self {
            cancellation: CancellationToken::new(),
            sender,
            tasks: JoinSet::new(),
        }
    }

    pub fn run(&mut self, task: Task) {
        tracing::debug!("handling task: {:?}", task);

        match task {
            Task::Transfer(job) => {
                let sender = self.sender.clone();
                let cancellation = self.cancellation.child_token();
                self.tasks
                    .spawn(async move { transfer::run(job, sender, cancellation).await });
            }
        }
    }

    /// Collects results of tasks that already completed without waiting.
    pub fn reap(&mut self) -> Vec<AppError> {
        let mut errors = Vec::new();
        while let Some(result) = self.tasks.try_join_next() {
            if let Some(error) = to_error(result) {
                errors.push(error);
            }
        }
        errors
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Running tasks finish their current item before they stop.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub async fn finishing(&mut self) -> Result<(), AppError> {
        self.cancel();

        let mut errors = Vec::new();
        while let Some(result) = self.tasks.join_next().await {
            if let Some(error) = to_error(result) {
                errors.push(error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Aggregate(errors))
        }
    }
}

fn to_error(result: Result<Result<(), AppError>, tokio::task::JoinError>) -> Option<AppError> {
    match result {
        Ok(Ok(())) => None,
        Ok(Err(error)) => {
            tracing::error!("task result returned error: {:?}", error);
            Some(error)
        }
        Err(error) => {
            tracing::error!("task failed: {:?}", error);
            None
        }
    }
}
