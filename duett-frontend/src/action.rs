use std::{
    fmt::Debug,
    io::{self, Write},
    path::PathBuf,
};

use crate::{error::AppError, event::Emitter, task::Task};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    Print(Vec<PrintContent>),
    Quit,
    Task(Task),
    UnwatchPath(PathBuf),
    WatchPath(PathBuf),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PrintContent {
    Default(String),
    Error(String),
    Information(String),
}

#[derive(Debug, Eq, PartialEq)]
pub enum ActionResult {
    Normal,
    Quit,
}

pub fn info(message: impl Into<String>) -> Action {
    Action::Print(vec![PrintContent::Information(message.into())])
}

pub fn error(error: impl Debug + std::fmt::Display) -> Action {
    tracing::error!("{:?}", error);
    Action::Print(vec![PrintContent::Error(error.to_string())])
}

pub fn print(lines: Vec<String>) -> Action {
    Action::Print(lines.into_iter().map(PrintContent::Default).collect())
}

#[tracing::instrument(skip(emitter, actions))]
pub fn exec(emitter: &mut Emitter, actions: Vec<Action>) -> Result<ActionResult, AppError> {
    let mut result = ActionResult::Normal;
    let mut stdout = io::stdout().lock();

    for action in actions {
        match action {
            Action::Print(contents) => {
                for content in contents {
                    match content {
                        PrintContent::Default(line) => writeln!(stdout, "{}", line)?,
                        PrintContent::Error(line) => writeln!(stdout, "error: {}", line)?,
                        PrintContent::Information(line) => writeln!(stdout, "{}", line)?,
                    }
                }
            }
            Action::Quit => result = ActionResult::Quit,
            Action::Task(task) => emitter.run(task),
            Action::UnwatchPath(path) => {
                if let Err(error) = emitter.unwatch(&path) {
                    tracing::warn!("unwatch failed for {:?}: {:?}", path, error);
                }
            }
            Action::WatchPath(path) => {
                if let Err(error) = emitter.watch(&path) {
                    tracing::warn!("watch failed for {:?}: {:?}", path, error);
                }
            }
        }
    }

    stdout.flush()?;

    Ok(result)
}
