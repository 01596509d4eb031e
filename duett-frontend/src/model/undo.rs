use std::{collections::VecDeque, fmt::Display, path::PathBuf, time::SystemTime};

use crate::error::AppError;

pub const DEFAULT_UNDO_CAPACITY: usize = 100;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ActionKind {
    Copy,
    Move,
    Delete,
    CreateFolder,
    CreateFile,
    Rename,
}

/// Loose parameter set for [`UndoAction::new`]. Which fields are required
/// depends on the [`ActionKind`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActionParams {
    pub path: Option<PathBuf>,
    pub src_path: Option<PathBuf>,
    pub dest_path: Option<PathBuf>,
    pub old_path: Option<PathBuf>,
    pub new_path: Option<PathBuf>,
}

impl ActionParams {
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn src_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.src_path = Some(path.into());
        self
    }

    pub fn dest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dest_path = Some(path.into());
        self
    }

    pub fn old_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.old_path = Some(path.into());
        self
    }

    pub fn new_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.new_path = Some(path.into());
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UndoOperation {
    Copy { dest_path: PathBuf },
    Move { src_path: PathBuf, dest_path: PathBuf },
    Delete { path: PathBuf },
    CreateFolder { path: PathBuf },
    CreateFile { path: PathBuf },
    Rename { old_path: PathBuf, new_path: PathBuf },
}

impl UndoOperation {
    pub fn kind(&self) -> ActionKind {
        match self {
            UndoOperation::Copy { .. } => ActionKind::Copy,
            UndoOperation::Move { .. } => ActionKind::Move,
            UndoOperation::Delete { .. } => ActionKind::Delete,
            UndoOperation::CreateFolder { .. } => ActionKind::CreateFolder,
            UndoOperation::CreateFile { .. } => ActionKind::CreateFile,
            UndoOperation::Rename { .. } => ActionKind::Rename,
        }
    }
}

impl Display for UndoOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UndoOperation::Copy { dest_path } => write!(f, "copy to {:?}", dest_path),
            UndoOperation::Move {
                src_path,
                dest_path,
            } => write!(f, "move {:?} to {:?}", src_path, dest_path),
            UndoOperation::Delete { path } => write!(f, "trash {:?}", path),
            UndoOperation::CreateFolder { path } => write!(f, "create folder {:?}", path),
            UndoOperation::CreateFile { path } => write!(f, "create file {:?}", path),
            UndoOperation::Rename { old_path, new_path } => {
                write!(f, "rename {:?} to {:?}", old_path, new_path)
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UndoAction {
    pub operation: UndoOperation,
    pub timestamp: SystemTime,
}

impl UndoAction {
    pub fn new(kind: ActionKind, params: ActionParams) -> Result<Self, AppError> {
        let required = |value: Option<PathBuf>, name| value.ok_or(AppError::Malformed(kind, name));

        let operation = match kind {
            ActionKind::Copy => UndoOperation::Copy {
                dest_path: required(params.dest_path, "dest_path")?,
            },
            ActionKind::Move => UndoOperation::Move {
                src_path: required(params.src_path, "src_path")?,
                dest_path: required(params.dest_path, "dest_path")?,
            },
            ActionKind::Delete => UndoOperation::Delete {
                path: required(params.path, "path")?,
            },
            ActionKind::CreateFolder => UndoOperation::CreateFolder {
                path: required(params.path, "path")?,
            },
            ActionKind::CreateFile => UndoOperation::CreateFile {
                path: required(params.path, "path")?,
            },
            ActionKind::Rename => UndoOperation::Rename {
                old_path: required(params.old_path, "old_path")?,
                new_path: required(params.new_path, "new_path")?,
            },
        };

        Ok(Self::from(operation))
    }

    pub fn kind(&self) -> ActionKind {
        self.operation.kind()
    }
}

impl From<UndoOperation> for UndoAction {
    fn from(operation: UndoOperation) -> Self {
        Self {
            operation,
            timestamp: SystemTime::now(),
        }
    }
}

/// Bounded stack of reversible file operations. The newest action sits at
/// the back, eviction drops from the front.
#[derive(Debug)]
pub struct UndoLog {
    actions: VecDeque<UndoAction>,
    capacity: usize,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            actions: VecDeque::new(),
            capacity,
        }
    }

    /// Validates and pushes an action. Malformed requests are logged and
    /// dropped, they never fail the operation that triggered them.
    pub fn record(&mut self, kind: ActionKind, params: ActionParams) {
        match UndoAction::new(kind, params) {
            Ok(action) => self.push(action),
            Err(err) => tracing::error!("dropping undo action: {}", err),
        }
    }

    pub fn push(&mut self, action: UndoAction) {
        tracing::info!("added undo action: {}", action.operation);

        self.actions.push_back(action);
        self.trim();
    }

    pub fn pop(&mut self) -> Option<UndoAction> {
        self.actions.pop_back()
    }

    /// Puts a popped action back on top without evicting.
    pub fn restore(&mut self, action: UndoAction) {
        self.actions.push_back(action);
    }

    pub fn clear(&mut self) {
        tracing::info!("cleared undo log with {} actions", self.actions.len());
        self.actions.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &UndoAction> {
        self.actions.iter().rev()
    }

    fn trim(&mut self) {
        while self.actions.len() > self.capacity {
            if let Some(evicted) = self.actions.pop_front() {
                tracing::debug!("evicted undo action: {}", evicted.operation);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::{ActionKind, ActionParams, UndoLog, UndoOperation};

    #[test]
    fn record_validates_required_fields() {
        let mut log = UndoLog::default();

        log.record(ActionKind::Move, ActionParams::default().src_path("/a"));
        log.record(ActionKind::Rename, ActionParams::default().path("/a"));
        log.record(ActionKind::Copy, ActionParams::default().path("/a"));
        assert!(log.is_empty());

        log.record(
            ActionKind::Move,
            ActionParams::default().src_path("/a").dest_path("/b"),
        );
        assert_eq!(1, log.len());
        assert_eq!(
            Some(UndoOperation::Move {
                src_path: PathBuf::from("/a"),
                dest_path: PathBuf::from("/b"),
            }),
            log.pop().map(|action| action.operation)
        );
    }

    #[test]
    fn new_reports_missing_parameter() {
        let result =
            super::UndoAction::new(ActionKind::Rename, ActionParams::default().old_path("/x"));
        assert!(matches!(
            result,
            Err(crate::error::AppError::Malformed(ActionKind::Rename, "new_path"))
        ));
    }

    #[test]
    fn push_beyond_capacity_evicts_oldest() {
        let mut log = UndoLog::new(3);
        for index in 0..4 {
            log.record(
                ActionKind::CreateFile,
                ActionParams::default().path(format!("/f{}", index)),
            );
        }

        assert_eq!(3, log.len());

        let paths: Vec<_> = log
            .iter()
            .map(|action| match &action.operation {
                UndoOperation::CreateFile { path } => path.to_string_lossy().to_string(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(vec!["/f3", "/f2", "/f1"], paths);
    }

    #[test]
    fn shrinking_capacity_trims_oldest() {
        let mut log = UndoLog::new(10);
        for index in 0..5 {
            log.record(
                ActionKind::Delete,
                ActionParams::default().path(format!("/d{}", index)),
            );
        }

        log.set_capacity(2);
        assert_eq!(2, log.len());
        assert_eq!(
            Some(UndoOperation::Delete {
                path: PathBuf::from("/d4")
            }),
            log.pop().map(|action| action.operation)
        );
        assert_eq!(
            Some(UndoOperation::Delete {
                path: PathBuf::from("/d3")
            }),
            log.pop().map(|action| action.operation)
        );
        assert!(log.pop().is_none());
    }

    #[test]
    fn clear_discards_everything() {
        let mut log = UndoLog::default();
        log.record(ActionKind::CreateFolder, ActionParams::default().path("/x"));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(super::DEFAULT_UNDO_CAPACITY, log.capacity());
    }
}
