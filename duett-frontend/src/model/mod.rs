use std::{collections::HashMap, path::PathBuf};

use duett_listing::model::{DirectoryEntry, SortSettings};

use crate::{settings::Settings, task::transfer::TransferMode};

use self::{trash::Trash, undo::UndoLog};

pub mod trash;
pub mod undo;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PaneId {
    #[default]
    Primary,
    Secondary,
}

impl PaneId {
    pub fn other(&self) -> Self {
        match self {
            PaneId::Primary => PaneId::Secondary,
            PaneId::Secondary => PaneId::Primary,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pane {
    pub path: PathBuf,
    pub entries: Vec<DirectoryEntry>,
    pub history: Vec<PathBuf>,
    pub history_index: usize,
    pub sort: SortSettings,
}

impl Pane {
    pub fn new(path: PathBuf, sort: SortSettings) -> Self {
        Self {
            history: vec![path.clone()],
            history_index: 0,
            path,
            entries: Vec::new(),
            sort,
        }
    }

    /// Drops every entry after the current one and appends `path`.
    pub fn push_history(&mut self, path: PathBuf) {
        if self.history.get(self.history_index) == Some(&path) {
            return;
        }

        self.history.truncate(self.history_index + 1);
        self.history.push(path);
        self.history_index = self.history.len() - 1;
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferState {
    pub destination: PathBuf,
    pub mode: TransferMode,
    pub progress: u8,
}

pub struct Model {
    pub active: PaneId,
    pub next_transfer_id: u16,
    pub primary: Pane,
    pub quit_when_idle: bool,
    pub secondary: Option<Pane>,
    pub settings: Settings,
    pub transfers: HashMap<u16, TransferState>,
    pub trash: Trash,
    pub undo: UndoLog,
    pub watches: Vec<PathBuf>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("active", &self.active)
            .field("primary", &self.primary.path)
            .field("secondary", &self.secondary.as_ref().map(|pane| &pane.path))
            .field("settings", &self.settings)
            .field("transfers", &self.transfers)
            .field("undo", &self.undo.len())
            .field("watches", &self.watches)
            .finish()
    }
}

impl Model {
    pub fn new(settings: Settings, trash: Trash, path: PathBuf) -> Self {
        let sort = settings.sort;
        Self {
            active: PaneId::Primary,
            next_transfer_id: 0,
            primary: Pane::new(path, sort),
            quit_when_idle: false,
            secondary: None,
            transfers: HashMap::new(),
            trash,
            undo: UndoLog::new(settings.max_undo),
            watches: Vec::new(),
            settings,
        }
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        match id {
            PaneId::Primary => Some(&self.primary),
            PaneId::Secondary => self.secondary.as_ref(),
        }
    }

    pub fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        match id {
            PaneId::Primary => Some(&mut self.primary),
            PaneId::Secondary => self.secondary.as_mut(),
        }
    }

    pub fn active_pane(&self) -> &Pane {
        self.pane(self.active).unwrap_or(&self.primary)
    }

    pub fn active_pane_mut(&mut self) -> &mut Pane {
        match (self.active, self.secondary.as_mut()) {
            (PaneId::Secondary, Some(pane)) => pane,
            _ => &mut self.primary,
        }
    }

    /// Directory of the inactive pane, if a second pane is open.
    pub fn other_path(&self) -> Option<&PathBuf> {
        self.pane(self.active.other()).map(|pane| &pane.path)
    }

    pub fn panes(&self) -> impl Iterator<Item = (PaneId, &Pane)> {
        std::iter::once((PaneId::Primary, &self.primary))
            .chain(self.secondary.iter().map(|pane| (PaneId::Secondary, pane)))
    }

    pub fn next_transfer_id(&mut self) -> u16 {
        let id = self.next_transfer_id;
        self.next_transfer_id = self.next_transfer_id.wrapping_add(1);
        id
    }
}
