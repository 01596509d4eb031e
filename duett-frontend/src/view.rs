use std::time::SystemTime;

use chrono::{DateTime, Local};
use duett_listing::model::DirectoryEntry;

use crate::model::{
    trash::TrashEntry,
    undo::{UndoAction, UndoLog},
    Model, Pane, PaneId,
};

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

pub fn format_size(size: u64) -> String {
    let mut size = size as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} PB", size)
}

pub fn format_modified(modified: SystemTime) -> String {
    let modified: DateTime<Local> = modified.into();
    modified.format("%d.%m.%Y %H:%M").to_string()
}

pub fn entry(entry: &DirectoryEntry) -> String {
    let size = if entry.is_directory {
        String::new()
    } else {
        format_size(entry.size)
    };

    format!(
        "{:<40} {:>12}  {:<8} {}",
        entry.name,
        size,
        entry.entry_type,
        format_modified(entry.modified)
    )
}

pub fn pane(pane: &Pane) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({} {:?})",
        pane.path.to_string_lossy(),
        pane.sort.column,
        pane.sort.direction
    )];
    lines.extend(pane.entries.iter().map(entry));
    lines
}

pub fn panes(model: &Model) -> Vec<String> {
    let mut lines = Vec::new();
    for (id, pane) in model.panes() {
        let marker = if id == model.active { "*" } else { " " };
        let name = match id {
            PaneId::Primary => "left",
            PaneId::Secondary => "right",
        };

        let mut content = self::pane(pane);
        if let Some(header) = content.first_mut() {
            *header = format!("{}{}: {}", marker, name, header);
        }
        lines.extend(content);
    }
    lines
}

fn undo_action(action: &UndoAction) -> String {
    let timestamp: DateTime<Local> = action.timestamp.into();
    format!("{}  {}", timestamp.format("%H:%M:%S"), action.operation)
}

pub fn history(log: &UndoLog) -> Vec<String> {
    if log.is_empty() {
        return vec!["nothing to undo".to_string()];
    }

    let mut lines = vec![format!("{}/{} actions", log.len(), log.capacity())];
    lines.extend(log.iter().map(undo_action));
    lines
}

pub fn trash(entries: &[TrashEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["trash is empty".to_string()];
    }

    entries
        .iter()
        .map(|entry| {
            format!(
                "{}  {:<30} {}",
                entry.info.deleted_at.format("%d.%m.%Y %H:%M"),
                entry.name.to_string_lossy(),
                entry.info.original.to_string_lossy()
            )
        })
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn format_size_units() {
        assert_eq!("0.00 B", super::format_size(0));
        assert_eq!("1023.00 B", super::format_size(1023));
        assert_eq!("1.00 KB", super::format_size(1024));
        assert_eq!("1.50 MB", super::format_size(1024 * 1024 * 3 / 2));
        assert_eq!("2.00 TB", super::format_size(2 * 1024u64.pow(4)));
        assert_eq!("4.00 PB", super::format_size(4 * 1024u64.pow(5)));
    }
}
