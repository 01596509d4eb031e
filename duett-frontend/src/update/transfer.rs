use std::path::PathBuf;

use crate::{
    action::{self, Action},
    model::{
        undo::{ActionKind, ActionParams},
        Model,
    },
    task::transfer::TransferMode,
};

use super::pane;

pub fn progress(model: &mut Model, id: u16, progress: u8) -> Vec<Action> {
    match model.transfers.get_mut(&id) {
        Some(state) => {
            state.progress = progress;
            tracing::debug!("transfer {} at {}%", id, progress);
        }
        None => tracing::warn!("progress for unknown transfer {}", id),
    }

    Vec::new()
}

/// Undo actions for transfers are recorded per completed item, never when
/// the transfer is requested.
#[tracing::instrument(skip(model))]
pub fn item_done(
    model: &mut Model,
    id: u16,
    source: PathBuf,
    target: PathBuf,
    mode: TransferMode,
) -> Vec<Action> {
    let (kind, params) = match mode {
        TransferMode::Copy => (ActionKind::Copy, ActionParams::default().dest_path(&target)),
        TransferMode::Move => (
            ActionKind::Move,
            ActionParams::default()
                .src_path(&source)
                .dest_path(&target),
        ),
    };
    model.undo.record(kind, params);

    let percent = model
        .transfers
        .get(&id)
        .map(|state| state.progress)
        .unwrap_or_default();

    vec![action::info(format!(
        "[{}] {} {} -> {} ({}%)",
        id,
        mode,
        source.to_string_lossy(),
        target.to_string_lossy(),
        percent
    ))]
}

pub fn item_failed(id: u16, source: PathBuf, error: String) -> Vec<Action> {
    vec![action::error(format!(
        "[{}] {}: {}",
        id,
        source.to_string_lossy(),
        error
    ))]
}

#[tracing::instrument(skip(model))]
pub fn finished(model: &mut Model, id: u16) -> Vec<Action> {
    let mut actions = match model.transfers.remove(&id) {
        Some(state) => vec![action::info(format!(
            "[{}] {} to {} finished",
            id,
            state.mode,
            state.destination.to_string_lossy()
        ))],
        None => {
            tracing::warn!("finish for unknown transfer {}", id);
            Vec::new()
        }
    };

    actions.extend(pane::refresh_all(model));

    if model.quit_when_idle && model.transfers.is_empty() {
        tracing::info!("all transfers finished, quitting");
        actions.push(Action::Quit);
    }

    actions
}

#[cfg(test)]
mod test {
    use std::{fs, path::PathBuf};

    use pretty_assertions::assert_eq;

    use crate::{
        action::Action,
        event::{Envelope, Message, MessageSource},
        model::{trash::Trash, undo::UndoOperation, Model, TransferState},
        settings::Settings,
        task::transfer::TransferMode,
        update::update,
    };

    fn model(dir: &tempfile::TempDir) -> Model {
        let trash = Trash::new(&dir.path().join(".trash")).unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();

        let mut model = Model::new(Settings::default(), trash, root.clone());
        model.transfers.insert(
            3,
            TransferState {
                destination: root,
                mode: TransferMode::Copy,
                progress: 0,
            },
        );
        model
    }

    fn envelope(messages: Vec<Message>) -> Envelope {
        Envelope {
            messages,
            source: MessageSource::Task,
        }
    }

    #[test]
    fn only_completed_items_are_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = model(&dir);
        let target = model.primary.path.join("a.txt");

        update(
            &mut model,
            envelope(vec![
                Message::TransferItemDone {
                    id: 3,
                    source: PathBuf::from("/elsewhere/a.txt"),
                    target: target.clone(),
                    mode: TransferMode::Copy,
                },
                Message::TransferProgress(3, 50),
                Message::TransferItemFailed {
                    id: 3,
                    source: PathBuf::from("/elsewhere/b.txt"),
                    error: "Path not found".to_string(),
                },
                Message::TransferProgress(3, 100),
            ]),
        );

        assert_eq!(1, model.undo.len());
        assert_eq!(
            Some(&UndoOperation::Copy { dest_path: target }),
            model.undo.iter().next().map(|action| &action.operation)
        );
        assert_eq!(Some(100), model.transfers.get(&3).map(|state| state.progress));
    }

    #[test]
    fn moved_item_records_both_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = model(&dir);

        update(
            &mut model,
            envelope(vec![Message::TransferItemDone {
                id: 3,
                source: PathBuf::from("/from/x"),
                target: PathBuf::from("/to/x"),
                mode: TransferMode::Move,
            }]),
        );

        assert_eq!(
            Some(&UndoOperation::Move {
                src_path: PathBuf::from("/from/x"),
                dest_path: PathBuf::from("/to/x"),
            }),
            model.undo.iter().next().map(|action| &action.operation)
        );
    }

    #[test]
    fn finish_quits_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = model(&dir);
        model.quit_when_idle = true;

        let actions = update(&mut model, envelope(vec![Message::TransferFinished(3)]));

        assert!(model.transfers.is_empty());
        assert_eq!(Some(&Action::Quit), actions.last());
    }
}
