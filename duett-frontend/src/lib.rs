use std::{env, path::PathBuf};

use action::{Action, ActionResult};
use error::AppError;
use event::Emitter;
use init::trash::init_trash;
use model::{Model, PaneId};
use settings::Settings;
use update::{pane, update};

pub mod action;
pub mod error;
pub mod event;
mod init;
pub mod model;
pub mod ops;
pub mod settings;
pub mod task;
pub mod update;
pub mod view;

pub async fn run(settings: Settings) -> Result<(), AppError> {
    let trash = init_trash(&settings)?;
    let initial_path = get_initial_path(&settings.startup_path)?;

    let mut model = Model::new(settings, trash, initial_path);
    let mut emitter = Emitter::start()?;

    let mut actions = pane::refresh_all(&mut model);
    if model.settings.second_path.is_some() {
        actions.extend(pane::split(&mut model));
    }
    actions.push(action::print(view::panes(&model)));
    actions.extend(get_watcher_changes(&mut model));

    tracing::debug!("starting with model state: {:?}", model);

    let mut quit = action::exec(&mut emitter, actions)? == ActionResult::Quit;
    while !quit {
        let envelope = match emitter.receiver.recv().await {
            Some(it) => it,
            None => break,
        };

        tracing::debug!("received messages: {:?}", envelope.messages);

        let mut actions = update(&mut model, envelope);
        actions.extend(get_watcher_changes(&mut model));
        for error in emitter.reap() {
            actions.push(action::error(error));
        }

        quit = action::exec(&mut emitter, actions)? == ActionResult::Quit;
    }

    emitter.shutdown().await
}

fn get_initial_path(startup_path: &Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(path) = startup_path {
        if path.is_dir() {
            return Ok(path.canonicalize()?);
        }
        tracing::warn!("startup path {:?} is not a directory", path);
    }

    Ok(env::current_dir()?)
}

#[tracing::instrument(skip(model))]
fn get_watcher_changes(model: &mut Model) -> Vec<Action> {
    let mut current = Vec::new();
    for id in [PaneId::Primary, PaneId::Secondary] {
        if let Some(pane) = model.pane(id) {
            if !current.contains(&pane.path) {
                current.push(pane.path.clone());
            }
        }
    }

    let mut actions = Vec::new();
    for path in &model.watches {
        if !current.contains(path) {
            actions.push(Action::UnwatchPath(path.clone()));
        }
    }

    for path in &current {
        if !model.watches.contains(path) {
            actions.push(Action::WatchPath(path.clone()));
        }
    }

    model.watches = current;

    if !actions.is_empty() {
        tracing::trace!("watcher changes: {:?}", actions);
    }

    actions
}

#[cfg(test)]
mod test {
    use std::{fs, path::PathBuf};

    use pretty_assertions::assert_eq;

    use crate::{
        action::Action,
        model::{trash::Trash, Model},
        settings::Settings,
        update::pane,
    };

    #[test]
    fn watches_follow_pane_directories() {
        let dir = tempfile::tempdir().unwrap();
        let trash = Trash::new(&dir.path().join(".trash")).unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        let mut model = Model::new(Settings::default(), trash, root.clone());

        assert_eq!(
            vec![Action::WatchPath(root.clone())],
            super::get_watcher_changes(&mut model)
        );
        assert!(super::get_watcher_changes(&mut model).is_empty());

        pane::up(&mut model);
        let parent: PathBuf = dir.path().to_path_buf();
        assert_eq!(
            vec![Action::UnwatchPath(root), Action::WatchPath(parent.clone())],
            super::get_watcher_changes(&mut model)
        );
        assert_eq!(vec![parent], model.watches);
    }
}
