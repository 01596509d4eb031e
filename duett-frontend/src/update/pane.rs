use std::path::{Path, PathBuf};

use duett_listing::{model::SortColumn, ListingError};

use crate::{
    action::{self, Action},
    error::AppError,
    model::{Model, Pane, PaneId},
    view,
};

/// Re-lists `pane`. A vanished directory falls back to its closest
/// existing ancestor.
pub fn reload(pane: &mut Pane, show_hidden: bool) -> Result<(), AppError> {
    match duett_listing::list(&pane.path, show_hidden, &pane.sort) {
        Ok(entries) => {
            pane.entries = entries;
            Ok(())
        }
        Err(ListingError::NotFound(_)) => {
            let fallback = match existing_ancestor(&pane.path) {
                Some(it) => it,
                None => return Err(AppError::NotFound(pane.path.clone())),
            };

            tracing::warn!("{:?} vanished, falling back to {:?}", pane.path, fallback);

            pane.entries = duett_listing::list(&fallback, show_hidden, &pane.sort)?;
            pane.path = fallback;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn refresh_all(model: &mut Model) -> Vec<Action> {
    let show_hidden = model.settings.show_hidden;

    let mut actions = Vec::new();
    for pane in std::iter::once(&mut model.primary).chain(model.secondary.as_mut()) {
        if let Err(err) = reload(pane, show_hidden) {
            actions.push(action::error(err));
        }
    }
    actions
}

/// Re-lists every pane showing one of `paths` or their parent directory.
#[tracing::instrument(skip(model))]
pub fn refresh_changed(model: &mut Model, paths: &[PathBuf]) -> Vec<Action> {
    let show_hidden = model.settings.show_hidden;
    for pane in std::iter::once(&mut model.primary).chain(model.secondary.as_mut()) {
        let affected = paths
            .iter()
            .any(|path| path == &pane.path || path.parent() == Some(pane.path.as_path()));

        if affected {
            if let Err(err) = reload(pane, show_hidden) {
                tracing::warn!("refreshing {:?} failed: {:?}", pane.path, err);
            }
        }
    }

    Vec::new()
}

#[tracing::instrument(skip(model))]
pub fn navigate(model: &mut Model, target: &str) -> Vec<Action> {
    let path = resolve(&model.active_pane().path, target);
    let path = match path.canonicalize() {
        Ok(it) => it,
        Err(err) => return vec![action::error(AppError::from_io(err, &path))],
    };

    navigate_to(model, path)
}

pub fn up(model: &mut Model) -> Vec<Action> {
    match model.active_pane().path.parent() {
        Some(parent) => {
            let parent = parent.to_path_buf();
            navigate_to(model, parent)
        }
        None => Vec::new(),
    }
}

pub fn navigate_to(model: &mut Model, path: PathBuf) -> Vec<Action> {
    let show_hidden = model.settings.show_hidden;
    let pane = model.active_pane_mut();

    match duett_listing::list(&path, show_hidden, &pane.sort) {
        Ok(entries) => {
            tracing::info!("navigated to {:?}", path);

            pane.push_history(path.clone());
            pane.path = path;
            pane.entries = entries;
            vec![action::info(pane.path.to_string_lossy())]
        }
        Err(err) => vec![action::error(AppError::from(err))],
    }
}

pub fn back(model: &mut Model) -> Vec<Action> {
    match model.active_pane().history_index.checked_sub(1) {
        Some(index) => navigate_history(model, index),
        None => vec![action::info("already at the oldest directory")],
    }
}

pub fn forward(model: &mut Model) -> Vec<Action> {
    let pane = model.active_pane();
    let index = pane.history_index + 1;
    if index < pane.history.len() {
        navigate_history(model, index)
    } else {
        vec![action::info("already at the newest directory")]
    }
}

/// Moves the history cursor to `index` without recording a new entry.
fn navigate_history(model: &mut Model, index: usize) -> Vec<Action> {
    let show_hidden = model.settings.show_hidden;
    let pane = model.active_pane_mut();
    let path = match pane.history.get(index) {
        Some(it) => it.clone(),
        None => return Vec::new(),
    };

    match duett_listing::list(&path, show_hidden, &pane.sort) {
        Ok(entries) => {
            tracing::info!("navigated in history to {:?}", path);

            pane.history_index = index;
            pane.path = path;
            pane.entries = entries;
            vec![action::info(pane.path.to_string_lossy())]
        }
        Err(err) => vec![action::error(AppError::from(err))],
    }
}

pub fn sort(model: &mut Model, column: &str) -> Vec<Action> {
    let column = match column.parse::<SortColumn>() {
        Ok(it) => it,
        Err(err) => return vec![action::error(err)],
    };

    let pane = model.active_pane_mut();
    pane.sort.select(column);
    duett_listing::sort_entries(&mut pane.entries, &pane.sort);

    tracing::debug!("sorted {:?} by {:?}", pane.path, pane.sort);

    vec![action::print(view::pane(pane))]
}

pub fn switch(model: &mut Model) -> Vec<Action> {
    if model.secondary.is_none() {
        return vec![action::info("no second pane open, use split")];
    }

    model.active = model.active.other();
    vec![action::info(format!(
        "active: {}",
        model.active_pane().path.to_string_lossy()
    ))]
}

pub fn split(model: &mut Model) -> Vec<Action> {
    if model.secondary.take().is_some() {
        model.active = PaneId::Primary;
        return vec![action::info("closed second pane")];
    }

    let path = model
        .settings
        .second_path
        .clone()
        .unwrap_or_else(|| model.primary.path.clone());

    let mut pane = Pane::new(path, model.settings.sort);
    if let Err(err) = reload(&mut pane, model.settings.show_hidden) {
        return vec![action::error(err)];
    }

    let message = format!("opened second pane: {}", pane.path.to_string_lossy());
    model.secondary = Some(pane);

    vec![action::info(message)]
}

pub fn resolve(base: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        base.join(target)
    }
}

fn existing_ancestor(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .skip(1)
        .find(|ancestor| ancestor.is_dir())
        .map(Path::to_path_buf)
}
