use crate::{
    action::{self, Action},
    init::trash::init_trash,
    model::Model,
    settings::Settings,
};

use super::pane;

/// Applies a changed settings set to a running session.
#[tracing::instrument(skip(model))]
pub fn apply_settings(model: &mut Model, settings: Settings) -> Vec<Action> {
    let mut actions = Vec::new();

    if settings.max_undo != model.undo.capacity() {
        model.undo.set_capacity(settings.max_undo);
    }

    if settings.trash_path != model.settings.trash_path {
        match init_trash(&settings) {
            Ok(trash) => model.trash = trash,
            Err(err) => {
                actions.push(action::error(err));
                return actions;
            }
        }
    }

    let relist = settings.show_hidden != model.settings.show_hidden;
    model.settings = settings;

    if relist {
        actions.extend(pane::refresh_all(model));
    }

    actions
}

/// `set <key> <value>` for the settings that can change at runtime.
pub fn set(model: &mut Model, key: &str, value: &str) -> Vec<Action> {
    let mut settings = model.settings.clone();
    match key {
        "max-undo" => match value.parse::<usize>() {
            Ok(it) => settings.max_undo = it,
            Err(err) => return vec![action::error(err)],
        },
        "show-hidden" => match value.parse::<bool>() {
            Ok(it) => settings.show_hidden = it,
            Err(err) => return vec![action::error(err)],
        },
        "trash" => settings.trash_path = Some(pane::resolve(&model.active_pane().path, value)),
        _ => {
            return vec![action::error(format!("unknown setting '{}'", key))];
        }
    }

    let mut actions = apply_settings(model, settings);
    if actions.is_empty() {
        actions.push(action::info(format!("{} = {}", key, value)));
    }
    actions
}

pub fn toggle_hidden(model: &mut Model) -> Vec<Action> {
    let mut settings = model.settings.clone();
    settings.show_hidden = !settings.show_hidden;

    let shown = settings.show_hidden;
    let mut actions = apply_settings(model, settings);
    actions.push(action::info(if shown {
        "showing hidden entries"
    } else {
        "hiding hidden entries"
    }));
    actions
}
