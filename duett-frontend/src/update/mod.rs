use crate::{
    action::{self, Action},
    event::{Envelope, Message},
    model::Model,
};

mod command;
mod file;
pub mod pane;
pub mod settings;
mod transfer;
pub mod undo;

#[tracing::instrument(skip(model, envelope))]
pub fn update(model: &mut Model, envelope: Envelope) -> Vec<Action> {
    envelope
        .messages
        .into_iter()
        .flat_map(|message| update_with_message(model, message))
        .collect()
}

fn update_with_message(model: &mut Model, message: Message) -> Vec<Action> {
    tracing::trace!("handling message: {:?}", message);

    match message {
        Message::Command(cmd) => command::execute(model, &cmd),
        Message::InputClosed => {
            if model.transfers.is_empty() {
                vec![Action::Quit]
            } else {
                model.quit_when_idle = true;
                vec![action::info("input closed, waiting for transfers")]
            }
        }
        Message::PathsChanged(paths) => pane::refresh_changed(model, &paths),
        Message::TransferFinished(id) => transfer::finished(model, id),
        Message::TransferItemDone {
            id,
            source,
            target,
            mode,
        } => transfer::item_done(model, id, source, target, mode),
        Message::TransferItemFailed { id, source, error } => {
            transfer::item_failed(id, source, error)
        }
        Message::TransferProgress(id, progress) => transfer::progress(model, id, progress),
    }
}
