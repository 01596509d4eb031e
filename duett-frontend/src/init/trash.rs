use crate::{error::AppError, model::trash::Trash, settings::Settings};

pub fn init_trash(settings: &Settings) -> Result<Trash, AppError> {
    let root = settings.trash_root()?;
    tracing::info!("using trash at {:?}", root);

    Trash::new(&root)
}
