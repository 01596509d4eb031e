use crate::{
    action::{self, Action},
    model::Model,
    task::transfer::TransferMode,
    view,
};

use super::{file, pane, settings, undo};

#[tracing::instrument(skip(model))]
pub fn execute(model: &mut Model, cmd: &str) -> Vec<Action> {
    let cmd = cmd.trim();
    let cmd_with_args = match cmd.split_once(' ') {
        Some((cmd, args)) => (cmd, args.trim()),
        None => (cmd, ""),
    };

    tracing::debug!("executing command: {:?}", cmd_with_args);

    let args = match split_args(cmd_with_args.1) {
        Ok(it) => it,
        Err(err) => return vec![action::error(err)],
    };

    match (cmd_with_args.0, args.as_slice()) {
        ("", []) => Vec::new(),
        ("back", []) => pane::back(model),
        ("cd", [target]) => pane::navigate(model, target),
        ("clear-undo", []) => {
            model.undo.clear();
            vec![action::info("undo history cleared")]
        }
        ("cp", sources) => file::transfer(model, sources, TransferMode::Copy),
        ("empty-trash", []) => match model.trash.empty() {
            Ok(()) => vec![action::info("trash emptied")],
            Err(err) => vec![action::error(err)],
        },
        ("forward", []) => pane::forward(model),
        ("hidden", []) => settings::toggle_hidden(model),
        ("history", []) => vec![action::print(view::history(&model.undo))],
        ("ls", []) => vec![action::print(view::panes(model))],
        ("mkdir", []) => file::create_folder(model, None),
        ("mkdir", [name]) => file::create_folder(model, Some(name.as_str())),
        ("mv", sources) => file::transfer(model, sources, TransferMode::Move),
        ("pane", []) => pane::switch(model),
        ("q", []) => quit(model),
        ("q!", []) => vec![Action::Quit],
        ("rename", [old, new]) => file::rename(model, old, new),
        ("rm", names) => file::trash(model, names),
        ("set", [key, value]) => settings::set(model, key, value),
        ("sort", [column]) => pane::sort(model, column),
        ("split", []) => pane::split(model),
        ("touch", []) => file::create_file(model, None),
        ("touch", [name]) => file::create_file(model, Some(name.as_str())),
        ("trash", []) => match model.trash.entries() {
            Ok(entries) => vec![action::print(view::trash(&entries))],
            Err(err) => vec![action::error(err)],
        },
        ("undo", []) => undo::undo(model),
        ("up", []) => pane::up(model),
        (cmd, _) => vec![action::error(format!("command '{}' is not valid", cmd))],
    }
}

fn quit(model: &mut Model) -> Vec<Action> {
    if model.transfers.is_empty() {
        return vec![Action::Quit];
    }

    model.quit_when_idle = true;
    vec![action::info(format!(
        "waiting for {} transfers, use q! to abandon them",
        model.transfers.len()
    ))]
}

/// Splits on whitespace, keeping single or double quoted parts together.
fn split_args(args: &str) -> Result<Vec<String>, String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut quote = None;
    let mut started = false;

    for c in args.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                started = true;
            }
            (None, c) if c.is_whitespace() => {
                if started {
                    result.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            (None, c) => {
                current.push(c);
                started = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated quote {}", q));
    }

    if started {
        result.push(current);
    }

    Ok(result)
}

#[cfg(test)]
mod test {
    use std::fs;

    use pretty_assertions::assert_eq;

    use crate::{
        action::Action,
        model::{trash::Trash, Model},
        settings::Settings,
    };

    #[test]
    fn split_args_keeps_quoted_names() {
        assert_eq!(
            vec!["My Folder".to_string(), "b".to_string(), "".to_string()],
            super::split_args(r#""My Folder"  b ''"#).unwrap()
        );
        assert_eq!(Vec::<String>::new(), super::split_args("   ").unwrap());
        assert!(super::split_args("'open").is_err());
    }

    #[test]
    fn create_folder_not_empty_not_found_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let trash = Trash::new(&dir.path().join(".trash")).unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        let mut model = Model::new(Settings::default(), trash, root.clone());

        super::execute(&mut model, "mkdir X");
        fs::write(root.join("X").join("keep.txt"), "").unwrap();

        super::execute(&mut model, "undo");
        assert!(root.join("X").join("keep.txt").exists());
        assert_eq!(1, model.undo.len());

        fs::remove_dir_all(root.join("X")).unwrap();
        super::execute(&mut model, "undo");
        assert_eq!(1, model.undo.len());

        super::execute(&mut model, "clear-undo");
        assert!(model.undo.is_empty());
    }

    #[test]
    fn quit_waits_for_transfers() {
        let dir = tempfile::tempdir().unwrap();
        let trash = Trash::new(&dir.path().join(".trash")).unwrap();
        let mut model = Model::new(Settings::default(), trash, dir.path().to_path_buf());

        assert_eq!(vec![Action::Quit], super::execute(&mut model, "q"));

        model.transfers.insert(
            0,
            crate::model::TransferState {
                destination: dir.path().to_path_buf(),
                mode: crate::task::transfer::TransferMode::Copy,
                progress: 0,
            },
        );
        let actions = super::execute(&mut model, "q");
        assert!(!actions.contains(&Action::Quit));
        assert!(model.quit_when_idle);

        assert_eq!(vec![Action::Quit], super::execute(&mut model, "q!"));
    }

    #[test]
    fn rm_with_empty_name_keeps_pane_directory() {
        let dir = tempfile::tempdir().unwrap();
        let trash = Trash::new(&dir.path().join(".trash")).unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("data.txt"), "x").unwrap();
        let mut model = Model::new(Settings::default(), trash, root.clone());

        let actions = super::execute(&mut model, "rm ''");
        assert!(matches!(&actions[..], [Action::Print(_)]));
        assert!(root.join("data.txt").exists());
        assert!(model.undo.is_empty());
        assert!(model.trash.entries().unwrap().is_empty());
    }

    #[test]
    fn back_and_forward_commands_walk_pane_history() {
        let dir = tempfile::tempdir().unwrap();
        let trash = Trash::new(&dir.path().join(".trash")).unwrap();
        let root = dir.path().canonicalize().unwrap().join("root");
        fs::create_dir_all(root.join("sub")).unwrap();
        let mut model = Model::new(Settings::default(), trash, root.clone());

        super::execute(&mut model, "cd sub");
        super::execute(&mut model, "back");
        assert_eq!(root, model.primary.path);

        super::execute(&mut model, "forward");
        assert_eq!(root.join("sub"), model.primary.path);
    }

    #[test]
    fn unknown_command_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let trash = Trash::new(&dir.path().join(".trash")).unwrap();
        let mut model = Model::new(Settings::default(), trash, dir.path().to_path_buf());

        let actions = super::execute(&mut model, "format c:");
        assert!(matches!(&actions[..], [Action::Print(_)]));
        assert!(super::execute(&mut model, "").is_empty());
    }
}
