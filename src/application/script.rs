//! Line-oriented command language for driving a [`Session`].
//!
//! One command per line; `#` starts a comment. Names containing spaces are
//! double-quoted, except as the final argument of `commit` and `rename`,
//! where the rest of the line is the name.

use std::fmt;
use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;
use tracing::{debug, instrument};

use crate::application::render::export_flat;
use crate::application::{ApplicationError, ApplicationResult, Session, TreeRender};
use crate::domain::{NodeId, NodeKind};

const HELP: &str = "\
select <id>               make <id> the active node
mkdir <name> [<parent>]   create a directory (root when parent is missing or unknown)
touch <name> [<parent>]   create a file
new-folder                create an unnamed directory under the active node
new-file                  create an unnamed file under the active node
edit                      put the active node into rename mode
commit <name>             rename the active node
rename <id> <name>        rename a node
rm <id>                   remove a node and its subtree
remove                    remove the active node
toggle <id>               collapse or expand a directory
tree                      print the tree
flat                      print the flattened mapping";

fn token_regex() -> Result<&'static Regex, String> {
    static TOKEN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    TOKEN
        .get_or_init(|| Regex::new(r#""([^"]*)"|(\S+)"#))
        .as_ref()
        .map_err(|e| format!("token pattern: {}", e))
}

/// Splits a line into words; double quotes group words containing spaces.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    Ok(token_regex()?
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(String),
    Mkdir { name: String, parent: Option<String> },
    Touch { name: String, parent: Option<String> },
    NewFolder,
    NewFile,
    Edit,
    Commit(String),
    Rename { id: String, name: String },
    Rm(String),
    Remove,
    Toggle(String),
    Tree,
    Flat,
    Help,
}

impl Command {
    /// Parses one line. Blank lines and comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let tokens = tokenize(line)?;
        let Some((verb, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match (verb.as_str(), args) {
            ("select", [id]) => Command::Select(id.clone()),
            ("mkdir", [name]) => Command::Mkdir { name: name.clone(), parent: None },
            ("mkdir", [name, parent]) => Command::Mkdir {
                name: name.clone(),
                parent: Some(parent.clone()),
            },
            ("touch", [name]) => Command::Touch { name: name.clone(), parent: None },
            ("touch", [name, parent]) => Command::Touch {
                name: name.clone(),
                parent: Some(parent.clone()),
            },
            ("new-folder", []) => Command::NewFolder,
            ("new-file", []) => Command::NewFile,
            ("edit", []) => Command::Edit,
            ("commit", rest) => Command::Commit(rest.iter().join(" ")),
            ("rename", [id, rest @ ..]) => Command::Rename {
                id: id.clone(),
                name: rest.iter().join(" "),
            },
            ("rm", [id]) => Command::Rm(id.clone()),
            ("remove", []) => Command::Remove,
            ("toggle", [id]) => Command::Toggle(id.clone()),
            ("tree", []) => Command::Tree,
            ("flat", []) => Command::Flat,
            ("help", []) => Command::Help,
            (
                "select" | "mkdir" | "touch" | "new-folder" | "new-file" | "edit" | "rename"
                | "rm" | "remove" | "toggle" | "tree" | "flat" | "help",
                _,
            ) => return Err(format!("wrong arguments for '{}'", verb)),
            (other, _) => return Err(format!("unknown command '{}'", other)),
        };
        Ok(Some(command))
    }

    /// Whether running this command can change the tree or the view state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::Tree | Command::Flat | Command::Help | Command::Select(_))
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Selected(NodeId),
    Created(NodeId),
    Editing { id: NodeId, name: String },
    Renamed(NodeId),
    Removed(NodeId),
    Toggled { id: NodeId, collapsed: bool },
    Tree(String),
    Flat(String),
    Help,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Selected(id) => write!(f, "selected {}", id),
            Outcome::Created(id) => write!(f, "created {}", id),
            Outcome::Editing { id, name } => write!(f, "editing {} (current name: '{}')", id, name),
            Outcome::Renamed(id) => write!(f, "renamed {}", id),
            Outcome::Removed(id) => write!(f, "removed {}", id),
            Outcome::Toggled { id, collapsed: true } => write!(f, "collapsed {}", id),
            Outcome::Toggled { id, collapsed: false } => write!(f, "expanded {}", id),
            Outcome::Tree(text) | Outcome::Flat(text) => write!(f, "{}", text.trim_end()),
            Outcome::Help => write!(f, "{}", HELP),
        }
    }
}

/// Runs one command against the session.
#[instrument(level = "debug", skip(session))]
pub fn execute(session: &mut Session, command: &Command) -> ApplicationResult<Outcome> {
    let outcome = match command {
        Command::Select(raw) => {
            let id = session.resolve(raw)?;
            session.select(id)?;
            Outcome::Selected(id)
        }
        Command::Mkdir { name, parent } => {
            let parent = parent.as_deref().and_then(|p| p.parse::<NodeId>().ok());
            Outcome::Created(session.insert(name, parent, NodeKind::Directory))
        }
        Command::Touch { name, parent } => {
            let parent = parent.as_deref().and_then(|p| p.parse::<NodeId>().ok());
            Outcome::Created(session.insert(name, parent, NodeKind::File))
        }
        Command::NewFolder => Outcome::Created(session.create_folder()),
        Command::NewFile => Outcome::Created(session.create_file()),
        Command::Edit => {
            let name = session.mark_for_rename()?;
            let id = session.active().ok_or(ApplicationError::NoActiveNode)?;
            Outcome::Editing { id, name }
        }
        Command::Commit(name) => {
            session.commit_rename(name)?;
            let id = session.active().ok_or(ApplicationError::NoActiveNode)?;
            Outcome::Renamed(id)
        }
        Command::Rename { id, name } => {
            let id = id.parse::<NodeId>()?;
            session.rename(id, name)?;
            Outcome::Renamed(id)
        }
        Command::Rm(raw) => {
            let id = raw.parse::<NodeId>()?;
            session.remove(id);
            Outcome::Removed(id)
        }
        Command::Remove => Outcome::Removed(session.remove_active()?),
        Command::Toggle(raw) => {
            let id = session.resolve(raw)?;
            let collapsed = session.toggle_collapse(id)?;
            Outcome::Toggled { id, collapsed }
        }
        Command::Tree => Outcome::Tree(session.to_tree_string().to_string()),
        Command::Flat => Outcome::Flat(export_flat(session.tree().get_flat())?),
        Command::Help => Outcome::Help,
    };
    debug!(?outcome, "executed");
    Ok(outcome)
}

/// Runs every command in `text`, stopping at the first failure.
///
/// Errors carry the 1-based line number.
pub fn run_script(session: &mut Session, text: &str) -> ApplicationResult<Vec<Outcome>> {
    let mut outcomes = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line_no = n + 1;
        let command = Command::parse(line).map_err(|message| ApplicationError::Script {
            line: line_no,
            message,
        })?;
        let Some(command) = command else {
            continue;
        };
        let outcome = execute(session, &command).map_err(|e| ApplicationError::Script {
            line: line_no,
            message: e.to_string(),
        })?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::domain::Tree;
    use rstest::rstest;

    #[rstest]
    #[case("mkdir plain", vec!["mkdir", "plain"])]
    #[case("mkdir \"Old Stuff\" tree-node-1", vec!["mkdir", "Old Stuff", "tree-node-1"])]
    #[case("  touch   \"\"  ", vec!["touch", ""])]
    fn given_line_when_tokenized_then_quotes_group_words(
        #[case] line: &str,
        #[case] expected: Vec<&str>,
    ) {
        assert_eq!(tokenize(line).unwrap(), expected);
    }

    #[rstest]
    #[case("", None)]
    #[case("   # just a comment", None)]
    #[case("tree", Some(Command::Tree))]
    #[case("select tree-node-2", Some(Command::Select("tree-node-2".into())))]
    #[case(
        r#"mkdir "My Docs" tree-node-1"#,
        Some(Command::Mkdir { name: "My Docs".into(), parent: Some("tree-node-1".into()) })
    )]
    #[case("touch a.txt", Some(Command::Touch { name: "a.txt".into(), parent: None }))]
    #[case("commit Old Stuff", Some(Command::Commit("Old Stuff".into())))]
    #[case(
        r#"rename tree-node-3 """#,
        Some(Command::Rename { id: "tree-node-3".into(), name: "".into() })
    )]
    fn given_line_when_parsed_then_yields_command(
        #[case] line: &str,
        #[case] expected: Option<Command>,
    ) {
        assert_eq!(Command::parse(line), Ok(expected));
    }

    #[rstest]
    #[case("frobnicate", "unknown command 'frobnicate'")]
    #[case("select", "wrong arguments for 'select'")]
    #[case("mkdir a b c", "wrong arguments for 'mkdir'")]
    fn given_bad_line_when_parsed_then_explains(#[case] line: &str, #[case] message: &str) {
        assert_eq!(Command::parse(line), Err(message.to_string()));
    }

    #[test]
    fn given_script_when_run_then_builds_tree() {
        let mut session = Session::new(Tree::new());
        let outcomes = run_script(
            &mut session,
            r#"
# initial storage
mkdir "My Storage"
mkdir Document tree-node-1
mkdir Archive tree-node-1
select tree-node-2
new-file
commit cv.pdf
"#,
        )
        .unwrap();

        assert_eq!(outcomes.len(), 6);
        let cv: NodeId = "tree-node-4".parse().unwrap();
        assert_eq!(outcomes[5], Outcome::Renamed(cv));
        let flat = session.tree().get_flat();
        assert_eq!(flat[&cv].name, "cv.pdf");
        assert_eq!(flat[&cv].parent.as_ref().map(|p| p.name.as_str()), Some("Document"));
    }

    #[test]
    fn given_failing_line_when_run_then_reports_line_number() {
        let mut session = Session::from_settings(&Settings::default());
        let err = run_script(&mut session, "tree\nrename tree-node-3 Document\n").unwrap_err();
        match err {
            ApplicationError::Script { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("already exists inside 'My Storage'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn given_toggle_when_executed_then_reports_state() {
        let mut session = Session::from_settings(&Settings::default());
        let outcome = execute(&mut session, &Command::Toggle("tree-node-1".into())).unwrap();
        assert_eq!(outcome.to_string(), "collapsed tree-node-1");
        assert!(Command::Toggle("tree-node-1".into()).is_mutation());
        assert!(!Command::Tree.is_mutation());
    }
}
