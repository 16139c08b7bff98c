//! Editing session driven through the script language.

use dirtree::application::script::{execute, run_script};
use dirtree::application::{ApplicationError, Command, Mode, Outcome, Session, TreeRender};
use dirtree::config::Settings;
use dirtree::util::testing::init_test_setup;
use dirtree::{DomainError, NodeId, NodeKind, Tree};
use rstest::{fixture, rstest};

#[fixture]
fn session() -> Session {
    init_test_setup();
    Session::from_settings(&Settings::default())
}

fn id(raw: &str) -> NodeId {
    raw.parse().unwrap()
}

#[rstest]
fn given_context_menu_flow_when_creating_and_naming_file_then_tree_shows_it(mut session: Session) {
    let script = "\
select tree-node-2
new-file
commit report.pdf
";
    let outcomes = run_script(&mut session, script).unwrap();

    assert_eq!(
        outcomes,
        vec![
            Outcome::Selected(id("tree-node-2")),
            Outcome::Created(id("tree-node-4")),
            Outcome::Renamed(id("tree-node-4")),
        ]
    );
    let document = session.tree().get_flat_node_by_id(id("tree-node-2")).unwrap();
    assert_eq!(document.children.len(), 1);
    assert_eq!(document.children[0].name, "report.pdf");
    assert_eq!(document.children[0].kind, NodeKind::File);
    assert_eq!(session.get(id("tree-node-4")).unwrap().state.mode, Mode::Read);
}

#[rstest]
fn given_duplicate_name_when_committing_then_node_stays_in_write_mode_with_error(
    mut session: Session,
) {
    run_script(&mut session, "select tree-node-1\nnew-folder\n").unwrap();

    let err = execute(&mut session, &Command::Commit("Archive".into())).unwrap_err();

    assert_eq!(
        err.as_domain(),
        Some(&DomainError::NameCollision {
            name: "Archive".into(),
            parent: "My Storage".into(),
        })
    );
    assert_eq!(
        err.to_string(),
        "'Archive' already exists inside 'My Storage' folder"
    );
    let state = session.get(id("tree-node-4")).unwrap().state;
    assert_eq!(state.mode, Mode::Write);
    assert!(state.is_error);

    execute(&mut session, &Command::Commit("Photos".into())).unwrap();
    let state = session.get(id("tree-node-4")).unwrap().state;
    assert_eq!(state.mode, Mode::Read);
    assert!(!state.is_error);
}

#[rstest]
fn given_failing_line_when_running_script_then_error_names_line(mut session: Session) {
    let script = "\
# rename both folders
rename tree-node-2 Papers
rename tree-node-3 Papers
rename tree-node-1 never reached
";
    let err = run_script(&mut session, script).unwrap_err();

    match err {
        ApplicationError::Script { line, message } => {
            assert_eq!(line, 3);
            assert!(message.contains("'Papers' already exists"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.tree().get_root().unwrap().name(), "My Storage");
}

#[rstest]
#[case("frobnicate", "unknown command 'frobnicate'")]
#[case("select", "wrong arguments for 'select'")]
#[case("rm a b", "wrong arguments for 'rm'")]
fn given_bad_line_when_running_script_then_parse_error(
    mut session: Session,
    #[case] line: &str,
    #[case] expected: &str,
) {
    let err = run_script(&mut session, line).unwrap_err();
    assert_eq!(err.to_string(), format!("line 1: {expected}"));
}

#[rstest]
fn given_active_folder_when_removed_then_selection_clears(mut session: Session) {
    run_script(&mut session, "select tree-node-3\nnew-file\ncommit a.txt\nselect tree-node-3\nremove\n")
        .unwrap();

    assert_eq!(session.active(), None);
    assert!(session.tree().get_flat_node_by_id(id("tree-node-3")).is_none());
    assert!(session.tree().get_flat_node_by_id(id("tree-node-4")).is_none());
    assert!(matches!(
        execute(&mut session, &Command::Edit),
        Err(ApplicationError::NoActiveNode)
    ));
}

#[rstest]
fn given_collapsed_folder_when_rendering_then_children_hidden_until_expanded(mut session: Session) {
    run_script(&mut session, "mkdir Inbox tree-node-2\ntoggle tree-node-2\n").unwrap();
    let collapsed = session.to_tree_string().to_string();
    assert!(collapsed.contains("▸ Document/ [tree-node-2]"), "{collapsed}");
    assert!(!collapsed.contains("Inbox"), "{collapsed}");

    // collapse state survives unrelated mutations
    run_script(&mut session, "touch notes.md\n").unwrap();
    assert!(!session.to_tree_string().to_string().contains("Inbox"));

    run_script(&mut session, "toggle tree-node-2\n").unwrap();
    let expanded = session.to_tree_string().to_string();
    assert!(expanded.contains("▾ Inbox/ [tree-node-4]"), "{expanded}");
}

#[rstest]
fn given_unknown_parent_in_script_then_node_lands_under_root(mut session: Session) {
    run_script(&mut session, "mkdir \"Old Stuff\" tree-node-99\ntouch loose nonsense\n").unwrap();

    let root = session.tree().get_flat_node_by_id(id("tree-node-1")).unwrap();
    let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Document", "Archive", "Old Stuff", "loose"]);
}

#[rstest]
fn given_flat_command_then_output_is_toml_keyed_by_id(mut session: Session) {
    let outcomes = run_script(&mut session, "flat").unwrap();
    let Outcome::Flat(text) = &outcomes[0] else {
        panic!("expected flat outcome");
    };
    assert!(text.contains("[tree-node-1]"), "{text}");
    assert!(text.contains("name = \"My Storage\""), "{text}");
    assert!(text.contains("kind = \"dir\""), "{text}");
}

#[rstest]
fn given_empty_session_when_first_mkdir_then_it_becomes_root() {
    init_test_setup();
    let mut session = Session::new(Tree::new());
    assert_eq!(session.to_tree_string().to_string().trim(), "Tree is empty");

    run_script(&mut session, "mkdir top\nmkdir child\n").unwrap();

    let root = session.tree().get_root().unwrap();
    assert_eq!(root.name(), "top");
    assert_eq!(root.children().map(|c| c.name()).collect::<Vec<_>>(), vec!["child"]);
}

#[rstest]
fn given_removed_node_when_renaming_then_not_found_without_error_flag(mut session: Session) {
    run_script(&mut session, "rm tree-node-3").unwrap();

    let err = execute(
        &mut session,
        &Command::Rename {
            id: "tree-node-3".into(),
            name: "back".into(),
        },
    )
    .unwrap_err();

    assert_eq!(err.as_domain(), Some(&DomainError::NotFound(id("tree-node-3"))));
    assert!(session.get(id("tree-node-3")).is_none());
}
