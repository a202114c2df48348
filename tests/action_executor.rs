//! Action lists: ordering, short-circuiting and effect reporting.
mod common;

use common::{services, session, MenuTree, ScriptedTerminal};
use menubbs::menus::{run_action, run_actions, Action, Hangup, MenuEffect, MenuEnv};

fn actions(list: &[(&str, &str)]) -> Vec<Action> {
    list.iter().map(|(cmd, data)| Action::new(*cmd, *data)).collect()
}

#[test]
fn push_stops_the_list() {
    let tree = MenuTree::new();
    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv");
    let mut term = ScriptedTerminal::new("");
    let mut env = MenuEnv::new(&services, &mut session, &mut term);

    let list = actions(&[("Mark", "a"), ("MENU", "xfer"), ("Mark", "b")]);
    let outcome = run_actions(&mut env, None, &list).unwrap();
    assert_eq!(outcome.effect, MenuEffect::Push("xfer".into()));
    assert!(!outcome.need_reload);
    assert_eq!(term.output, "[a]");
}

#[test]
fn return_stops_the_list() {
    let tree = MenuTree::new();
    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv");
    let mut term = ScriptedTerminal::new("");
    let mut env = MenuEnv::new(&services, &mut session, &mut term);

    let list = actions(&[("ReturnFromMenu", ""), ("Mark", "late")]);
    let outcome = run_actions(&mut env, None, &list).unwrap();
    assert_eq!(outcome.effect, MenuEffect::Return);
    assert!(!term.output.contains("late"));
}

#[test]
fn unknown_commands_do_nothing() {
    let tree = MenuTree::new();
    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv");
    let mut term = ScriptedTerminal::new("");
    let mut env = MenuEnv::new(&services, &mut session, &mut term);

    let outcome = run_action(&mut env, None, &Action::new("NoSuchCommand", "x")).unwrap();
    assert_eq!(outcome.effect, MenuEffect::None);
    assert!(!outcome.need_reload);

    let list = actions(&[("NoSuchCommand", ""), ("Mark", "after")]);
    let outcome = run_actions(&mut env, None, &list).unwrap();
    assert_eq!(outcome.effect, MenuEffect::None);
    assert_eq!(term.output, "[after]");
}

#[test]
fn command_names_ignore_case() {
    let tree = MenuTree::new();
    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv");
    let mut term = ScriptedTerminal::new("");
    let mut env = MenuEnv::new(&services, &mut session, &mut term);

    let outcome = run_action(&mut env, None, &Action::new("returnfrommenu", "")).unwrap();
    assert_eq!(outcome.effect, MenuEffect::Return);
}

#[test]
fn reload_requests_accumulate() {
    let tree = MenuTree::new();
    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv");
    let mut term = ScriptedTerminal::new("");
    let mut env = MenuEnv::new(&services, &mut session, &mut term);

    let list = actions(&[("Reload", ""), ("Mark", "x"), ("Mark", "y")]);
    let outcome = run_actions(&mut env, None, &list).unwrap();
    assert!(outcome.need_reload);
    assert_eq!(outcome.effect, MenuEffect::None);
    assert_eq!(term.output, "[x][y]");
}

#[test]
fn clear_stack_does_not_stop_the_list() {
    let tree = MenuTree::new();
    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv");
    let mut term = ScriptedTerminal::new("");
    let mut env = MenuEnv::new(&services, &mut session, &mut term);

    let list = actions(&[("ClearMenuStack", ""), ("Mark", "still")]);
    let outcome = run_actions(&mut env, None, &list).unwrap();
    assert_eq!(outcome.effect, MenuEffect::ClearStack);
    assert_eq!(term.output, "[still]");
}

#[test]
fn area_selection_uses_action_data() {
    let tree = MenuTree::new();
    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv").with_numbered_areas(12, 4);
    let mut term = ScriptedTerminal::new("");
    {
        let mut env = MenuEnv::new(&services, &mut session, &mut term);
        run_actions(&mut env, None, &actions(&[("SetSubNumber", "11"), ("SetDirNumber", "3")]))
            .unwrap();
    }
    assert_eq!(session.current_sub, 10);
    assert_eq!(session.current_dir, 2);

    {
        let mut env = MenuEnv::new(&services, &mut session, &mut term);
        run_action(&mut env, None, &Action::new("SetSubNumber", "40")).unwrap();
    }
    assert_eq!(session.current_sub, 10);
}

#[test]
fn display_menu_outside_a_menu_is_a_no_op() {
    let tree = MenuTree::new();
    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv");
    let mut term = ScriptedTerminal::new("");
    let mut env = MenuEnv::new(&services, &mut session, &mut term);

    let outcome = run_action(&mut env, None, &Action::new("DisplayMenu", "")).unwrap();
    assert_eq!(outcome.effect, MenuEffect::None);
    assert!(term.output.is_empty());
}

#[test]
fn fast_goodbye_hangs_up_and_stops() {
    let tree = MenuTree::new();
    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv");
    let mut term = ScriptedTerminal::new("");
    {
        let mut env = MenuEnv::new(&services, &mut session, &mut term);
        let list = actions(&[("FastGoodBye", ""), ("Mark", "never")]);
        assert_eq!(run_actions(&mut env, None, &list), Err(Hangup));
    }
    assert!(session.is_hung_up());
    assert!(term.output.contains("Goodbye!"));
    assert!(!term.output.contains("never"));
}

#[test]
fn goodbye_asks_first() {
    let tree = MenuTree::new();
    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv");
    let mut term = ScriptedTerminal::new("n");
    {
        let mut env = MenuEnv::new(&services, &mut session, &mut term);
        let outcome = run_action(&mut env, None, &Action::new("Goodbye", "")).unwrap();
        assert_eq!(outcome.effect, MenuEffect::None);
    }
    assert!(!session.is_hung_up());
    assert!(term.output.contains("Log off?"));
}

#[test]
fn print_file_reads_from_text_directory() {
    let tree = MenuTree::new();
    let gfiles = tree.base().join("gfiles");
    std::fs::create_dir_all(&gfiles).unwrap();
    std::fs::write(gfiles.join("rules.msg"), "Rule one\nRule two\n").unwrap();

    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv").with_gfiles_dir(&gfiles);
    let mut term = ScriptedTerminal::new("");
    let mut env = MenuEnv::new(&services, &mut session, &mut term);

    run_action(&mut env, None, &Action::new("PrintFileNA", "rules")).unwrap();
    run_action(&mut env, None, &Action::new("PrintFile", "../secret")).unwrap();
    assert!(term.output.contains("Rule one\r\nRule two\r\n"));
    assert!(term.output.contains("File not found: ../secret"));
}

#[test]
fn print_file_pages_long_files() {
    let tree = MenuTree::new();
    let gfiles = tree.base().join("gfiles");
    std::fs::create_dir_all(&gfiles).unwrap();
    let long: String = (1..=30).map(|n| format!("line {}\n", n)).collect();
    std::fs::write(gfiles.join("long.txt"), long).unwrap();

    let services = services(tree.loader(), "wwiv");
    let mut session = session("wwiv").with_gfiles_dir(&gfiles);
    let mut term = ScriptedTerminal::new("n");
    let mut env = MenuEnv::new(&services, &mut session, &mut term);

    run_action(&mut env, None, &Action::new("PrintFile", "long.txt")).unwrap();
    assert!(term.output.contains("line 20\r\n"));
    assert!(term.output.contains("More? [Y/n]"));
    assert!(!term.output.contains("line 21"));
}
