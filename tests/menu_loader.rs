//! Menu sets on disk: loading, companion files, validation and static checks.
mod common;

use common::{test_registry, MenuTree};
use menubbs::menus::check::{check_menu_set, MenuIssue};
use menubbs::menus::loader::DEFAULT_PROMPT;
use menubbs::menus::model::NumericMode;
use menubbs::menus::sample::write_sample_menu_set;
use menubbs::menus::{
    Action, CommandRegistry, JsonMenuLoader, MenuDescriptor, MenuError, MenuItem, MenuLoader,
    MenuSet,
};

fn simple(title: &str) -> MenuDescriptor {
    let mut d = MenuDescriptor::new(title);
    d.items.push(MenuItem::new("Q", vec![Action::new("ReturnFromMenu", "")]));
    d
}

#[test]
fn loads_menu_with_globals_and_companions() {
    let tree = MenuTree::new();
    let globals = MenuSet {
        name: String::new(),
        description: "Test set".into(),
        items: vec![MenuItem::new("?", vec![Action::new("DisplayMenu", "")])],
    };
    tree.globals("wwiv", &globals)
        .menu("wwiv", "main", &simple("Main"))
        .file("wwiv", "main.pro", "Main> .end.\nignored")
        .file("wwiv", "main.msg", "Hand drawn\n");

    let loaded = tree.loader().load("WWIV", "Main").unwrap();
    assert_eq!(loaded.name, "main");
    assert_eq!(loaded.set.name, "wwiv");
    assert_eq!(loaded.set.description, "Test set");
    assert_eq!(loaded.set.items.len(), 1);
    assert_eq!(loaded.prompt, "Main> ");
    assert_eq!(loaded.text.as_deref(), Some("Hand drawn\n"));
    assert_eq!(loaded.descriptor.title, "Main");
}

#[test]
fn missing_prompt_uses_default() {
    let tree = MenuTree::new();
    tree.menu("wwiv", "main", &simple("Main"));

    let loaded = tree.loader().load("wwiv", "main").unwrap();
    assert_eq!(loaded.prompt, DEFAULT_PROMPT);
    assert!(loaded.text.is_none());
    assert!(loaded.set.items.is_empty());
}

#[test]
fn load_errors_are_distinguished() {
    let tree = MenuTree::new();
    tree.menu("wwiv", "main", &simple("Main"))
        .file("wwiv", "broken.mnu.json", "{ not json");
    let loader = tree.loader();

    assert!(matches!(loader.load("../etc", "main"), Err(MenuError::InvalidName(_))));
    assert!(matches!(loader.load("wwiv", "con"), Err(MenuError::InvalidName(_))));
    assert!(matches!(loader.load("wwiv", "a/b"), Err(MenuError::InvalidName(_))));
    assert!(matches!(loader.load("nosuch", "main"), Err(MenuError::SetNotFound(_))));
    assert!(matches!(
        loader.load("wwiv", "xfer"),
        Err(MenuError::NotFound { ref menu, .. }) if menu == "xfer"
    ));
    assert!(matches!(loader.load("wwiv", "broken"), Err(MenuError::Parse { .. })));
}

#[test]
fn edits_are_seen_on_next_load() {
    let tree = MenuTree::new();
    tree.menu("wwiv", "main", &simple("Before"));
    let loader = tree.loader();
    assert_eq!(loader.load("wwiv", "main").unwrap().descriptor.title, "Before");

    tree.menu("wwiv", "main", &simple("After"));
    assert_eq!(loader.load("wwiv", "main").unwrap().descriptor.title, "After");
}

#[test]
fn only_sets_with_main_are_offered() {
    let tree = MenuTree::new();
    let described = MenuSet {
        name: String::new(),
        description: "Second".into(),
        items: Vec::new(),
    };
    tree.menu("zeta", "main", &simple("Z"))
        .menu("alpha", "main", &simple("A"))
        .globals("beta", &described)
        .menu("beta", "main", &simple("B"))
        .menu("nomain", "xfer", &simple("X"));
    std::fs::create_dir_all(tree.base().join("Has Space")).unwrap();

    let loader = tree.loader();
    let sets = loader.menu_sets();
    let names: Vec<&str> = sets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta", "zeta"]);
    assert_eq!(sets[1].description, "Second");
    assert!(loader.is_valid_set("alpha"));
    assert!(!loader.is_valid_set("nomain"));
    assert_eq!(loader.menu_names("nomain").unwrap(), vec!["xfer"]);
}

#[test]
fn missing_base_dir_offers_nothing() {
    let loader = JsonMenuLoader::new("/nonexistent/menubbs/menus");
    assert!(loader.menu_sets().is_empty());
    assert!(!loader.is_valid_set("wwiv"));
}

#[test]
fn sample_set_loads_and_checks_clean() {
    let tree = MenuTree::new();
    write_sample_menu_set(tree.base(), "wwiv").unwrap();
    let loader = tree.loader();

    assert_eq!(
        loader.menu_names("wwiv").unwrap(),
        vec!["main", "msgs", "sysop", "xfer"]
    );
    let main = loader.load("wwiv", "main").unwrap();
    assert!(!main.set.items.is_empty());
    assert_ne!(main.prompt, DEFAULT_PROMPT);
    assert_eq!(loader.load("wwiv", "msgs").unwrap().descriptor.numeric, NumericMode::Subs);
    assert_eq!(loader.load("wwiv", "sysop").unwrap().descriptor.password, "*SYSTEM");

    let issues = check_menu_set(&*loader, &CommandRegistry::standard(), "wwiv").unwrap();
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
}

#[test]
fn check_reports_broken_references() {
    let tree = MenuTree::new();
    let mut main = simple("Main");
    main.items.push(MenuItem::new("X", vec![Action::new("Teleport", "")]));
    main.items.push(MenuItem::new("F", vec![Action::new("MENU", "files")]));
    let globals = MenuSet {
        name: String::new(),
        description: String::new(),
        items: vec![MenuItem::new("Z", vec![Action::new("Zap", "")])],
    };
    tree.globals("wwiv", &globals)
        .menu("wwiv", "main", &main)
        .file("wwiv", "junk.mnu.json", "not json at all");

    let issues = check_menu_set(&*tree.loader(), &test_registry(), "wwiv").unwrap();
    assert!(issues.contains(&MenuIssue::UnknownCommand {
        menu: "main".into(),
        command: "Teleport".into(),
    }));
    assert!(issues.contains(&MenuIssue::MissingTarget {
        menu: "main".into(),
        target: "files".into(),
    }));
    assert!(issues.contains(&MenuIssue::UnknownCommand {
        menu: "*global*".into(),
        command: "Zap".into(),
    }));
    assert!(issues
        .iter()
        .any(|i| matches!(i, MenuIssue::Unloadable { menu, .. } if menu == "junk")));
    assert!(!issues.contains(&MenuIssue::MissingMain));
}

#[test]
fn check_flags_missing_main() {
    let tree = MenuTree::new();
    tree.menu("wwiv", "xfer", &simple("Files"));
    let issues = check_menu_set(&*tree.loader(), &test_registry(), "wwiv").unwrap();
    assert_eq!(issues, vec![MenuIssue::MissingMain]);
}
