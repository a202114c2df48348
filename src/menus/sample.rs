//! Starter menu set written by `menubbs init`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::loader::{MENU_EXTENSION, MENU_SET_FILE};
use super::model::{
    Action, HelpPolicy, LogPolicy, MenuDescriptor, MenuItem, MenuSet, NumericMode,
    SYSTEM_PASSWORD_SENTINEL,
};

/// One menu of the sample set: name, definition and optional `.pro` prompt.
pub type SampleMenu = (&'static str, MenuDescriptor, Option<&'static str>);

fn item(key: &str, text: &str, cmd: &str, data: &str) -> MenuItem {
    MenuItem::new(key, vec![Action::new(cmd, data)]).with_text(text)
}

pub fn sample_globals() -> MenuSet {
    MenuSet {
        name: String::new(),
        description: "Classic WWIV-style menus".to_string(),
        items: vec![
            item("?", "Show this menu", "DisplayMenu", ""),
            item("X", "Toggle expert mode", "ToggleExpert", ""),
            item("/H", "Toggle hotkeys", "ToggleHotKeys", ""),
            item("/O", "Log off now", "FastGoodBye", ""),
        ],
    }
}

pub fn sample_menus() -> Vec<SampleMenu> {
    let mut main = MenuDescriptor::new("Main Menu");
    main.items = vec![
        item("M", "Message area", "MENU", "msgs"),
        item("F", "File area", "MENU", "xfer"),
        item("S", "Sysop menu", "MENU", "sysop").with_acs("sysop"),
        item("R", "Read the rules", "PrintFile", "rules"),
        item("C", "Choose menu set", "ConfigUserMenuSet", ""),
        item("I", "Your account", "YourInfo", ""),
        item("V", "Version", "Version", ""),
        item("G", "Goodbye", "Goodbye", ""),
    ];

    let mut msgs = MenuDescriptor::new("Message Area");
    msgs.numeric = NumericMode::Subs;
    msgs.items = vec![
        item("L", "List subs", "SubList", ""),
        item("+", "Next sub", "UpSub", ""),
        item("-", "Previous sub", "DownSub", ""),
        item("Q", "Back to main", "ReturnFromMenu", ""),
    ];

    let mut xfer = MenuDescriptor::new("File Area");
    xfer.numeric = NumericMode::Dirs;
    xfer.items = vec![
        item("L", "List directories", "DirList", ""),
        item("+", "Next directory", "UpDir", ""),
        item("-", "Previous directory", "DownDir", ""),
        item("Q", "Back to main", "ReturnFromMenu", ""),
    ];

    let mut sysop = MenuDescriptor::new("Sysop Menu");
    sysop.acs = "sysop".to_string();
    sysop.password = SYSTEM_PASSWORD_SENTINEL.to_string();
    sysop.help = HelpPolicy::OnEntrance;
    sysop.logging = LogPolicy::Command;
    sysop.items = vec![
        item("C", "Clear screen", "cls", ""),
        item("H", "Home (clear menu stack)", "ClearMenuStack", ""),
        item("Q", "Back", "ReturnFromMenu", ""),
    ];

    vec![
        ("main", main, Some("\nMain: .end.\n")),
        ("msgs", msgs, Some("\nMessages (# selects a sub): .end.\n")),
        ("xfer", xfer, Some("\nFiles (# selects a dir): .end.\n")),
        ("sysop", sysop, None),
    ]
}

/// Write the sample set to `<base_dir>/<name>/`, replacing files already there.
pub fn write_sample_menu_set(base_dir: &Path, name: &str) -> io::Result<PathBuf> {
    let dir = base_dir.join(name);
    fs::create_dir_all(&dir)?;
    fs::write(
        dir.join(MENU_SET_FILE),
        serde_json::to_vec_pretty(&sample_globals())?,
    )?;
    for (menu, descriptor, prompt) in sample_menus() {
        fs::write(
            dir.join(format!("{}.{}", menu, MENU_EXTENSION)),
            serde_json::to_vec_pretty(&descriptor)?,
        )?;
        if let Some(prompt) = prompt {
            fs::write(dir.join(format!("{}.pro", menu)), prompt)?;
        }
    }
    Ok(dir)
}
