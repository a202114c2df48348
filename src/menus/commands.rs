//! Built-in command handlers.
//!
//! Handlers never touch the menu stack themselves. Navigation is requested by
//! setting `ctx.effect`; menu-set changes by setting `ctx.need_reload`.

use log::{info, warn};
use std::fs;

use super::executor::MenuExecutionContext;
use super::registry::{CommandCategory, CommandRegistry};
use super::terminal::Hangup;
use super::model::MenuEffect;
use crate::bbs::roles::role_name;
use crate::bbs::session::Area;
use crate::logutil::escape_log;
use crate::validation::secure_text_path;

type HandlerResult = Result<(), Hangup>;

/// Lines shown between `More?` prompts by `PrintFile`.
const PAGE_LINES: usize = 20;

pub fn register_builtins(registry: &mut CommandRegistry) {
    use CommandCategory::*;

    registry.register("MENU", Menu, "<menu> Push the named menu of the current set", menu);
    registry.register("ReturnFromMenu", Menu, "Return to the previous menu", return_from_menu);
    registry.register("ClearMenuStack", Menu, "Drop every menu and restart at main", clear_menu_stack);
    registry.register("DisplayMenu", Menu, "Show the current menu (expert users)", display_menu);
    registry.register("DisplayHelp", Menu, "Alias for DisplayMenu", display_menu);

    registry.register("SetSubNumber", Message, "<key> Select a message sub", set_sub_number);
    registry.register("UpSub", Message, "Next message sub", up_sub);
    registry.register("DownSub", Message, "Previous message sub", down_sub);
    registry.register("SubList", Message, "List message subs", sub_list);

    registry.register("SetDirNumber", File, "<key> Select a file directory", set_dir_number);
    registry.register("UpDir", File, "Next file directory", up_dir);
    registry.register("DownDir", File, "Previous file directory", down_dir);
    registry.register("DirList", File, "List file directories", dir_list);

    registry.register("PrintFile", System, "<file> Show a text file, paged", print_file);
    registry.register("PrintFileNA", System, "<file> Show a text file without paging", print_file_na);
    registry.register("Pause", System, "Wait for a key", pause);
    registry.register("cls", System, "Clear the screen", cls);
    registry.register("Version", System, "Show the program version", version);
    registry.register("Goodbye", System, "Log off after confirmation", goodbye);
    registry.register("FastGoodBye", System, "Log off immediately", fast_goodbye);

    registry.register("ConfigUserMenuSet", User, "Choose a different menu set", config_user_menu_set);
    registry.register("ToggleExpert", User, "Turn expert mode on or off", toggle_expert);
    registry.register("ToggleHotKeys", User, "Turn hotkey input on or off", toggle_hotkeys);
    registry.register("YourInfo", User, "Show your account details", your_info);
}

fn menu(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    let target = ctx.data.trim();
    if !target.is_empty() {
        ctx.effect = MenuEffect::Push(target.to_string());
    }
    Ok(())
}

fn return_from_menu(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.effect = MenuEffect::Return;
    Ok(())
}

fn clear_menu_stack(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.effect = MenuEffect::ClearStack;
    Ok(())
}

// Non-expert users already see the menu before every prompt.
fn display_menu(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    match ctx.menu {
        Some(menu) if ctx.session.user.expert => {
            menu.display_menu(ctx.services.acs.as_ref(), &ctx.session.user, ctx.term)
        }
        _ => Ok(()),
    }
}

fn config_user_menu_set(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.services
        .chooser
        .choose(ctx.services.loader.as_ref(), ctx.session, ctx.term)?;
    ctx.need_reload = true;
    Ok(())
}

fn announce_area(ctx: &mut MenuExecutionContext<'_>, area: Option<Area>, what: &str) -> HandlerResult {
    match area {
        Some(area) => ctx
            .term
            .print_text(&format!("\n{} {}: {}\n", what, area.key, area.name)),
        None => Ok(()),
    }
}

fn set_sub_number(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    if ctx.session.set_sub_by_key(ctx.data.trim()) {
        let area = ctx.session.current_sub_area().cloned();
        announce_area(ctx, area, "Sub")?;
    }
    Ok(())
}

fn set_dir_number(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    if ctx.session.set_dir_by_key(ctx.data.trim()) {
        let area = ctx.session.current_dir_area().cloned();
        announce_area(ctx, area, "Dir")?;
    }
    Ok(())
}

fn step(current: usize, len: usize, forward: bool) -> usize {
    match (len, forward) {
        (0, _) => 0,
        (_, true) => (current + 1) % len,
        (_, false) => (current + len - 1) % len,
    }
}

fn up_sub(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.session.current_sub = step(ctx.session.current_sub, ctx.session.message_areas.len(), true);
    let area = ctx.session.current_sub_area().cloned();
    announce_area(ctx, area, "Sub")
}

fn down_sub(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.session.current_sub = step(ctx.session.current_sub, ctx.session.message_areas.len(), false);
    let area = ctx.session.current_sub_area().cloned();
    announce_area(ctx, area, "Sub")
}

fn up_dir(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.session.current_dir = step(ctx.session.current_dir, ctx.session.file_areas.len(), true);
    let area = ctx.session.current_dir_area().cloned();
    announce_area(ctx, area, "Dir")
}

fn down_dir(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.session.current_dir = step(ctx.session.current_dir, ctx.session.file_areas.len(), false);
    let area = ctx.session.current_dir_area().cloned();
    announce_area(ctx, area, "Dir")
}

fn area_listing(title: &str, areas: &[Area], current: usize) -> String {
    let mut out = format!("\n{}\n", title);
    if areas.is_empty() {
        out.push_str("  (none)\n");
    }
    for (idx, area) in areas.iter().enumerate() {
        let mark = if idx == current { '*' } else { ' ' };
        out.push_str(&format!("{} {:>4}  {}\n", mark, area.key, area.name));
    }
    out
}

fn sub_list(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    let text = area_listing("Message subs", &ctx.session.message_areas, ctx.session.current_sub);
    ctx.term.print_text(&text)
}

fn dir_list(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    let text = area_listing("File directories", &ctx.session.file_areas, ctx.session.current_dir);
    ctx.term.print_text(&text)
}

/// Read a file from the session's text directory, trying `<name>.msg` when
/// the bare name does not exist.
fn read_text_file(ctx: &MenuExecutionContext<'_>) -> Option<String> {
    let name = ctx.data.trim();
    let dir = &ctx.session.gfiles_dir;
    let mut candidates = Vec::new();
    match secure_text_path(dir, name) {
        Ok(path) => candidates.push(path),
        Err(e) => {
            warn!("rejected text file name '{}': {}", escape_log(name), e);
            return None;
        }
    }
    if !name.contains('.') {
        if let Ok(path) = secure_text_path(dir, &format!("{}.msg", name)) {
            candidates.push(path);
        }
    }
    candidates
        .into_iter()
        .find_map(|path| fs::read(path).ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn show_file(ctx: &mut MenuExecutionContext<'_>, paged: bool) -> HandlerResult {
    let Some(text) = read_text_file(ctx) else {
        return ctx
            .term
            .print_text(&format!("\nFile not found: {}\n", ctx.data.trim()));
    };
    ctx.term.nl()?;
    for (n, line) in text.lines().enumerate() {
        if paged && n > 0 && n % PAGE_LINES == 0 {
            ctx.term.write_str("More? [Y/n] ")?;
            let key = ctx.term.getkey()?;
            ctx.term.nl()?;
            if key.eq_ignore_ascii_case(&'n') || key == 'q' || key == 'Q' {
                return Ok(());
            }
        }
        ctx.term.write_str(line)?;
        ctx.term.nl()?;
    }
    Ok(())
}

fn print_file(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    show_file(ctx, true)
}

fn print_file_na(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    show_file(ctx, false)
}

fn pause(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.term.pause()
}

fn cls(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.term.cls()
}

fn version(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.term.print_text(&format!(
        "\n{} {}\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ))
}

fn goodbye(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.term.write_str("\r\nLog off? [y/N] ")?;
    let key = ctx.term.getkey()?;
    ctx.term.nl()?;
    if key.eq_ignore_ascii_case(&'y') {
        fast_goodbye(ctx)?;
    }
    Ok(())
}

fn fast_goodbye(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    info!(
        "{} logged off after {}s",
        escape_log(&ctx.session.user.name),
        ctx.session.session_duration().num_seconds()
    );
    ctx.term.print_text("\nGoodbye!\n")?;
    ctx.session.hang_up();
    Err(Hangup)
}

fn toggle_expert(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.session.user.expert = !ctx.session.user.expert;
    let state = if ctx.session.user.expert { "on" } else { "off" };
    ctx.term.print_text(&format!("\nExpert mode {}.\n", state))
}

fn toggle_hotkeys(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    ctx.session.user.hotkeys = !ctx.session.user.hotkeys;
    let state = if ctx.session.user.hotkeys { "on" } else { "off" };
    ctx.term.print_text(&format!("\nHotkeys {}.\n", state))
}

fn your_info(ctx: &mut MenuExecutionContext<'_>) -> HandlerResult {
    let s = &*ctx.session;
    let u = &s.user;
    let text = format!(
        "\nName     : {}\nRole     : {}\nSL / DSL : {} / {}\nAR / DAR : {:#06x} / {:#06x}\nMenu set : {}\nExpert   : {}\nHotkeys  : {}\nOn since : {}\n",
        u.name,
        role_name(u.sl),
        u.sl,
        u.dsl,
        u.ar,
        u.dar,
        s.menu_set,
        if u.expert { "yes" } else { "no" },
        if u.hotkeys { "yes" } else { "no" },
        s.login_time.format("%Y-%m-%d %H:%M UTC"),
    );
    ctx.term.print_text(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_steps_wrap() {
        assert_eq!(step(0, 3, true), 1);
        assert_eq!(step(2, 3, true), 0);
        assert_eq!(step(0, 3, false), 2);
        assert_eq!(step(0, 0, false), 0);
    }

    #[test]
    fn listing_marks_current_area() {
        let text = area_listing("Message subs", &Area::numbered("Sub", 2), 1);
        assert!(text.contains("     1  Sub 1"));
        assert!(text.contains("*    2  Sub 2"));
        assert!(area_listing("x", &[], 0).contains("(none)"));
    }

    #[test]
    fn every_builtin_is_registered_once() {
        let mut r = CommandRegistry::empty();
        register_builtins(&mut r);
        assert_eq!(r.len(), 24);
        assert!(r.contains("displayhelp"));
        assert!(r.contains("CLS"));
    }
}
