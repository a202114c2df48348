//! Helpers that keep caller-supplied text from breaking single-line logs.

use std::fmt::Write;

/// Log target for the per-menu activity log (`LogPolicy`) and `*MENU*` lines.
pub const SYSOP_TARGET: &str = "menubbs::sysop";

/// Log target for access denials; routed to the security log file.
pub const SECURITY_TARGET: &str = "security";

/// Longest message body carried by a `*MENU*` line.
pub const MENU_LOG_MAX: usize = 180;

/// Escape a string for single-line logging.
///
/// Newlines, carriage returns, tabs and backslashes become two-character
/// escapes; any other control character becomes `\xNN`. Output stops after
/// 300 characters with a trailing `…`.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 300;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Format a menu diagnostic the way sysops expect to see it: `*MENU* : msg`,
/// with the message cut to [`MENU_LOG_MAX`] characters.
pub fn menu_log_line(msg: &str) -> String {
    let body: String = msg
        .chars()
        .filter(|c| !c.is_control())
        .take(MENU_LOG_MAX)
        .collect();
    format!("*MENU* : {}", body)
}
