//! Hotkey resolver: turns typed characters into one command token without
//! requiring Enter.
//!
//! Most keys complete a token on their own. A key listed in one of the two
//! [`PrefixSets`] needs one or two more characters first, which is how `12`
//! and `1` can both be valid selections when there are more than nine numbered
//! areas. `/` is always a one-extra prefix so two-character `/X` commands work
//! everywhere, and `//` drops out of hotkey mode into a free-form line.

use std::collections::BTreeSet;

use super::terminal::{Hangup, Terminal, BACKSPACE, ENTER, MAX_COMMAND_LINE, SPACE};

/// Prefix present in every menu's one-extra set.
pub const ESCAPE_PREFIX: char = '/';

/// Characters that need one or two more characters before a token is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixSets {
    one_extra: BTreeSet<char>,
    two_extra: BTreeSet<char>,
}

impl PrefixSets {
    pub fn new(
        one_extra: impl IntoIterator<Item = char>,
        two_extra: impl IntoIterator<Item = char>,
    ) -> Self {
        Self {
            one_extra: one_extra.into_iter().map(|c| c.to_ascii_uppercase()).collect(),
            two_extra: two_extra.into_iter().map(|c| c.to_ascii_uppercase()).collect(),
        }
    }

    /// Only the universal `/` prefix.
    pub fn escape_only() -> Self {
        Self::new([ESCAPE_PREFIX], [])
    }

    /// Derive the sets from the selection keys of the visible numbered areas.
    ///
    /// A two-character key makes its first character a one-extra prefix, a
    /// three-character key a two-extra prefix.
    pub fn for_area_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut sets = Self::escape_only();
        for key in keys {
            let mut chars = key.chars();
            let Some(first) = chars.next() else { continue };
            let first = first.to_ascii_uppercase();
            match 1 + chars.count() {
                2 => {
                    sets.one_extra.insert(first);
                }
                3 => {
                    sets.two_extra.insert(first);
                }
                _ => {}
            }
        }
        sets
    }

    /// Sets for areas numbered `1..=count`.
    pub fn for_numbered(count: usize) -> Self {
        let keys: Vec<String> = (1..=count).map(|n| n.to_string()).collect();
        Self::for_area_keys(keys.iter().map(String::as_str))
    }

    pub fn one_extra(&self) -> &BTreeSet<char> {
        &self.one_extra
    }

    pub fn two_extra(&self) -> &BTreeSet<char> {
        &self.two_extra
    }

    /// Token length at which input starting with `first` auto-completes.
    pub fn required_len(&self, first: char) -> usize {
        if self.two_extra.contains(&first) {
            3
        } else if self.one_extra.contains(&first) {
            2
        } else {
            1
        }
    }
}

fn is_first_key(ch: char) -> bool {
    ch == ENTER || ('!'..='~').contains(&ch)
}

fn is_continuation_key(ch: char) -> bool {
    ch == ENTER || ch == BACKSPACE || (SPACE..='~').contains(&ch)
}

/// Read one command token.
///
/// With `immediate_on_space_or_enter`, a first key of Space or Enter is
/// returned as-is. Each Backspace also lowers the length at which the token
/// completes; backspacing over the last character starts over from the
/// first key.
pub fn resolve_hotkey<T>(
    term: &mut T,
    prefixes: &PrefixSets,
    immediate_on_space_or_enter: bool,
) -> Result<String, Hangup>
where
    T: Terminal + ?Sized,
{
    'restart: loop {
        let first = loop {
            let ch = term.getkey()?;
            if immediate_on_space_or_enter && (ch == ENTER || ch == SPACE) {
                return Ok(ch.to_ascii_uppercase().to_string());
            }
            if is_first_key(ch) {
                break ch.to_ascii_uppercase();
            }
        };

        if first == ENTER {
            term.nl()?;
            return Ok(String::new());
        }
        term.putch(first)?;

        let mut token = String::from(first);
        let mut required = prefixes.required_len(first);
        if required == 1 {
            term.nl()?;
            return Ok(token);
        }

        loop {
            let ch = loop {
                let ch = term.getkey()?;
                if is_continuation_key(ch) {
                    break ch;
                }
            };
            match ch {
                ENTER => {
                    term.nl()?;
                    return Ok(token);
                }
                BACKSPACE => {
                    token.pop();
                    required = required.saturating_sub(1);
                    term.backspace()?;
                    if token.is_empty() {
                        continue 'restart;
                    }
                }
                ch => {
                    let ch = ch.to_ascii_uppercase();
                    if ch == ESCAPE_PREFIX && token.len() == 1 && first == ESCAPE_PREFIX {
                        term.putch(ch)?;
                        return term.input_upper(MAX_COMMAND_LINE);
                    }
                    token.push(ch);
                    term.putch(ch)?;
                    if token.len() >= required {
                        term.nl()?;
                        return Ok(token);
                    }
                }
            }
        }
    }
}
