//! Security levels used across the BBS.
//!
//! Users carry a numeric security level (SL). Higher values imply a superset of
//! lower capabilities. Use [role_name] for display.
/// Security level constants
pub const SL_NEW_USER: u8 = 10;
pub const SL_COSYSOP: u8 = 200;
pub const SL_SYSOP: u8 = 255;

/// Return the human‑readable role name for a security level.
///
/// 255 is "Sysop", 200 and up "Co-Sysop", otherwise "User".
pub fn role_name(sl: u8) -> &'static str {
    match sl {
        SL_SYSOP => "Sysop",
        s if s >= SL_COSYSOP => "Co-Sysop",
        _ => "User",
    }
}
