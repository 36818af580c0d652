//! Naming-pattern expansion for exported icons.
//!
//! A naming pattern is a file name (optionally with `/` subdirectories) that
//! may contain two tokens:
//!
//! - `%w` → item width in decimal, no padding
//! - `%h` → item height in decimal, no padding
//!
//! There is no escaping. Any other `%` sequence, including a trailing `%`,
//! passes through literally:
//! - `"Icon-%w@2x"` at 40x40 → `"Icon-40@2x"`
//! - `"Icon-%wx%h"` at 48x32 → `"Icon-48x32"`
//! - `"100%-%q"` → `"100%-%q"`

/// Expand `%w` and `%h` in one left-to-right pass.
///
/// A single pass means a substituted number can never form a new token with
/// its neighbours, so the result does not depend on substitution order.
pub fn expand_pattern(pattern: &str, width: u32, height: u32) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.peek() {
                Some('w') => {
                    chars.next();
                    out.push_str(&width.to_string());
                    continue;
                }
                Some('h') => {
                    chars.next();
                    out.push_str(&height.to_string());
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

/// True when the pattern is missing or only whitespace.
pub fn is_blank(pattern: Option<&str>) -> bool {
    pattern.is_none_or(|p| p.trim().is_empty())
}
