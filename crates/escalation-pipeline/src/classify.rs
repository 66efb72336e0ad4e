//! # Classification Rules
//!
//! Pure decisions the pipeline makes about a failure before touching any
//! component: is it fatal, is it reported, is it a late fatal, and may it be
//! shown to the client.

use bootstrap_types::Severity;

/// Setting values (case-insensitive substrings) that switch display off.
const DISPLAY_OFF_TERMS: [&str; 5] = ["off", "none", "no", "false", "null"];

/// Execution cannot continue after `severity`.
#[must_use]
pub fn is_fatal(severity: Severity) -> bool {
    !severity.is_empty() && Severity::FATAL.contains(severity)
}

/// `severity` is fully inside the reporting mask.
#[must_use]
pub fn is_reported(severity: Severity, reporting: Severity) -> bool {
    reporting.contains(severity)
}

/// The shutdown handler recovers errors of these severities.
#[must_use]
pub fn is_late_fatal(severity: Severity) -> bool {
    Severity::LATE_FATAL.intersects(severity)
}

/// Interpret the display-errors setting.
///
/// Every occurrence of each off-term is removed from the value,
/// case-insensitively and one term after the other. Display is on when
/// something other than `""` or `"0"` is left. `"Off"`, `"no"` and `"0"` are
/// off; `"1"`, `"On"` and `"stderr"` are on. An unset value is off.
#[must_use]
pub fn display_enabled(setting: Option<&str>) -> bool {
    let Some(setting) = setting else {
        return false;
    };

    let remainder = DISPLAY_OFF_TERMS
        .iter()
        .fold(setting.to_string(), |value, term| remove_ignore_case(&value, term));

    !remainder.is_empty() && remainder != "0"
}

/// Single left-to-right pass; `needle` must be ASCII lowercase.
fn remove_ignore_case(haystack: &str, needle: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut rest = 0;
    while let Some(pos) = lower[rest..].find(needle) {
        out.push_str(&haystack[rest..rest + pos]);
        rest += pos + needle.len();
    }
    out.push_str(&haystack[rest..]);
    out
}
