//! Utility functions for rulesync
//!
//! Blank-string helpers used by the credential branches and settings checks.

/// Returns `true` when the string is empty or contains only whitespace
///
/// # Examples
///
/// ```
/// use rulesync_common::is_blank;
///
/// assert!(is_blank(""));
/// assert!(is_blank("  \t"));
/// assert!(!is_blank(" secret "));
/// ```
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Returns `true` when the optional string is present and not blank
///
/// # Examples
///
/// ```
/// use rulesync_common::is_not_blank;
///
/// assert!(is_not_blank(Some("redis")));
/// assert!(!is_not_blank(Some("   ")));
/// assert!(!is_not_blank(None));
/// ```
pub fn is_not_blank(s: Option<&str>) -> bool {
    s.is_some_and(|v| !is_blank(v))
}

/// Returns the value when it is present and not blank
pub fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !is_blank(v))
}
