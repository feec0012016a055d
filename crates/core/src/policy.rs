//! Policy Gate
//!
//! Coarse string-pattern authorization applied to every statement before it
//! reaches the dispatcher. This is not a SQL parser: with DDL/DML enabled it
//! only refuses a small deny-list of pattern classes and lets everything else
//! through.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::PolicyError;

/// Leading keyword that marks a read statement.
pub const READ_KEYWORD: &str = "SELECT";

/// A deny-list pattern class with its compiled regex.
struct ForbiddenPattern {
    name: &'static str,
    regex: Regex,
}

/// Compiled deny-list (initialized once).
fn forbidden_patterns() -> &'static [ForbiddenPattern] {
    static PATTERNS: OnceLock<Vec<ForbiddenPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Inline comment after a statement terminator
            ("comment after terminator", r"(?i);\s*--"),
            // Stored procedure invocation
            ("procedure invocation", r"(?i)EXEC\s"),
            // Extended stored procedure prefix
            ("extended procedure", r"(?i)XP_"),
        ]
        .into_iter()
        .filter_map(|(name, pattern)| {
            Regex::new(pattern)
                .ok()
                .map(|regex| ForbiddenPattern { name, regex })
        })
        .collect()
    })
}

/// Whether a statement is a read statement (leading `SELECT`, any case).
pub fn is_read_statement(sql: &str) -> bool {
    sql.trim().to_uppercase().starts_with(READ_KEYWORD)
}

/// Authorize a statement under the current DDL/DML setting.
///
/// With DDL/DML disabled only read statements pass. With it enabled every
/// statement passes unless it matches a deny-list pattern.
pub fn authorize(sql: &str, ddl_dml_enabled: bool) -> Result<(), PolicyError> {
    if !ddl_dml_enabled {
        if is_read_statement(sql) {
            return Ok(());
        }
        return Err(PolicyError::NotAuthorized);
    }

    match forbidden_patterns().iter().find(|p| p.regex.is_match(sql)) {
        Some(pattern) => Err(PolicyError::ForbiddenPattern {
            pattern: pattern.name.to_string(),
        }),
        None => Ok(()),
    }
}
