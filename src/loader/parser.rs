//! TLE text parsing
//!
//! Accepts the usual text layouts: bare two-line sets, three-line sets
//! with a name line, and 3LE files whose name lines carry a `0 ` prefix.

use std::sync::OnceLock;

use regex::Regex;

/// One set of element lines as it appeared in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TleEntry {
    /// Empty when the file carries no name line
    pub name: String,
    pub line1: String,
    pub line2: String,
}

impl TleEntry {
    /// Name, or catalog field of line 1 when unnamed
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.line1.get(2..7).unwrap_or(&self.line1).trim().to_string()
        } else {
            self.name.clone()
        }
    }
}

static TLE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn tle_pattern() -> &'static Regex {
    TLE_PATTERN.get_or_init(|| {
        Regex::new(
            r"(?m)(?:^(?P<name>[^\r\n]+)\r?\n)?^(?P<line1>1 [^\r\n]+)\r?\n^(?P<line2>2 [^\r\n]+)",
        )
        .expect("static TLE pattern compiles")
    })
}

/// Extracts every element set from `text`, in file order
pub fn parse_tle_text(text: &str) -> Vec<TleEntry> {
    tle_pattern()
        .captures_iter(text)
        .map(|caps| {
            let name = caps
                .name("name")
                .map(|m| clean_name(m.as_str()))
                .unwrap_or_default();
            TleEntry {
                name,
                line1: caps["line1"].trim_end().to_string(),
                line2: caps["line2"].trim_end().to_string(),
            }
        })
        .collect()
}

fn clean_name(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("0 ")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
