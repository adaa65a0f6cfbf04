//! Carve one SQL statement out of a free-text model reply
//!
//! Two strategies are available (see [`ExtractionStrategy`]):
//!
//! - `Offset` finds the first `sql`, skips it plus exactly one character and
//!   reads up to the first `;`. A reply that puts two characters (or none)
//!   between the marker and the statement gets its first character dropped
//!   or a stray character kept.
//! - `Marker` understands ```` ```sql ```` fences, `SQL:` labels and bare
//!   `sql` markers, skips prose between marker and statement, and only stops at
//!   a `;` that is outside quotes.
//!
//! Both return `found == false` for replies without a lowercase `sql` (a lone
//! `SQL:` label is not enough), and both upper-case the statement unless
//! `normalize_case` is off.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{ExtractionConfig, ExtractionStrategy};

const MARKER: &str = "sql";
const LABEL: &str = "SQL:";
const FENCE: &str = "```";
const KEYWORDS: &str =
    "SELECT|WITH|INSERT|UPDATE|DELETE|MERGE|CREATE|ALTER|DROP|TRUNCATE|SHOW|DESCRIBE|GRANT|REVOKE";

lazy_static! {
    static ref SQL_FENCE: Regex = Regex::new(r"```[ \t]*sql\b[^\n]*(?:\n|$)").unwrap();
    static ref STATEMENT_START: Regex =
        Regex::new(&format!(r"(?im)^[ \t]*({})\b", KEYWORDS)).unwrap();
    static ref STARTS_WITH_KEYWORD: Regex =
        Regex::new(&format!(r"(?i)^({})\b", KEYWORDS)).unwrap();
}

/// Outcome of one extraction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionResult {
    pub found: bool,
    pub sql: Option<String>,
}

impl ExtractionResult {
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn found(sql: String) -> Self {
        Self {
            found: true,
            sql: Some(sql),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlExtractor {
    config: ExtractionConfig,
}

impl SqlExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn with_strategy(strategy: ExtractionStrategy) -> Self {
        Self::new(ExtractionConfig {
            strategy,
            ..ExtractionConfig::default()
        })
    }

    pub fn strategy(&self) -> ExtractionStrategy {
        self.config.strategy
    }

    pub fn extract(&self, model_output: &str) -> ExtractionResult {
        let output = model_output.trim();
        let statement = match self.config.strategy {
            ExtractionStrategy::Offset => extract_at_offset(output),
            ExtractionStrategy::Marker => extract_after_marker(output),
        };

        match statement {
            Some(sql) if self.config.normalize_case => ExtractionResult::found(sql.to_uppercase()),
            Some(sql) => ExtractionResult::found(sql),
            None => ExtractionResult::not_found(),
        }
    }
}

/// Fixed heuristic: marker, one extra character, everything up to `;`
fn extract_at_offset(output: &str) -> Option<String> {
    let idx = output.find(MARKER)?;
    let after_marker = &output[idx + MARKER.len()..];
    let window = match after_marker.char_indices().nth(1) {
        Some((skip, _)) => &after_marker[skip..],
        None => "",
    };
    let statement = window.split(';').next().unwrap_or_default();
    Some(statement.to_string())
}

fn extract_after_marker(output: &str) -> Option<String> {
    if !output.contains(MARKER) {
        return None;
    }

    let statement = if let Some(fence) = SQL_FENCE.find(output) {
        cut_statement(&output[fence.end()..])
    } else if let Some(idx) = output.find(LABEL) {
        cut_statement(align_to_statement(&output[idx + LABEL.len()..]))
    } else if let Some(idx) = output.find(MARKER) {
        cut_statement(align_to_statement(&output[idx + MARKER.len()..]))
    } else {
        return None;
    };

    let statement = statement.trim();
    if statement.is_empty() {
        None
    } else {
        Some(statement.to_string())
    }
}

/// Skip prose between a marker and the statement.
///
/// A window that already opens with a keyword is kept as is. Otherwise the
/// statement starts at the first keyword line before any `;`, so text after
/// the first statement is never picked.
fn align_to_statement(window: &str) -> &str {
    let window = window.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    if STARTS_WITH_KEYWORD.is_match(window) {
        return window;
    }

    let prose_end = window.find(';').unwrap_or(window.len());
    match STATEMENT_START.find(&window[..prose_end]) {
        Some(m) => &window[m.start()..],
        None => window,
    }
}

/// Text up to the first `;` or closing fence that is not inside quotes
fn cut_statement(window: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;

    for (idx, c) in window.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            ';' if !in_single && !in_double => return &window[..idx],
            '`' if !in_single && !in_double && window[idx..].starts_with(FENCE) => {
                return &window[..idx]
            }
            _ => {}
        }
    }

    window
}
