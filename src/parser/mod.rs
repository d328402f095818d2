//! Natural-language command interpretation.
//!
//! Messages flow through [`classifier::classify`] and, for task creation,
//! through the deterministic [`extractor`] pipeline with an optional
//! language-model pass from [`llm`] layered on top.

pub mod classifier;
pub mod dates;
pub mod extractor;
pub mod llm;

use regex::Regex;

pub use classifier::{classify, Command, Query};
pub use extractor::{extract, ExtractContext};

/// Compile a pattern written as a source literal.
#[allow(clippy::expect_used)]
pub(crate) fn literal(pattern: &str) -> Regex {
    Regex::new(pattern).expect("literal pattern compiles")
}

/// Compile a case-insensitive pattern around an escaped user-supplied word.
///
/// `template` contains a single `{}` placeholder. Returns `None` if the
/// resulting pattern exceeds the regex size limit.
pub(crate) fn word_pattern(template: &str, word: &str) -> Option<Regex> {
    let escaped = regex::escape(word.trim());
    if escaped.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", template.replace("{}", &escaped))).ok()
}
