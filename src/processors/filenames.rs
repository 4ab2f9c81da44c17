//! Parsing of acquisition file names.
//!
//! Sequence files name every injection as `<order>_<subject>_<local order>`,
//! e.g. `18_QC 4 _18`. The helpers here validate such names and split them
//! into the identifiers exported in the sequence table.

use std::sync::OnceLock;

use regex::Regex;

fn trailing_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.*\D)(\d+)$").expect("static pattern"))
}

fn subject_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+_)(.*?)(_\d+)$").expect("static pattern"))
}

/// A file name is valid if it has at least two non-empty `_`-separated
/// tokens and the last one is a number.
pub fn validate_filename(file_name: &str) -> bool {
    let tokens: Vec<&str> = file_name.split('_').filter(|t| !t.is_empty()).collect();
    tokens.len() > 1
        && tokens
            .last()
            .is_some_and(|last| last.chars().all(|c| c.is_ascii_digit()))
}

/// Replace every space with an underscore.
pub fn replace_spaces(file_name: &str) -> String {
    file_name.replace(' ', "_")
}

/// Split a file name into its non-numeric prefix and trailing numeric suffix.
///
/// ```
/// use rcx_tk::processors::filenames::separate_filename;
///
/// assert_eq!(
///     separate_filename("18_QC 4 _18"),
///     Some(("18_QC 4 _".to_string(), "18".to_string()))
/// );
/// ```
pub fn separate_filename(file_name: &str) -> Option<(String, String)> {
    let caps = trailing_number_pattern().captures(file_name)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Trailing number of the file name (the injection's position in its sequence).
pub fn local_order(file_name: &str) -> Option<i64> {
    let (_, suffix) = separate_filename(file_name)?;
    suffix.parse().ok()
}

/// Everything before the trailing `_<digits>`, trimmed.
pub fn sequence_identifier(file_name: &str) -> Option<String> {
    let (prefix, _) = separate_filename(file_name)?;
    Some(prefix.trim_end_matches('_').trim().to_string())
}

/// The part between the leading `<digits>_` and the trailing `_<digits>`, trimmed.
pub fn subject_identifier(file_name: &str) -> Option<String> {
    let caps = subject_pattern().captures(file_name)?;
    Some(caps[2].trim().to_string())
}
