//! Label escaping for Newick output.

/// Characters that force a label into single quotes.
const SPECIAL_CHARS: &[char] = &[
    ',', ';', '\t', '\n', '\r', '(', ')', ':', '[', ']', '\'', '_',
];

/// Checks if a label is enclosed in single quotes.
///
/// # Examples
/// ```
/// # use reroot::parser::utils::is_single_quoted;
/// assert_eq!(is_single_quoted("Pukeko"), false);
/// assert_eq!(is_single_quoted("'Swamp hen'"), true);
/// ```
pub fn is_single_quoted(label: &str) -> bool {
    label.starts_with('\'') && label.ends_with('\'') && label.len() >= 2
}

/// Escapes a label so that parsing it back yields the same label.
///
/// Labels containing special characters (punctuation, delimiters,
/// underscores, quotes) are wrapped in single quotes with internal
/// single quotes doubled. Otherwise spaces are replaced with underscores.
///
/// # Examples
/// ```
/// # use reroot::parser::utils::escape_label;
/// assert_eq!(escape_label("Pukeko"), "Pukeko");
/// assert_eq!(escape_label("Pu[ke]ko"), "'Pu[ke]ko'");
/// assert_eq!(escape_label("Australasian Swamphen"), "Australasian_Swamphen");
/// assert_eq!(escape_label("Baillon's Crake"), "'Baillon''s Crake'");
/// assert_eq!(escape_label("Kea_1"), "'Kea_1'");
/// assert_eq!(escape_label(""), "''");
/// ```
pub fn escape_label(label: &str) -> String {
    if label.is_empty() {
        return "''".to_string();
    }
    if label.contains(SPECIAL_CHARS) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.replace(' ', "_")
    }
}

/// Reverts [escape_label].
///
/// # Examples
/// ```
/// # use reroot::parser::utils::unescape_label;
/// assert_eq!(unescape_label("Australasian_Swamphen"), "Australasian Swamphen");
/// assert_eq!(unescape_label("'Baillon''s_Crake'"), "Baillon's_Crake");
/// ```
pub fn unescape_label(label: &str) -> String {
    if is_single_quoted(label) {
        label[1..label.len() - 1].replace("''", "'")
    } else {
        label.replace('_', " ")
    }
}
