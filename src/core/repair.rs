// TalkLog - core/repair.rs
//
// Best-effort cleanup of known mis-decoded character sequences.
// A fixed table, not an encoding detector.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Characters whose presence means the repair table has work to do.
const TRIGGERS: [char; 4] = ['\u{FFFD}', '\u{00BD}', '\u{00E3}', '\u{00E2}'];

/// Remove or replace known mojibake in `text`.
///
/// The table, applied in order:
///   1. U+FFFD replacement characters are removed.
///   2. The Latin-1 rendering of a UTF-8 replacement character (`ï¿½`, with the
///      first two characters optional) is removed.
///   3. `ã` becomes `ア` and `â` becomes `→`.
///
/// Returns the input unchanged (borrowed) when none of the table applies.
pub fn repair_encoding(text: &str) -> Cow<'_, str> {
    if !text.contains(TRIGGERS) {
        return Cow::Borrowed(text);
    }

    static MOJIBAKE: OnceLock<Regex> = OnceLock::new();
    let mojibake = MOJIBAKE.get_or_init(|| {
        Regex::new("\u{00EF}?\u{00BF}?\u{00BD}").expect("repair_encoding: invalid regex")
    });

    let without_replacement: String = text.chars().filter(|&c| c != '\u{FFFD}').collect();
    let repaired = mojibake
        .replace_all(&without_replacement, "")
        .replace('\u{00E3}', "ア")
        .replace('\u{00E2}', "→");

    tracing::trace!(
        before = text.len(),
        after = repaired.len(),
        "Encoding repair applied"
    );
    Cow::Owned(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_borrowed() {
        let text = "12:00\tAlice\thello";
        assert!(matches!(repair_encoding(text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_replacement_characters_removed() {
        assert_eq!(repair_encoding("he\u{FFFD}llo\u{FFFD}"), "hello");
    }

    #[test]
    fn test_latin1_mojibake_sequence_removed() {
        assert_eq!(repair_encoding("a\u{00EF}\u{00BF}\u{00BD}b"), "ab");
        assert_eq!(repair_encoding("a\u{00BF}\u{00BD}b"), "ab");
        assert_eq!(repair_encoding("a\u{00BD}b"), "ab");
    }

    #[test]
    fn test_character_substitutions() {
        assert_eq!(repair_encoding("\u{00E3}\u{00E2}"), "ア→");
    }

    #[test]
    fn test_repair_is_deterministic() {
        let text = "x\u{FFFD}\u{00E3}y";
        assert_eq!(repair_encoding(text), repair_encoding(text));
    }
}
