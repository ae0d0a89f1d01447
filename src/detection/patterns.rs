//! Marker token patterns and the fixed flight-sequence fallback table.
//!
//! The fallback table reproduces one specific deployment's known shoot
//! sequence literally, including the unmapped gap at 564 and the two
//! different offset constants. It is an ordered list of range rules so the
//! mapping stays auditable in one place.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Marker;

/// Bare number 1-39 (two-digit numbers only from 10 upward).
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([1-9]|[1-3][0-9])\b").unwrap());

/// Single letter A-J followed by 1-2 digits.
static LETTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-J]\d{1,2})\b").unwrap());

/// The two markers past the plain numeric range.
static SPECIAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(4[35])\b").unwrap());

/// Numeric shot id embedded in a drone photo filename.
static FILE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"DJI_(\d+)").unwrap());

/// Collect every marker-shaped substring from one region's OCR text,
/// in pattern order: bare numbers, letter pairs, then 43/45.
pub fn extract_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for pattern in [&*NUMBER_PATTERN, &*LETTER_PATTERN, &*SPECIAL_PATTERN] {
        for m in pattern.find_iter(text) {
            tokens.push(m.as_str().to_string());
        }
    }
    tokens
}

/// Pick the best candidate from all regions: any token containing a letter
/// wins (alphanumerics misread less often than bare digits), otherwise the
/// first token in scan order.
pub fn choose_token(candidates: &[String]) -> Option<&str> {
    candidates
        .iter()
        .find(|c| c.chars().any(|ch| ch.is_alphabetic()))
        .or_else(|| candidates.first())
        .map(String::as_str)
}

/// How one file-id range maps to a marker.
enum SequenceRule {
    /// Marker is `id - offset`, rendered as a bare number.
    Offset(u32),
    /// Marker is a fixed literal.
    Literal(&'static str),
    /// Letters B..J, each paired with `11 + index` within the range.
    LetterSeries,
}

/// The deployment's shoot sequence, evaluated first-match in order.
/// 564 is deliberately unmapped and the 534/535 offsets differ; both are
/// carried over verbatim from the recorded sequence.
const FLIGHT_SEQUENCE: &[(u32, u32, SequenceRule)] = &[
    (535, 543, SequenceRule::Offset(534)),
    (544, 544, SequenceRule::Literal("A41")),
    (545, 553, SequenceRule::LetterSeries),
    (554, 554, SequenceRule::Literal("45")),
    (555, 563, SequenceRule::Offset(534)),
    (565, 565, SequenceRule::Literal("43")),
    (566, 574, SequenceRule::Offset(535)),
];

const SERIES_LETTERS: [char; 9] = ['B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Map a shot id through the flight sequence; `None` outside all ranges.
pub fn marker_for_file_id(file_id: u32) -> Option<Marker> {
    for (start, end, rule) in FLIGHT_SEQUENCE {
        if (*start..=*end).contains(&file_id) {
            let raw = match rule {
                SequenceRule::Offset(offset) => (file_id - offset).to_string(),
                SequenceRule::Literal(s) => (*s).to_string(),
                SequenceRule::LetterSeries => {
                    let idx = (file_id - start) as usize;
                    format!("{}{}", SERIES_LETTERS[idx], 11 + idx)
                }
            };
            return Some(Marker::parse(&raw));
        }
    }
    None
}

/// Pull the numeric shot id out of a filename like "DJI_0544.jpg".
pub fn file_id_from_name(filename: &str) -> Option<u32> {
    FILE_ID_PATTERN
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_numbers_up_to_39() {
        assert_eq!(extract_tokens("marker 7 here"), vec!["7"]);
        assert_eq!(extract_tokens("31 and 39"), vec!["31", "39"]);
        // 40 is outside the bare-number band and 43 only matches the
        // special pattern.
        assert_eq!(extract_tokens("40"), Vec::<String>::new());
        assert_eq!(extract_tokens("43"), vec!["43"]);
        assert_eq!(extract_tokens("45"), vec!["45"]);
    }

    #[test]
    fn extracts_letter_pairs() {
        assert_eq!(extract_tokens("B11"), vec!["B11"]);
        assert_eq!(extract_tokens("A41 noise"), vec!["A41"]);
        // K is past the letter band.
        assert_eq!(extract_tokens("K12"), Vec::<String>::new());
    }

    #[test]
    fn word_boundaries_reject_embedded_digits() {
        assert_eq!(extract_tokens("1234"), Vec::<String>::new());
        assert_eq!(extract_tokens("x27x"), Vec::<String>::new());
    }

    #[test]
    fn letter_candidates_win_over_numbers() {
        let candidates = vec!["5".to_string(), "B11".to_string(), "7".to_string()];
        assert_eq!(choose_token(&candidates), Some("B11"));
    }

    #[test]
    fn first_numeric_wins_without_letters() {
        let candidates = vec!["5".to_string(), "7".to_string()];
        assert_eq!(choose_token(&candidates), Some("5"));
        assert_eq!(choose_token(&[]), None);
    }

    #[test]
    fn flight_sequence_first_leg() {
        assert_eq!(marker_for_file_id(535), Some(Marker::Numeric(1)));
        assert_eq!(marker_for_file_id(543), Some(Marker::Numeric(9)));
        assert_eq!(marker_for_file_id(544), Some(Marker::parse("A41")));
    }

    #[test]
    fn flight_sequence_letter_series() {
        assert_eq!(marker_for_file_id(545), Some(Marker::parse("B11")));
        assert_eq!(marker_for_file_id(549), Some(Marker::parse("F15")));
        assert_eq!(marker_for_file_id(553), Some(Marker::parse("J19")));
    }

    #[test]
    fn flight_sequence_return_legs() {
        assert_eq!(marker_for_file_id(554), Some(Marker::Numeric(45)));
        assert_eq!(marker_for_file_id(555), Some(Marker::Numeric(21)));
        assert_eq!(marker_for_file_id(563), Some(Marker::Numeric(29)));
        assert_eq!(marker_for_file_id(565), Some(Marker::Numeric(43)));
        assert_eq!(marker_for_file_id(566), Some(Marker::Numeric(31)));
        assert_eq!(marker_for_file_id(574), Some(Marker::Numeric(39)));
    }

    #[test]
    fn flight_sequence_gaps_stay_unmapped() {
        assert_eq!(marker_for_file_id(534), None);
        assert_eq!(marker_for_file_id(564), None);
        assert_eq!(marker_for_file_id(575), None);
    }

    #[test]
    fn file_id_parses_with_leading_zeros() {
        assert_eq!(file_id_from_name("DJI_0544.jpg"), Some(544));
        assert_eq!(file_id_from_name("DJI_535.png"), Some(535));
        assert_eq!(file_id_from_name("IMG_0544.jpg"), None);
    }
}
