//! Numeric token extraction from raw text.
//!
//! Both tokenization policies used by the analysis modes live here. The
//! structured policy isolates number-shaped substrings with a shared
//! regex; the whitespace policy is the lower-confidence fallback used by
//! raw-token mode, where every whitespace-delimited word is treated as a
//! candidate and non-numeric words simply classify to the invalid digit
//! class downstream.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches a word-boundary-delimited run of ASCII digits with an optional
/// fractional part. No sign, no thousands separators; a leading `-` is
/// not part of the token.
static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(\.\d*)?\b").expect("number pattern is valid"));

/// Tokenization policy applied to a text payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPolicy {
    /// Extract substrings matching `\b\d+(\.\d*)?\b`, in order of
    /// appearance. Used by structured-number analysis.
    NumberPattern,
    /// Split on runs of whitespace and discard empty results. Used by
    /// raw-token analysis.
    Whitespace,
}

/// Extracts numeric tokens from `text` according to `policy`.
///
/// Returns tokens in left-to-right order of appearance. Empty input
/// yields an empty vector. Leading zeros are preserved; stripping them
/// is the classifier's job.
pub fn extract_tokens(text: &str, policy: TokenPolicy) -> Vec<String> {
    match policy {
        TokenPolicy::NumberPattern => NUMBER_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
        TokenPolicy::Whitespace => text
            .split_whitespace()
            .map(|s| s.to_string())
            .collect(),
    }
}

/// Parses extracted tokens into floating-point magnitudes, discarding
/// anything that does not parse or is not finite.
///
/// The compliance gate operates on these magnitudes, not on the raw
/// token strings.
pub fn parse_magnitudes(tokens: &[String]) -> Vec<f64> {
    tokens
        .iter()
        .filter_map(|t| t.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_pattern_basic() {
        let tokens = extract_tokens("Value: 123.45 and -67", TokenPolicy::NumberPattern);
        assert_eq!(tokens, vec!["123.45", "67"]);
    }

    #[test]
    fn test_number_pattern_preserves_leading_zeros() {
        let tokens = extract_tokens("code 00230 end", TokenPolicy::NumberPattern);
        assert_eq!(tokens, vec!["00230"]);
    }

    #[test]
    fn test_number_pattern_trailing_dot() {
        // The fractional part is optional and a bare trailing dot is not
        // word-bounded, so "3." yields "3".
        let tokens = extract_tokens("about 3. then 4.5", TokenPolicy::NumberPattern);
        assert_eq!(tokens, vec!["3", "4.5"]);
    }

    #[test]
    fn test_number_pattern_empty_input() {
        assert!(extract_tokens("", TokenPolicy::NumberPattern).is_empty());
        assert!(extract_tokens("no digits here", TokenPolicy::NumberPattern).is_empty());
    }

    #[test]
    fn test_number_pattern_order_of_appearance() {
        let tokens = extract_tokens("9 then 1 then 55", TokenPolicy::NumberPattern);
        assert_eq!(tokens, vec!["9", "1", "55"]);
    }

    #[test]
    fn test_whitespace_policy_discards_empties() {
        let tokens = extract_tokens("  12   abc\t\n7.5  ", TokenPolicy::Whitespace);
        assert_eq!(tokens, vec!["12", "abc", "7.5"]);
    }

    #[test]
    fn test_whitespace_policy_empty_input() {
        assert!(extract_tokens("   \t\n ", TokenPolicy::Whitespace).is_empty());
    }

    #[test]
    fn test_parse_magnitudes_discards_non_numeric() {
        let tokens: Vec<String> = ["12", "abc", "0.5", "NaN", "inf"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(parse_magnitudes(&tokens), vec![12.0, 0.5]);
    }
}
