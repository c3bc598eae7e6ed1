//! Leading-digit classification and frequency accounting.
//!
//! The classifier is a total function: any string input maps to a digit
//! class 0–9, where 0 is the sentinel for "no leading significant digit"
//! (all zeros, empty, or non-numeric). It never fails.

use serde::{Deserialize, Serialize};

/// Number of digit classes tracked: slot 0 is the invalid sentinel,
/// slots 1–9 are leading significant digits.
pub const DIGIT_CLASSES: usize = 10;

/// Returns the leading significant digit of a token as 1–9, or 0 when
/// the token has none.
///
/// Leading `'0'` characters are stripped, then the remainder is scanned
/// left to right for the first character in `'1'..='9'`. Non-digit
/// characters do not stop the scan; a token like `"abc5def"` classifies
/// to 5. In practice the extractor only hands this function digit runs,
/// but the function is total either way.
pub fn leading_digit(token: &str) -> u8 {
    for ch in token.trim_start_matches('0').chars() {
        if ('1'..='9').contains(&ch) {
            return ch as u8 - b'0';
        }
    }
    0
}

/// Returns the leading significant digit of a numeric magnitude.
///
/// The value is classified via its decimal string form, so `0.00456`
/// classifies to 4 and `-230.0` to 2. Non-finite values classify to the
/// invalid sentinel.
pub fn leading_digit_of(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    leading_digit(&format!("{value}"))
}

/// Fixed-size histogram of leading-digit frequencies for one analysis run.
///
/// Slot 0 counts tokens with no leading digit 1–9; slots 1–9 count
/// tokens by leading digit. The sum of all ten slots always equals the
/// number of tokens recorded since the last reset. Counts only ever
/// increase within a run; [`DigitHistogram::reset`] starts a new run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitHistogram {
    counts: [u64; DIGIT_CLASSES],
}

impl DigitHistogram {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes all ten slots. Called once per new analysis run.
    pub fn reset(&mut self) {
        self.counts = [0; DIGIT_CLASSES];
    }

    /// Classifies `token` and increments the matching slot.
    pub fn record(&mut self, token: &str) {
        self.counts[leading_digit(token) as usize] += 1;
    }

    /// Classifies a numeric magnitude and increments the matching slot.
    pub fn record_value(&mut self, value: f64) {
        self.counts[leading_digit_of(value) as usize] += 1;
    }

    /// Returns a read-only view of all ten slots.
    pub fn counts(&self) -> &[u64; DIGIT_CLASSES] {
        &self.counts
    }

    /// Returns an owned copy of the current state for event payloads.
    pub fn snapshot(&self) -> DigitHistogram {
        self.clone()
    }

    /// Count of tokens that classified to a leading digit 1–9.
    pub fn total_valid(&self) -> u64 {
        self.counts[1..].iter().sum()
    }

    /// Count of all recorded tokens, including the invalid class.
    pub fn total_recorded(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Count of tokens in the invalid sentinel slot.
    pub fn invalid_count(&self) -> u64 {
        self.counts[0]
    }

    /// Count for a single digit class 1–9.
    ///
    /// Returns 0 for digits outside 1–9 rather than panicking.
    pub fn count_for(&self, digit: u8) -> u64 {
        if (1..=9).contains(&digit) {
            self.counts[digit as usize]
        } else {
            0
        }
    }

    /// Observed percentage of each digit 1–9 among valid tokens.
    ///
    /// All entries are 0.0 when no valid tokens have been recorded,
    /// avoiding a division by zero.
    pub fn percentages(&self) -> [f64; 9] {
        let total = self.total_valid();
        let mut out = [0.0; 9];
        if total == 0 {
            return out;
        }
        for (i, slot) in self.counts[1..].iter().enumerate() {
            out[i] = *slot as f64 * 100.0 / total as f64;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_digit_strips_leading_zeros() {
        assert_eq!(leading_digit("00230"), 2);
    }

    #[test]
    fn test_leading_digit_all_zeros_is_invalid() {
        assert_eq!(leading_digit("0"), 0);
        assert_eq!(leading_digit("000"), 0);
    }

    #[test]
    fn test_leading_digit_empty_is_invalid() {
        assert_eq!(leading_digit(""), 0);
    }

    #[test]
    fn test_leading_digit_scans_past_non_digits() {
        assert_eq!(leading_digit("abc5def"), 5);
        assert_eq!(leading_digit("abc"), 0);
    }

    #[test]
    fn test_leading_digit_fractional() {
        assert_eq!(leading_digit("0.0042"), 4);
        assert_eq!(leading_digit("123.45"), 1);
    }

    #[test]
    fn test_leading_digit_of_values() {
        assert_eq!(leading_digit_of(0.00456), 4);
        assert_eq!(leading_digit_of(-230.0), 2);
        assert_eq!(leading_digit_of(0.0), 0);
        assert_eq!(leading_digit_of(f64::NAN), 0);
        assert_eq!(leading_digit_of(f64::INFINITY), 0);
    }

    #[test]
    fn test_histogram_sum_invariant() {
        let mut hist = DigitHistogram::new();
        for token in ["123", "0", "987", "abc", "0.5"] {
            hist.record(token);
        }
        assert_eq!(hist.total_recorded(), 5);
        assert_eq!(hist.total_valid(), 3);
        assert_eq!(hist.invalid_count(), 2);
    }

    #[test]
    fn test_histogram_reset() {
        let mut hist = DigitHistogram::new();
        hist.record("42");
        hist.reset();
        assert_eq!(hist.total_recorded(), 0);
        assert_eq!(*hist.counts(), [0; DIGIT_CLASSES]);
    }

    #[test]
    fn test_percentages_zero_when_empty() {
        let mut hist = DigitHistogram::new();
        hist.record("0");
        assert_eq!(hist.percentages(), [0.0; 9]);
    }

    #[test]
    fn test_percentages_exclude_invalid_slot() {
        let mut hist = DigitHistogram::new();
        hist.record("1");
        hist.record("1");
        hist.record("2");
        hist.record("0"); // invalid, excluded from the denominator
        let pct = hist.percentages();
        assert!((pct[0] - 66.666).abs() < 0.01);
        assert!((pct[1] - 33.333).abs() < 0.01);
    }
}
