//! Lexicon-based sentiment scoring for news headlines.

use super::{DataError, DataResult};

/// Words signalling positive tone in financial headlines
const POSITIVE_WORDS: &[&str] = &[
    "gain", "surge", "rally", "jump", "rise", "bull", "strong", "positive", "growth", "profit",
    "record", "beat", "upgrade", "soar",
];

/// Words signalling negative tone in financial headlines
const NEGATIVE_WORDS: &[&str] = &[
    "fall", "drop", "crash", "decline", "bear", "weak", "negative", "loss", "concern", "slump",
    "miss", "downgrade", "plunge",
];

/// Score a piece of text for sentiment polarity in [-1, 1].
/// Blank text cannot be scored and is reported as a validation error so
/// callers can skip the item without dropping the rest of a batch.
pub fn polarity(text: &str) -> DataResult<f64> {
    if text.trim().is_empty() {
        return Err(DataError::validation_error("text", "cannot score empty text"));
    }

    let mut positive_count = 0;
    let mut negative_count = 0;

    for word in text.split_whitespace() {
        let word_lower = word.to_lowercase();
        if POSITIVE_WORDS.iter().any(|&w| word_lower.contains(w)) {
            positive_count += 1;
        }
        if NEGATIVE_WORDS.iter().any(|&w| word_lower.contains(w)) {
            negative_count += 1;
        }
    }

    let total = positive_count + negative_count;
    if total == 0 {
        return Ok(0.0); // Neutral
    }

    Ok((positive_count as f64 - negative_count as f64) / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_headline_scores_one() {
        let score = polarity("Shares rally on strong profit").unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn negative_headline_scores_minus_one() {
        let score = polarity("Stock falls amid heavy loss").unwrap();
        assert_eq!(score, -1.0);
    }

    #[test]
    fn mixed_headline_balances_out() {
        let score = polarity("Profit falls").unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn neutral_headline_scores_zero() {
        let score = polarity("Quarterly report published today").unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn score_stays_in_range() {
        let score = polarity("surge surge surge fall").unwrap();
        assert!((-1.0..=1.0).contains(&score));
        assert_eq!(score, 0.5);
    }

    #[test]
    fn empty_text_is_a_validation_error() {
        assert!(polarity("").is_err());
        assert!(polarity("   ").is_err());
    }
}
