/// Sampling temperature for sentiment classification. Low for stable labels.
pub const SENTIMENT_TEMPERATURE: f64 = 0.1;

/// Build the classification prompt for one healed review.
pub fn build_sentiment_prompt(review_text: &str) -> String {
    format!(
        r#"Analyze sentiment as POSITIVE, NEGATIVE, or NEUTRAL.
Review: "{review_text}"
Reply ONLY as JSON:
{{"sentiment":"POSITIVE","confidence":0.95}}"#
    )
}
