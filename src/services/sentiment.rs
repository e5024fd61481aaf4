use std::collections::{HashMap, HashSet};

use crate::{
    error::AppResult,
    models::{RawReview, SentimentReport, SentimentScores},
};

/// Batch sentiment collaborator
///
/// Must return exactly one report per input text, aligned by position.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze(&self, texts: &[String]) -> AppResult<Vec<SentimentReport>>;

    /// Analyzer name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Mean comparative sentiment per business
///
/// Businesses without reviews are absent from the result; readers treat
/// them as 0.0. A failed or misaligned analyzer batch is logged and scores
/// every business as 0.0.
pub async fn score(analyzer: &dyn SentimentAnalyzer, reviews: &[RawReview]) -> SentimentScores {
    if reviews.is_empty() {
        return SentimentScores::new();
    }

    let texts: Vec<String> = reviews.iter().map(|r| r.text.clone()).collect();
    let reports = match analyzer.analyze(&texts).await {
        Ok(reports) if reports.len() == reviews.len() => reports,
        Ok(reports) => {
            tracing::warn!(
                analyzer = analyzer.name(),
                expected = reviews.len(),
                returned = reports.len(),
                "Sentiment analyzer returned a misaligned batch, scoring as neutral"
            );
            return SentimentScores::new();
        }
        Err(e) => {
            tracing::warn!(
                analyzer = analyzer.name(),
                error = %e,
                "Sentiment analysis failed, scoring as neutral"
            );
            return SentimentScores::new();
        }
    };

    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for (review, report) in reviews.iter().zip(reports.iter()) {
        let entry = totals.entry(review.business_id.as_str()).or_insert((0.0, 0));
        entry.0 += report.comparative;
        entry.1 += 1;
    }

    let scores: SentimentScores = totals
        .into_iter()
        .map(|(id, (sum, count))| (id.to_string(), sum / count as f64))
        .collect();

    tracing::info!(
        analyzer = analyzer.name(),
        reviews = reviews.len(),
        businesses = scores.len(),
        "Scored review sentiment"
    );

    scores
}

/// AFINN-style word scores
const LEXICON: &[(&str, i32)] = &[
    ("amazing", 4),
    ("awesome", 4),
    ("best", 3),
    ("breathtaking", 5),
    ("delicious", 3),
    ("excellent", 3),
    ("fantastic", 4),
    ("fresh", 1),
    ("friendly", 2),
    ("fun", 4),
    ("good", 3),
    ("great", 3),
    ("happy", 3),
    ("helpful", 2),
    ("love", 3),
    ("loved", 3),
    ("lovely", 3),
    ("nice", 3),
    ("outstanding", 5),
    ("perfect", 3),
    ("pleasant", 3),
    ("recommend", 2),
    ("superb", 5),
    ("tasty", 2),
    ("wonderful", 4),
    ("worth", 2),
    ("yummy", 3),
    ("angry", -3),
    ("awful", -3),
    ("bad", -3),
    ("bland", -2),
    ("boring", -3),
    ("broken", -1),
    ("cold", -1),
    ("dirty", -2),
    ("disappointed", -2),
    ("disappointing", -2),
    ("disgusting", -3),
    ("expensive", -1),
    ("gross", -2),
    ("hate", -3),
    ("horrible", -3),
    ("mediocre", -3),
    ("overpriced", -2),
    ("poor", -2),
    ("rude", -2),
    ("sad", -2),
    ("slow", -1),
    ("terrible", -3),
    ("ugly", -3),
    ("unfriendly", -2),
    ("worst", -3),
    ("worse", -3),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "dont", "don't", "didnt", "didn't", "isnt", "isn't", "wasnt", "wasn't",
    "cant", "can't", "wont", "won't",
];

/// Local word-list analyzer
///
/// `comparative` is the summed word score divided by the token count. A
/// scored word directly after a negator counts with flipped sign.
pub struct LexiconSentiment {
    words: HashMap<&'static str, i32>,
    negators: HashSet<&'static str>,
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconSentiment {
    pub fn new() -> Self {
        Self {
            words: LEXICON.iter().copied().collect(),
            negators: NEGATORS.iter().copied().collect(),
        }
    }

    pub fn comparative(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let mut total = 0i32;
        for (i, token) in tokens.iter().enumerate() {
            let Some(&value) = self.words.get(token.as_str()) else {
                continue;
            };
            let negated = i > 0 && self.negators.contains(tokens[i - 1].as_str());
            total += if negated { -value } else { value };
        }

        total as f64 / tokens.len() as f64
    }
}

#[async_trait::async_trait]
impl SentimentAnalyzer for LexiconSentiment {
    async fn analyze(&self, texts: &[String]) -> AppResult<Vec<SentimentReport>> {
        Ok(texts
            .iter()
            .map(|text| SentimentReport {
                comparative: self.comparative(text),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_comparative_is_normalized_by_length() {
        let lexicon = LexiconSentiment::new();
        // good(3) + great(3) over 4 tokens
        assert!((lexicon.comparative("Good food, GREAT staff!") - 1.5).abs() < EPS);
        assert_eq!(lexicon.comparative("the table by the window"), 0.0);
        assert_eq!(lexicon.comparative("   "), 0.0);
    }

    #[test]
    fn test_negation_flips_score() {
        let lexicon = LexiconSentiment::new();
        // -good over 3 tokens
        assert!((lexicon.comparative("not good pizza") + 1.0).abs() < EPS);
    }

    #[tokio::test]
    async fn test_score_averages_per_business() {
        let reviews = vec![
            RawReview::new("r1", "X", "great"),
            RawReview::new("r2", "Y", "terrible"),
            RawReview::new("r3", "X", "fine food"),
        ];

        let scores = score(&LexiconSentiment::new(), &reviews).await;

        // X: (3/1 + 0/2) / 2
        assert!((scores["X"] - 1.5).abs() < EPS);
        assert!((scores["Y"] + 3.0).abs() < EPS);
        assert!(!scores.contains_key("Z"));
    }

    #[tokio::test]
    async fn test_score_uses_one_batched_call() {
        let mut analyzer = MockSentimentAnalyzer::new();
        analyzer
            .expect_analyze()
            .times(1)
            .withf(|texts: &[String]| texts.len() == 3)
            .returning(|texts| {
                Ok(texts
                    .iter()
                    .map(|t| SentimentReport {
                        comparative: t.len() as f64,
                    })
                    .collect())
            });
        analyzer.expect_name().return_const("mock");

        let reviews = vec![
            RawReview::new("r1", "A", "ab"),
            RawReview::new("r2", "A", "abcd"),
            RawReview::new("r3", "B", "a"),
        ];
        let scores = score(&analyzer, &reviews).await;

        assert!((scores["A"] - 3.0).abs() < EPS);
        assert!((scores["B"] - 1.0).abs() < EPS);
    }

    #[tokio::test]
    async fn test_misaligned_reports_score_as_neutral() {
        let mut analyzer = MockSentimentAnalyzer::new();
        analyzer.expect_analyze().returning(|_| Ok(vec![]));
        analyzer.expect_name().return_const("mock");

        let reviews = vec![RawReview::new("r1", "A", "good")];
        let scores = score(&analyzer, &reviews).await;

        assert!(scores.is_empty());
    }

    #[tokio::test]
    async fn test_analyzer_error_scores_as_neutral() {
        let mut analyzer = MockSentimentAnalyzer::new();
        analyzer
            .expect_analyze()
            .times(1)
            .returning(|_| Err(crate::error::AppError::ExternalApi("timeout".to_string())));
        analyzer.expect_name().return_const("mock");

        let reviews = vec![
            RawReview::new("r1", "A", "great"),
            RawReview::new("r2", "B", "awful"),
        ];
        let scores = score(&analyzer, &reviews).await;

        assert_eq!(scores.get("A").copied().unwrap_or(0.0), 0.0);
        assert_eq!(scores.get("B").copied().unwrap_or(0.0), 0.0);
    }

    #[tokio::test]
    async fn test_no_reviews_skips_analyzer() {
        let analyzer = MockSentimentAnalyzer::new();
        let scores = score(&analyzer, &[]).await;
        assert!(scores.is_empty());
    }
}
