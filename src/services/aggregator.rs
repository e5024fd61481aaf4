use crate::models::{AggregatedText, RawReview};

/// Concatenates each business's review texts, space separated, in input order
pub fn aggregate(reviews: &[RawReview]) -> AggregatedText {
    let mut aggregated = AggregatedText::new();

    for review in reviews {
        aggregated
            .entry(review.business_id.clone())
            .and_modify(|text: &mut String| {
                text.push(' ');
                text.push_str(&review.text);
            })
            .or_insert_with(|| review.text.clone());
    }

    tracing::info!(
        reviews = reviews.len(),
        businesses = aggregated.len(),
        "Aggregated review text"
    );

    aggregated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_texts_in_order() {
        let reviews = vec![
            RawReview::new("r1", "X", "good"),
            RawReview::new("r2", "Y", "meh"),
            RawReview::new("r3", "X", "food"),
        ];

        let aggregated = aggregate(&reviews);

        assert_eq!(aggregated["X"], "good food");
        assert_eq!(aggregated["Y"], "meh");
        assert_eq!(aggregated.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }
}
