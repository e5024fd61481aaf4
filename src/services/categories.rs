use crate::models::CategoriesField;

/// Best-effort conversion of a raw categories field into category names
///
/// Lists pass through untouched. A bracketed string is first read as a
/// list literal (single quotes accepted) and otherwise stripped of brackets
/// and quotes and split on commas. Any other string is split on commas.
/// Names that themselves contain commas or quotes do not survive this.
pub fn parse_categories(raw: &CategoriesField) -> Vec<String> {
    match raw {
        CategoriesField::List(items) => items.clone(),
        CategoriesField::Text(text) => parse_text(text),
        CategoriesField::Missing | CategoriesField::Other(_) => Vec::new(),
    }
}

fn parse_text(text: &str) -> Vec<String> {
    let trimmed = text.trim();

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let normalized = trimmed.replace('\'', "\"");
        if let Ok(items) = serde_json::from_str::<Vec<String>>(&normalized) {
            return items;
        }

        let stripped: String = trimmed[1..trimmed.len() - 1]
            .chars()
            .filter(|c| *c != '\'' && *c != '"')
            .collect();
        return split_commas(&stripped);
    }

    split_commas(trimmed)
}

fn split_commas(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> CategoriesField {
        CategoriesField::Text(s.to_string())
    }

    #[test]
    fn test_list_passes_through() {
        let raw = CategoriesField::List(vec![" Bars ".to_string(), "Pubs".to_string()]);
        assert_eq!(parse_categories(&raw), vec![" Bars ", "Pubs"]);
    }

    #[test]
    fn test_python_list_literal() {
        assert_eq!(
            parse_categories(&text("['Italian', 'Pizza']")),
            vec!["Italian", "Pizza"]
        );
        assert_eq!(
            parse_categories(&text(r#"["Italian", "Pizza"]"#)),
            vec!["Italian", "Pizza"]
        );
    }

    #[test]
    fn test_unparseable_brackets_fall_back_to_split() {
        // The apostrophe breaks the quote normalization
        assert_eq!(
            parse_categories(&text("['Pizza', 'Children's Menu']")),
            vec!["Pizza", "Childrens Menu"]
        );
        assert_eq!(parse_categories(&text("[Bars, Pubs]")), vec!["Bars", "Pubs"]);
    }

    #[test]
    fn test_comma_separated_string() {
        assert_eq!(
            parse_categories(&text("Italian, Pizza")),
            vec!["Italian", "Pizza"]
        );
        assert_eq!(parse_categories(&text("Italian,,Pizza,")), vec!["Italian", "Pizza"]);
    }

    #[test]
    fn test_single_category() {
        assert_eq!(parse_categories(&text("Italian")), vec!["Italian"]);
        assert!(parse_categories(&text("   ")).is_empty());
    }

    #[test]
    fn test_other_shapes_are_empty() {
        assert!(parse_categories(&CategoriesField::Other(json!(42))).is_empty());
        assert!(parse_categories(&CategoriesField::Other(json!({"a": 1}))).is_empty());
        assert!(parse_categories(&CategoriesField::Missing).is_empty());
    }
}
