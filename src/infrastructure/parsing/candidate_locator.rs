//! Locates candidate review-text nodes in a parsed document.

use scraper::{ElementRef, Html};

use crate::infrastructure::site_config::CompiledMatchRule;

/// All elements matching the candidate rule, in document order. A document
/// with no matches yields an empty iterator — that is a valid outcome, not
/// an error.
pub fn locate<'a>(
    document: &'a Html,
    rule: &'a CompiledMatchRule,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    document
        .select(&rule.selector)
        .filter(move |element| rule.attrs_match(*element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::site_config::presets;

    #[test]
    fn matches_tag_with_exact_and_pattern_attrs() {
        let config = presets::yelp().compile().unwrap();
        let doc = Html::parse_document(
            r#"<html><body>
                <span lang="en" class="raw__123">first</span>
                <span lang="de" class="raw__123">wrong lang</span>
                <span lang="en" class="other">wrong class</span>
                <div lang="en" class="raw__123">wrong tag</div>
                <span lang="en" class="raw__456">second</span>
            </body></html>"#,
        );
        let texts: Vec<String> = locate(&doc, &config.candidate_rule)
            .map(|el| el.text().collect())
            .collect();
        assert_eq!(texts, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn empty_document_yields_no_candidates() {
        let config = presets::yelp().compile().unwrap();
        let doc = Html::parse_document("<html><body><p>no reviews here</p></body></html>");
        assert_eq!(locate(&doc, &config.candidate_rule).count(), 0);
    }
}
