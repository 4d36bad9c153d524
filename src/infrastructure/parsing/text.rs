//! Text flattening over parsed elements.

use scraper::ElementRef;

/// All text under the element, each chunk trimmed, concatenated without a
/// separator. Used for review text and usernames, where inter-element
/// whitespace is noise.
pub fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// All text under the element, each chunk trimmed, joined with single
/// spaces. This is the haystack the text-pattern field rules search.
pub fn joined_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_div(document: &Html) -> ElementRef<'_> {
        let selector = scraper::Selector::parse("div").unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn collapsed_text_drops_markup_whitespace() {
        let doc = Html::parse_document("<div>  Great <b>show</b>\n  indeed  </div>");
        assert_eq!(collapsed_text(first_div(&doc)), "Greatshowindeed");
    }

    #[test]
    fn joined_text_separates_chunks_with_spaces() {
        let doc = Html::parse_document("<div><span>Alice</span><span>Austin, TX</span></div>");
        assert_eq!(joined_text(first_div(&doc)), "Alice Austin, TX");
    }
}
