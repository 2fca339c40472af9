use scraper::ElementRef;

/// Each text node trimmed, empty ones dropped, joined with no separator.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Each text node trimmed, empty ones dropped, joined with single spaces.
pub fn spaced_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn joins_text_nodes_with_and_without_separator() {
        let html = Html::parse_fragment("<div> <b>$25.00</b>\n <span> Free shipping </span></div>");
        let div = html.select(&Selector::parse("div").unwrap()).next().unwrap();

        assert_eq!(stripped_text(div), "$25.00Free shipping");
        assert_eq!(spaced_text(div), "$25.00 Free shipping");
    }
}
