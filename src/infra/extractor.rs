use scraper::{Html, Selector};

use crate::app::ports::TextExtractorPort;

/// Boilerplate-removal adapter built on the `scraper` crate: keeps the text
/// of `<p>` elements and drops everything else (navigation, headers,
/// archive banners live outside paragraph content on the raw captures this
/// crate feeds it).
pub struct ParagraphExtractor;

impl TextExtractorPort for ParagraphExtractor {
    fn extract(&self, html: &[u8]) -> Result<Vec<String>, String> {
        let text = std::str::from_utf8(html)
            .map_err(|e| format!("content is not valid UTF-8: {e}"))?;
        let selector = Selector::parse("p").map_err(|e| format!("{e:?}"))?;

        let document = Html::parse_document(text);
        let mut paragraphs = Vec::new();
        for element in document.select(&selector) {
            let joined = element.text().collect::<Vec<_>>().join(" ");
            let trimmed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
            if !trimmed.is_empty() {
                paragraphs.push(trimmed);
            }
        }
        Ok(paragraphs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_paragraph_text_and_drops_chrome() {
        let html = b"<html><body><nav>site nav</nav>\
            <p>First  paragraph.</p><p>Second <b>bold</b> paragraph.</p>\
            <footer>footer</footer></body></html>";
        let paragraphs = ParagraphExtractor.extract(html).unwrap();
        assert_eq!(
            paragraphs,
            vec!["First paragraph.".to_string(), "Second bold paragraph.".to_string()]
        );
    }

    #[test]
    fn non_utf8_content_is_an_error() {
        assert!(ParagraphExtractor.extract(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn empty_documents_yield_no_paragraphs() {
        assert!(ParagraphExtractor.extract(b"<html></html>").unwrap().is_empty());
    }
}
