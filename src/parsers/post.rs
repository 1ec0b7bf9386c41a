use crate::parsers::PostSelectors;
use crate::results::ExtractedRecord;
use scraper::{ElementRef, Html, Selector};

/// Extracts the title and body of a post.
///
/// Feedback containers are detached from the tree before any text is read,
/// so their text never reaches the body. Missing elements give `None`.
pub fn parse(html: &str, url: &str, selectors: &PostSelectors) -> ExtractedRecord {
    let mut doc = Html::parse_document(html);

    let removed = remove_matching(&mut doc, &selectors.feedback);
    if removed > 0 {
        ::log::debug!("Removed {} feedback container(s) from {}", removed, url);
    }

    ExtractedRecord {
        url: url.to_string(),
        title: first_text(&doc, &selectors.title),
        content: first_text(&doc, &selectors.content),
        error: None,
    }
}

/// Detaches every element matching `selector` and returns how many were removed
pub fn remove_matching(doc: &mut Html, selector: &Selector) -> usize {
    let ids = doc
        .root_element()
        .select(selector)
        .map(|e| e.id())
        .collect::<Vec<_>>();

    for id in &ids {
        if let Some(mut node) = doc.tree.get_mut(*id) {
            node.detach();
        }
    }

    ids.len()
}

/// Only searches the attached tree; `Html::select` would still see detached nodes
fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.root_element().select(selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
