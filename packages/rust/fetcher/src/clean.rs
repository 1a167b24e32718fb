//! HTML-to-text cleaning for fetched postings.
//!
//! Chrome-level fidelity is not the goal: we want the visible text a reader
//! would see, with boilerplate containers (scripts, navigation, footers)
//! stripped and whitespace normalized.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

/// Elements whose entire subtree is invisible or boilerplate.
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "footer", "header", "aside",
];

/// Extract visible text from an HTML document and normalize its whitespace.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::new();
    collect_text(doc.root_element(), &mut out);
    tidy_whitespace(&out)
}

/// Depth-first text collection, skipping excluded subtrees.
fn collect_text(el: ElementRef<'_>, out: &mut String) {
    if EXCLUDED_TAGS.contains(&el.value().name()) {
        return;
    }

    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            collect_text(child_el, out);
        } else if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push_str(trimmed);
                out.push('\n');
            }
        }
    }
}

/// Collapse 3+ newlines to 2 and runs of spaces/tabs to one space, then trim.
fn tidy_whitespace(text: &str) -> String {
    static MULTI_NEWLINE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
    static MULTI_SPACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

    let text = MULTI_NEWLINE_RE.replace_all(text, "\n\n");
    let text = MULTI_SPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_boilerplate_elements() {
        let html = r#"<html><head><style>body { color: red; }</style></head><body>
            <nav>Home | Jobs | About</nav>
            <header>MegaJobs</header>
            <main>
                <h1>Data Engineer</h1>
                <p>Build pipelines with Python and SQL.</p>
                <script>track("view");</script>
            </main>
            <aside>Related jobs</aside>
            <footer>© MegaJobs</footer>
        </body></html>"#;

        let text = html_to_text(html);
        assert!(text.contains("Data Engineer"));
        assert!(text.contains("Build pipelines with Python and SQL."));
        assert!(!text.contains("Home | Jobs"));
        assert!(!text.contains("track("));
        assert!(!text.contains("Related jobs"));
        assert!(!text.contains("MegaJobs"));
    }

    #[test]
    fn collapses_whitespace() {
        let html = "<body><p>a</p><p></p><p></p><p></p><p>b\t\t c</p></body>";
        let text = html_to_text(html);
        assert!(!text.contains("\n\n\n"));
        assert!(!text.contains("\t"));
    }

    #[test]
    fn plain_text_survives() {
        let text = html_to_text("just some words");
        assert_eq!(text, "just some words");
    }
}
