use scraper::{Html, Node};

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: [&str; 2] = ["script", "style"];

/// Strip all markup from `raw`, returning the visible text in document order.
///
/// The contents of `<script>` and `<style>` elements are dropped along with
/// their tags. Character references are decoded by the HTML parser.
pub fn sanitize_html(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);

    fragment
        .tree
        .root()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) if !node.ancestors().any(|parent| is_hidden(parent.value())) => {
                Some(&**text)
            }
            _ => None,
        })
        .collect()
}

fn is_hidden(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
}

/// Limit `text` to `max_words` whitespace-separated words.
///
/// Words are always rejoined with single spaces. `...` is appended only when
/// words were actually dropped.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() > max_words {
        format!("{}...", words[..max_words].join(" "))
    } else {
        words.join(" ")
    }
}
