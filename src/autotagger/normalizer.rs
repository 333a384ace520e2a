use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("normalizer patterns are valid")
}

/// Elements removed together with their contents.
const DROPPED_ELEMENTS: [&str; 5] = ["script", "style", "pre", "code", "figure"];

/// Inline elements replaced by their inner text.
const UNWRAPPED_ELEMENTS: [&str; 14] = [
    "dd",
    "a",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "p",
    "small",
    "b",
    "i",
    "blockquote",
    "li",
];

static DROPPED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DROPPED_ELEMENTS
        .iter()
        .map(|tag| compile(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")))
        .collect()
});

static UNWRAPPED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    UNWRAPPED_ELEMENTS
        .iter()
        .map(|tag| compile(&format!(r"(?is)<{tag}(?:\s[^>]*)?>(.*?)</{tag}\s*>")))
        .collect()
});

static HTML_COMMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<!--.*?-->"));
static VOID_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)<(?:img|hr|br)\b[^>]*>"));
static BLOCK_TAG: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)</?(?:dt|a|ul|ol)(?:\s[^>]*)?>"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"<[^>]+?>"));
static FOOTNOTE_MARKER: LazyLock<Regex> = LazyLock::new(|| compile(r"\[\d+\]"));
static SINGLE_QUOTE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"&(?:#8217|#8216|#39|rsquo|lsquo|apos);"));
static DOUBLE_QUOTE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"&(?:#8220|#8221|#34|ldquo|rdquo|quot);"));
static ANY_ENTITY: LazyLock<Regex> = LazyLock::new(|| compile(r"&#?\w+;"));
static HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"[ \t]{2,}"));

static LIQUID_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)\{%.*?%\}"));
static FOOTNOTE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)\[\^.+?\](?::\s.*?$)?"));
static REFERENCE_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^[ \t]{0,3}\[[^\]\n]*\]:[ \t]+.*?$"));
static IMAGE_LINK: LazyLock<Regex> = LazyLock::new(|| compile(r"!\[[^\]\n]*?\][\[(].*?[\])]"));
static INLINE_LINK: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\[([^\]\n]*?)\][\[(][^\])\n]*?[\])]"));
static HEADING: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^#{1,6}[ \t]*"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| compile(r"\*\*(\S.*?\S|\S)\*\*"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| compile(r"\*(\S.*?\S|\S)\*"));
static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)`{3,}(.*?)`{3,}"));
static HORIZONTAL_RULE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^-{3,}[ \t]*$"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"`([^`\n]+)`"));
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| compile(r"\n(?:[ \t]*\n)+"));

static URL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(?:https?://)?[\da-z.-]+\.[a-z.]{2,6}[/\w.-]*/?"));

/// Reduces post bodies to plain prose for word-frequency analysis.
///
/// HTML is stripped before Markdown because Markdown syntax can surface
/// inside elements that were unwrapped in the HTML pass. URLs go last.
pub struct TextNormalizer;

impl TextNormalizer {
    /// Strips HTML, Markdown/Liquid syntax, and URLs, then trims the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use jtag::autotagger::TextNormalizer;
    ///
    /// let text = "<p>Read **more** about [Rust](https://rust-lang.org) \
    ///             at https://example.com/blog</p>";
    /// assert_eq!(TextNormalizer::normalize(text), "Read more about Rust at");
    /// ```
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        let text = Self::strip_tags(raw);
        let text = Self::strip_markdown(&text);
        let text = Self::strip_urls(text.trim());
        text.trim().to_string()
    }

    /// Removes HTML markup and entities, leaving the readable text.
    #[must_use]
    pub fn strip_tags(raw: &str) -> String {
        let mut text = raw.to_string();

        for pattern in DROPPED.iter() {
            text = replace(pattern, &text, "");
        }
        text = replace(&HTML_COMMENT, &text, "");
        text = replace(&VOID_TAG, &text, " ");
        for pattern in UNWRAPPED.iter() {
            text = replace(pattern, &text, " ${1} ");
        }
        text = replace(&BLOCK_TAG, &text, " ");
        text = replace(&ANY_TAG, &text, "");
        text = replace(&FOOTNOTE_MARKER, &text, "");

        text = replace(&SINGLE_QUOTE_ENTITY, &text, "'");
        text = replace(&DOUBLE_QUOTE_ENTITY, &text, "\"");
        text = replace(&ANY_ENTITY, &text, " ");
        text = text
            .replace(['\u{2018}', '\u{2019}', '\u{02BC}'], "'")
            .replace(['\u{201C}', '\u{201D}', '\u{02EE}'], "\"");

        replace(&HORIZONTAL_SPACE, text.trim_start(), " ")
    }

    /// Removes Markdown and Liquid syntax, keeping link, emphasis, and code text.
    #[must_use]
    pub fn strip_markdown(text: &str) -> String {
        let text = replace(&LIQUID_TAG, text, "");
        let text = replace(&FOOTNOTE, &text, "");
        let text = replace(&REFERENCE_DEFINITION, &text, "");
        let text = replace(&IMAGE_LINK, &text, "");
        let text = replace(&INLINE_LINK, &text, "${1}");
        let text = replace(&HEADING, &text, "");
        let text = replace(&BOLD, &text, "${1}");
        let text = replace(&ITALIC, &text, "${1}");
        let text = replace(&FENCED_CODE, &text, "${1}");
        let text = replace(&HORIZONTAL_RULE, &text, "");
        let text = replace(&INLINE_CODE, &text, "${1}");
        replace(&BLANK_LINES, &text, "\n\n")
    }

    /// Deletes bare and scheme-prefixed URLs.
    #[must_use]
    pub fn strip_urls(text: &str) -> String {
        replace(&URL, text, "")
    }
}

fn replace(pattern: &Regex, text: &str, replacement: &str) -> String {
    match pattern.replace_all(text, replacement) {
        Cow::Borrowed(unchanged) => unchanged.to_string(),
        Cow::Owned(changed) => changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_script_style_and_code_blocks_with_contents() {
        let html = "before <script type=\"text/javascript\">var x = 1;</script> middle \
                    <pre><code>fn main() {}</code></pre> after <STYLE>p { color: red }</STYLE>";
        assert_eq!(TextNormalizer::strip_tags(html), "before middle after ");
    }

    #[test]
    fn removes_comments_and_void_tags() {
        let html = "one<!-- hidden\ncomment -->two<br/>three<img src=\"a.png\">four";
        assert_eq!(TextNormalizer::strip_tags(html), "onetwo three four");
    }

    #[test]
    fn unwraps_inline_elements_keeping_text() {
        let html = "<p>Hello <b>bold</b> and <a href=\"/x\">linked</a> words</p>";
        let stripped = TextNormalizer::strip_tags(html);
        let words: Vec<_> = stripped.split_whitespace().collect();
        assert_eq!(words, ["Hello", "bold", "and", "linked", "words"]);
    }

    #[test]
    fn removes_list_wrappers_and_unknown_tags() {
        let html = "<ul><li>first</li><li>second</li></ul><span class=\"x\">third</span>";
        let stripped = TextNormalizer::strip_tags(html);
        let words: Vec<_> = stripped.split_whitespace().collect();
        assert_eq!(words, ["first", "second", "third"]);
    }

    #[test]
    fn maps_quote_entities_and_blanks_others() {
        assert_eq!(
            TextNormalizer::strip_tags("it&#8217;s &quot;fine&quot; &amp; done[1]"),
            "it's \"fine\" done"
        );
        assert_eq!(
            TextNormalizer::strip_tags("\u{201C}smart\u{201D} don\u{2019}t"),
            "\"smart\" don't"
        );
    }

    #[test]
    fn strips_liquid_tags_and_footnotes() {
        let md = "Intro {% include note.html %} text[^1] here.\n\n[^1]: The footnote body";
        let stripped = TextNormalizer::strip_markdown(md);
        assert!(!stripped.contains("include"));
        assert!(!stripped.contains("footnote body"));
        assert!(stripped.contains("Intro"));
        assert!(stripped.contains("here."));
    }

    #[test]
    fn keeps_link_text_and_drops_images() {
        let md = "See ![diagram](img/d.png) the [docs](http://example.com/docs) and [ref][1].\n\
                  [1]: http://example.com/ref";
        let stripped = TextNormalizer::strip_markdown(md);
        assert_eq!(stripped.trim(), "See  the docs and ref.");
    }

    #[test]
    fn strips_headings_emphasis_and_code() {
        let md = "## Heading\n**bold** and *italic* with `inline` code\n\n\
                  ```rust\nlet x = 1;\n```\n---\n";
        let stripped = TextNormalizer::strip_markdown(md);
        assert!(stripped.starts_with("Heading\nbold and italic with inline code"));
        assert!(stripped.contains("let x = 1;"));
        assert!(!stripped.contains('`'));
        assert!(!stripped.contains("---"));
        assert!(!stripped.contains('*'));
    }

    #[test]
    fn collapses_runs_of_blank_lines() {
        let stripped = TextNormalizer::strip_markdown("one\n\n\n\ntwo\n  \n\nthree");
        assert_eq!(stripped, "one\n\ntwo\n\nthree");
    }

    #[test]
    fn strips_bare_and_prefixed_urls() {
        let text = "visit https://brettterpstra.com/projects/jtag/ or example.org today";
        assert_eq!(TextNormalizer::strip_urls(text), "visit  or  today");
    }

    #[test]
    fn normalize_runs_full_pipeline_and_trims() {
        let raw = "  <h2>Title</h2>\n\nSome **productivity** tips from http://example.com  ";
        assert_eq!(TextNormalizer::normalize(raw), "Title \n\nSome productivity tips from");
    }
}
