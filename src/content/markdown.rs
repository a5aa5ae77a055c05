//! Markdown rendering with optional syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::helpers::html_escape;

const MORE_MARKER: &str = "<!-- more -->";

/// Markdown renderer
///
/// Code fences are emitted as escaped literal text. With highlighting
/// enabled the same text is coloured by syntect, never interpreted.
pub struct MarkdownRenderer {
    highlighter: Option<Highlighter>,
}

struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl MarkdownRenderer {
    /// Create a renderer without highlighting
    pub fn new() -> Self {
        Self { highlighter: None }
    }

    /// Create from the site's highlight settings
    pub fn with_options(config: &HighlightConfig) -> Self {
        if !config.enable {
            return Self::new();
        }

        let mut theme_set = ThemeSet::load_defaults();
        let theme = match theme_set.themes.remove(&config.theme) {
            Some(theme) => theme,
            None => {
                tracing::warn!(
                    "Unknown highlight theme {:?}, falling back to base16-ocean.dark",
                    config.theme
                );
                match theme_set.themes.remove("base16-ocean.dark") {
                    Some(theme) => theme,
                    None => return Self::new(),
                }
            }
        };

        Self {
            highlighter: Some(Highlighter {
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme,
            }),
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Front-matter is stripped before rendering, so no metadata blocks
        let parser = Parser::new_ext(markdown, markdown_options());

        let mut events: Vec<Event> = Vec::new();
        // (language, literal body) of the fence being collected
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|lang| lang.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let html = self.render_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Render a fenced or indented code block
    fn render_code(&self, code: &str, lang: Option<&str>) -> String {
        let class = lang
            .map(|l| format!(r#" class="language-{}""#, html_escape(l)))
            .unwrap_or_default();

        if let (Some(highlighter), Some(lang)) = (&self.highlighter, lang) {
            if let Some(syntax) = highlighter
                .syntax_set
                .find_syntax_by_token(lang)
                .or_else(|| highlighter.syntax_set.find_syntax_by_extension(lang))
            {
                match highlighted_html_for_string(
                    code,
                    &highlighter.syntax_set,
                    syntax,
                    &highlighter.theme,
                ) {
                    Ok(highlighted) => {
                        return format!(
                            "<figure class=\"highlight {}\">{}</figure>\n",
                            html_escape(lang),
                            highlighted
                        );
                    }
                    Err(e) => {
                        tracing::debug!("Highlighting {} failed, using plain block: {}", lang, e);
                    }
                }
            }
        }

        format!("<pre><code{}>{}</code></pre>\n", class, html_escape(code))
    }

    /// Split content at the `<!-- more -->` marker
    ///
    /// Returns the excerpt (text before the marker) and the full content
    /// with the marker removed. Only a marker that Markdown sees as HTML
    /// counts; one inside a code block is literal text.
    pub fn split_excerpt(content: &str) -> (Option<String>, String) {
        let marker = Parser::new_ext(content, markdown_options())
            .into_offset_iter()
            .find_map(|(event, range)| match event {
                Event::Html(html) | Event::InlineHtml(html) if html.contains(MORE_MARKER) => {
                    content[range.clone()]
                        .find(MORE_MARKER)
                        .map(|offset| range.start + offset)
                }
                _ => None,
            });

        match marker {
            Some(pos) => {
                let excerpt = content[..pos].trim().to_string();
                let remaining = content[pos + MORE_MARKER.len()..].trim().to_string();
                let full = format!("{}\n\n{}", excerpt, remaining);
                (Some(excerpt), full)
            }
            None => (None, content.to_string()),
        }
    }
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_GFM
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_heading_then_bold_paragraph() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hi\n\nHello **world**");
        let h1 = html.find("<h1>Hi</h1>").expect("h1 element");
        let p = html.find("<p>Hello <strong>world</strong></p>").expect("paragraph");
        assert!(h1 < p);
    }

    #[test]
    fn test_render_block_elements() {
        let renderer = MarkdownRenderer::new();
        let markdown = "> quoted\n\n- one\n- two\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n[link](https://example.com) *em*";
        let html = renderer.render(markdown);
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<table>"));
        assert!(html.contains(r#"<a href="https://example.com">link</a>"#));
        assert!(html.contains("<em>em</em>"));
    }

    #[test]
    fn test_code_fence_is_literal() {
        let renderer = MarkdownRenderer::new();
        let markdown = "```python\nsock.send(b'<SYN>')\n# **not bold**\n{{ page.title }}\n```\n";
        let html = renderer.render(markdown);
        assert!(html.contains(r#"<pre><code class="language-python">"#));
        assert!(html.contains("sock.send(b&#39;&lt;SYN&gt;&#39;)"));
        assert!(html.contains("# **not bold**"));
        assert!(html.contains("{{ page.title }}"));
        assert!(!html.contains("<strong>"));
    }

    #[test]
    fn test_indented_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Text\n\n    let x = 1 < 2;\n");
        assert!(html.contains("<pre><code>let x = 1 &lt; 2;\n</code></pre>"));
    }

    #[test]
    fn test_malformed_markdown_passes_through() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("**unclosed bold and [broken link(");
        assert!(html.contains("**unclosed bold and [broken link("));
    }

    #[test]
    fn test_highlighted_code_block() {
        let config = HighlightConfig {
            enable: true,
            ..HighlightConfig::default()
        };
        let renderer = MarkdownRenderer::with_options(&config);
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains("highlight rust"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_split_excerpt() {
        let content = "This is excerpt.\n<!-- more -->\nThis is more content.";
        let (excerpt, full) = MarkdownRenderer::split_excerpt(content);
        assert_eq!(excerpt, Some("This is excerpt.".to_string()));
        assert!(full.contains("This is excerpt."));
        assert!(full.contains("This is more content."));
        assert!(!full.contains("<!-- more -->"));
    }

    #[test]
    fn test_more_marker_in_code_fence_is_not_a_split() {
        let content = "Intro\n\n```html\n<!-- more -->\n```\n\nOutro";
        let (excerpt, full) = MarkdownRenderer::split_excerpt(content);
        assert_eq!(excerpt, None);
        assert_eq!(full, content);

        let html = MarkdownRenderer::new().render(&full);
        assert!(html.contains("&lt;!-- more --&gt;"));
    }
}
