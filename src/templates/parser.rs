//! Template lexer and parser
//!
//! Templates are HTML with two kinds of placeholders:
//!
//! - `{{ path.to.value }}` outputs a value
//! - `{% ... %}` tags for blocks: `for item in collection [limit:N]` ...
//!   `endfor`, and `if path` ... `else` ... `endif`
//!
//! The parser produces a small AST that the renderer walks.

use lazy_static::lazy_static;
use regex::Regex;

use super::TemplateError;

lazy_static! {
    static ref PATH_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*(\.[A-Za-z0-9_-]+)*$").unwrap();
    static ref LIMIT_RE: Regex = Regex::new(r"^limit:\s*(\d+)$").unwrap();
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    /// `{{ ... }}`
    Output { expr: String, line: usize },
    /// `{% ... %}`, with the original source kept for diagnostics
    Tag {
        body: String,
        source: String,
        line: usize,
    },
}

fn next_opener(s: &str) -> Option<usize> {
    [s.find("{{"), s.find("{%")].into_iter().flatten().min()
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = input;
    let mut line = 1;

    while let Some(start) = next_opener(rest) {
        let (open, close) = if rest[start..].starts_with("{{") {
            ("{{", "}}")
        } else {
            ("{%", "%}")
        };
        text.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        // A placeholder must close before the next opener
        let closed = after
            .find(close)
            .filter(|&len| next_opener(after).map_or(true, |next| len < next));
        let Some(len) = closed else {
            // Unterminated opener stays literal text
            text.push_str(open);
            rest = after;
            continue;
        };

        if !text.is_empty() {
            line += text.matches('\n').count();
            tokens.push(Token::Text(std::mem::take(&mut text)));
        }

        let inner = &after[..len];
        let source = &rest[start..start + 2 + len + 2];
        let token = if open == "{{" {
            Token::Output {
                expr: inner.trim().to_string(),
                line,
            }
        } else {
            Token::Tag {
                body: inner.trim().to_string(),
                source: source.to_string(),
                line,
            }
        };
        tokens.push(token);
        line += source.matches('\n').count();
        rest = &after[len + 2..];
    }

    text.push_str(rest);
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }

    tokens
}

// ============================================================================
// AST
// ============================================================================

/// Template AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text
    Text(String),
    /// `{{ path }}`
    Variable(String),
    /// `{% for item in collection %}...{% endfor %}`
    Loop {
        item: String,
        collection: String,
        limit: Option<usize>,
        body: Vec<Node>,
    },
    /// `{% if condition %}...{% else %}...{% endif %}`
    Conditional {
        condition: String,
        then_branch: Vec<Node>,
        else_branch: Vec<Node>,
    },
}

// ============================================================================
// Parser
// ============================================================================

pub(crate) struct Parser {
    tokens: std::vec::IntoIter<Token>,
    template: String,
}

impl Parser {
    pub(crate) fn new(template: &str, source: &str) -> Self {
        Self {
            tokens: tokenize(source).into_iter(),
            template: template.to_string(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Vec<Node>, TemplateError> {
        let (nodes, terminator) = self.parse_nodes(&[])?;
        debug_assert!(terminator.is_none());
        Ok(nodes)
    }

    /// Parse until one of `terminators` (or end of input at top level)
    ///
    /// Returns the nodes and the terminating tag keyword.
    fn parse_nodes(
        &mut self,
        terminators: &[&str],
    ) -> Result<(Vec<Node>, Option<String>), TemplateError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.next() {
            match token {
                Token::Text(text) => nodes.push(Node::Text(text)),
                Token::Output { expr, line } => {
                    if PATH_RE.is_match(&expr) {
                        nodes.push(Node::Variable(expr));
                    } else {
                        tracing::warn!(
                            "{}:{}: unsupported expression {{{{ {} }}}}, rendering empty",
                            self.template,
                            line,
                            expr
                        );
                    }
                }
                Token::Tag { body, source, line } => {
                    let keyword = body.split_whitespace().next().unwrap_or("");
                    match keyword {
                        "for" => nodes.push(self.parse_loop(&body, line)?),
                        "if" => nodes.push(self.parse_conditional(&body, line)?),
                        "endfor" | "endif" | "else" => {
                            if terminators.contains(&keyword) {
                                return Ok((nodes, Some(keyword.to_string())));
                            }
                            return Err(TemplateError::Unexpected {
                                template: self.template.clone(),
                                line,
                                tag: keyword.to_string(),
                            });
                        }
                        _ => {
                            tracing::warn!(
                                "{}:{}: unknown tag {}, rendering empty",
                                self.template,
                                line,
                                source
                            );
                        }
                    }
                }
            }
        }

        if terminators.is_empty() {
            Ok((nodes, None))
        } else {
            Err(TemplateError::Unclosed {
                template: self.template.clone(),
                expected: terminators.join(" or "),
            })
        }
    }

    fn parse_loop(&mut self, body: &str, line: usize) -> Result<Node, TemplateError> {
        let parts: Vec<&str> = body.split_whitespace().collect();
        let (item, collection, limit) = match parts.as_slice() {
            ["for", item, "in", collection] => (*item, *collection, None),
            ["for", item, "in", collection, limit] => {
                let limit = LIMIT_RE
                    .captures(limit)
                    .and_then(|c| c[1].parse::<usize>().ok())
                    .ok_or_else(|| self.syntax_error(line, body))?;
                (*item, *collection, Some(limit))
            }
            _ => return Err(self.syntax_error(line, body)),
        };

        if !PATH_RE.is_match(item) || item.contains('.') || !PATH_RE.is_match(collection) {
            return Err(self.syntax_error(line, body));
        }

        let (nodes, _) = self.parse_nodes(&["endfor"])?;
        Ok(Node::Loop {
            item: item.to_string(),
            collection: collection.to_string(),
            limit,
            body: nodes,
        })
    }

    fn parse_conditional(&mut self, body: &str, line: usize) -> Result<Node, TemplateError> {
        let condition = match body.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["if", path] if PATH_RE.is_match(path) => path.to_string(),
            _ => return Err(self.syntax_error(line, body)),
        };

        let (then_branch, terminator) = self.parse_nodes(&["else", "endif"])?;
        let else_branch = if terminator.as_deref() == Some("else") {
            self.parse_nodes(&["endif"])?.0
        } else {
            Vec::new()
        };

        Ok(Node::Conditional {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn syntax_error(&self, line: usize, tag: &str) -> TemplateError {
        TemplateError::Syntax {
            template: self.template.clone(),
            line,
            tag: tag.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Vec<Node>, TemplateError> {
        Parser::new("test.html", source).parse()
    }

    #[test]
    fn test_tokenize_lines() {
        let tokens = tokenize("a\n{{ x }}\n{% if y %}");
        assert_eq!(tokens.len(), 4);
        assert_eq!(
            tokens[1],
            Token::Output {
                expr: "x".to_string(),
                line: 2
            }
        );
        assert!(matches!(tokens[3], Token::Tag { line: 3, .. }));
    }

    #[test]
    fn test_parse_text_and_variables() {
        let nodes = parse("<h1>{{ page.title }}</h1>").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("<h1>".to_string()),
                Node::Variable("page.title".to_string()),
                Node::Text("</h1>".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_loop_with_limit() {
        let nodes = parse("{% for post in site.posts limit:2 %}<li>{{ post.title }}</li>{% endfor %}")
            .unwrap();
        match &nodes[0] {
            Node::Loop {
                item,
                collection,
                limit,
                body,
            } => {
                assert_eq!(item, "post");
                assert_eq!(collection, "site.posts");
                assert_eq!(*limit, Some(2));
                assert_eq!(body.len(), 3);
            }
            other => panic!("expected loop, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_conditional_with_else() {
        let nodes = parse("{% if page.summary %}A{% else %}B{% endif %}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Conditional {
                condition: "page.summary".to_string(),
                then_branch: vec![Node::Text("A".to_string())],
                else_branch: vec![Node::Text("B".to_string())],
            }]
        );
    }

    #[test]
    fn test_unclosed_loop_is_error() {
        let err = parse("{% for post in site.posts %}<li>").unwrap_err();
        assert!(matches!(err, TemplateError::Unclosed { .. }));
    }

    #[test]
    fn test_stray_end_tag_is_error() {
        let err = parse("text {% endif %}").unwrap_err();
        assert!(matches!(err, TemplateError::Unexpected { line: 1, .. }));
    }

    #[test]
    fn test_malformed_for_is_error() {
        let err = parse("{% for post site.posts %}{% endfor %}").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { .. }));
    }

    #[test]
    fn test_unknown_tag_is_dropped_and_unterminated_output_is_literal() {
        let nodes = parse("{% include head.html %} and {{ broken").unwrap();
        assert_eq!(nodes, vec![Node::Text(" and {{ broken".to_string())]);
    }

    #[test]
    fn test_unterminated_output_does_not_swallow_markup() {
        let nodes = parse("<p>{{ broken</p><h1>{{ page.title }}</h1>").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("<p>{{ broken</p><h1>".to_string()),
                Node::Variable("page.title".to_string()),
                Node::Text("</h1>".to_string()),
            ]
        );
    }
}
