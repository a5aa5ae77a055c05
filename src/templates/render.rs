//! Template evaluation

use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::value::split_path;
use super::{Context, Node, Template, Value};
use crate::error::BuildError;

/// Loop variable binding
struct Frame<'a> {
    name: String,
    item: &'a Value,
    forloop: Value,
}

struct Evaluator<'a> {
    context: &'a Context,
    frames: Vec<Frame<'a>>,
    unresolved: BTreeSet<String>,
}

pub(super) fn render(template: &Template, context: &Context) -> String {
    let mut evaluator = Evaluator {
        context,
        frames: Vec::new(),
        unresolved: BTreeSet::new(),
    };

    let mut output = String::new();
    evaluator.render_nodes(template.nodes(), &mut output);

    for name in evaluator.unresolved {
        let err = BuildError::UnresolvedTemplateReference {
            kind: "placeholder",
            name,
            location: template.name().to_string(),
        };
        tracing::warn!("{}", err);
    }

    output
}

impl<'a> Evaluator<'a> {
    fn render_nodes(&mut self, nodes: &[Node], output: &mut String) {
        for node in nodes {
            self.render_node(node, output);
        }
    }

    fn render_node(&mut self, node: &Node, output: &mut String) {
        match node {
            Node::Text(text) => output.push_str(text),
            Node::Variable(path) => match self.resolve(path).map(Value::to_output_string) {
                Some(text) => output.push_str(&text),
                None => {
                    self.unresolved.insert(path.clone());
                }
            },
            Node::Loop {
                item,
                collection,
                limit,
                body,
            } => {
                let Some(items) = self.resolve_borrowed(collection).and_then(Value::as_list)
                else {
                    self.unresolved.insert(collection.clone());
                    return;
                };
                let count = limit.map_or(items.len(), |l| l.min(items.len()));

                for (i, value) in items[..count].iter().enumerate() {
                    self.frames.push(Frame {
                        name: item.clone(),
                        item: value,
                        forloop: forloop(i, count),
                    });
                    self.render_nodes(body, output);
                    self.frames.pop();
                }
            }
            Node::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let truthy = self.resolve(condition).is_some_and(Value::is_truthy);
                if truthy {
                    self.render_nodes(then_branch, output);
                } else {
                    self.render_nodes(else_branch, output);
                }
            }
        }
    }

    /// Resolve a path against loop frames, then the context
    fn resolve(&self, path: &str) -> Option<&Value> {
        let (head, rest) = split_path(path);
        if head == "forloop" {
            if let Some(frame) = self.frames.last() {
                return frame.forloop.lookup(rest);
            }
        }
        self.resolve_borrowed(path)
    }

    /// Like `resolve`, but only for values that outlive the evaluator
    fn resolve_borrowed(&self, path: &str) -> Option<&'a Value> {
        let (head, rest) = split_path(path);
        for frame in self.frames.iter().rev() {
            if frame.name == head {
                return frame.item.lookup(rest);
            }
        }
        self.context.lookup(path)
    }
}

fn forloop(index: usize, length: usize) -> Value {
    let mut map = IndexMap::new();
    map.insert("index".to_string(), Value::from(index + 1));
    map.insert("index0".to_string(), Value::from(index));
    map.insert("length".to_string(), Value::from(length));
    map.insert("first".to_string(), Value::from(index == 0));
    map.insert("last".to_string(), Value::from(index + 1 == length));
    Value::Map(map)
}
