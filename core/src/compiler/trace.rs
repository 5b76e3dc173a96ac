//! Parse tracing.
//!
//! The parser reports every grammar rule it tries. [`TreeTracer`] records
//! those attempts as an indented tree for `--trace-parse`; [`NoTrace`]
//! discards them.

use core::fmt::Write;

use crate::scanner::Token;

pub trait ParseTracer {
    /// A rule starts at `token` (`None` at end of input).
    fn enter(&mut self, rule: &'static str, token: Option<&Token>);

    /// The innermost open rule matched.
    fn commit(&mut self, rule: &'static str);

    /// The innermost open rule declined or failed.
    fn reject(&mut self, rule: &'static str);
}

/// Tracer that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl ParseTracer for NoTrace {
    #[inline]
    fn enter(&mut self, _rule: &'static str, _token: Option<&Token>) {}

    #[inline]
    fn commit(&mut self, _rule: &'static str) {}

    #[inline]
    fn reject(&mut self, _rule: &'static str) {}
}

#[derive(Debug)]
struct Node {
    rule: &'static str,
    depth: usize,
    token: Option<String>,
    matched: Option<bool>,
}

/// Records the rule attempts as a tree.
///
/// Rules that decline without consuming input are kept, so the output shows
/// every alternative the parser considered.
#[derive(Debug, Default)]
pub struct TreeTracer {
    nodes: Vec<Node>,
    open: Vec<usize>,
}

impl TreeTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn close(&mut self, rule: &'static str, matched: bool) {
        if let Some(index) = self.open.pop() {
            debug_assert_eq!(self.nodes[index].rule, rule);
            self.nodes[index].matched = Some(matched);
        }
    }

    /// One line per rule attempt: `+` matched, `-` declined, `?` still open
    /// (the parse was aborted by an error).
    pub fn render(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            let mark = match node.matched {
                Some(true) => '+',
                Some(false) => '-',
                None => '?',
            };
            let _ = write!(out, "{}{} {}", "  ".repeat(node.depth), mark, node.rule);
            match &node.token {
                Some(token) => {
                    let _ = writeln!(out, " at {}", token);
                }
                None => {
                    let _ = writeln!(out, " at end");
                }
            }
        }
        out
    }
}

impl ParseTracer for TreeTracer {
    fn enter(&mut self, rule: &'static str, token: Option<&Token>) {
        self.open.push(self.nodes.len());
        self.nodes.push(Node {
            rule,
            depth: self.open.len() - 1,
            token: token.map(|token| format!("{} {}", token.position, token)),
            matched: None,
        });
    }

    fn commit(&mut self, rule: &'static str) {
        self.close(rule, true);
    }

    fn reject(&mut self, rule: &'static str) {
        self.close(rule, false);
    }
}
