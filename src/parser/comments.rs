//! Comment extraction.
//!
//! Comments are extras in the grammar and are not lowered into the [`Ast`];
//! they are kept on the side, sorted by position, for JSDoc attachment.
//!
//! [`Ast`]: crate::analysis::Ast

use streaming_iterator::StreamingIterator;
use tree_sitter::{QueryCursor, Tree};

use super::grammar::Grammar;
use crate::analysis::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub span: Span,
    pub text: String,
}

impl Comment {
    /// `/** ... */`, excluding the empty `/**/`.
    pub fn is_jsdoc(&self) -> bool {
        self.text.starts_with("/**") && self.text != "/**/"
    }
}

/// Collect every comment of a parsed tree in document order.
pub(crate) fn extract(grammar: &Grammar, tree: &Tree, source: &str) -> Vec<Comment> {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&grammar.comments, tree.root_node(), source.as_bytes());

    let mut comments = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let node = capture.node;
            comments.push(Comment {
                span: Span::new(node.start_byte(), node.end_byte()),
                text: node.utf8_text(source.as_bytes()).unwrap_or("").to_string(),
            });
        }
    }
    comments.sort_by_key(|c| c.span.start);
    comments.dedup_by_key(|c| c.span.start);
    comments
}

#[cfg(test)]
mod tests {
    use crate::parser::SourceFile;

    #[test]
    fn test_comments_are_collected_in_order() {
        let file = SourceFile::parse(
            "a.js",
            "// line\n/** doc */\nclass A {}\n/* block */",
        )
        .unwrap();
        let texts: Vec<_> = file.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["// line", "/** doc */", "/* block */"]);
        assert!(!file.comments[0].is_jsdoc());
        assert!(file.comments[1].is_jsdoc());
    }
}
