//! Parser module
//!
//! Recursive descent over declarations and function bodies, precedence
//! climbing for binary expressions. The parser pulls tokens on demand from
//! any [`TokenStream`] and hands back one top-level form at a time.

pub mod ast;
pub mod parser_state;
pub mod pratt;
pub mod statements;
pub mod symbols;
#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use ast::*;
pub use parser_state::{ParseError, Parser};
pub use symbols::{scoped_name, SymbolTable, GLOBAL_SCOPE};

use crate::frontend::core::lexer::{StrSource, TokenStream, Tokenizer};

/// Parse every form of `source`
///
/// Bare expressions advance the anonymous counter the same way the JIT
/// driver does, so names match what an interactive session would produce.
pub fn parse_all(source: &str) -> (Vec<Node>, Vec<ParseError>) {
    let mut parser = Parser::new(Tokenizer::new(StrSource::new(source)));
    let nodes = collect_nodes(&mut parser);
    let errors = parser.take_errors();
    (nodes, errors)
}

fn collect_nodes<T: TokenStream>(parser: &mut Parser<T>) -> Vec<Node> {
    let mut nodes = Vec::new();
    loop {
        match parser.parse_next() {
            Some(node) if node.is_end_of_input() => break,
            Some(node) => {
                if matches!(node, Node::Anon(_) | Node::Expr(_)) {
                    parser.increment_anon_counter();
                }
                nodes.push(node);
            }
            None => {}
        }
    }
    nodes
}
