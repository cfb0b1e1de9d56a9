//! Lexer module
//!
//! Characters come from a [`CharSource`]; tokens are produced either by a
//! synchronous [`Tokenizer`] or by a [`TokenQueue`] running the tokenizer on
//! a worker thread. The parser consumes both through [`TokenStream`].

pub mod queue;
pub mod source;
pub mod state;
pub mod tokenizer;
pub mod tokens;
#[cfg(test)]
mod tests;

// Re-export types
pub use queue::TokenQueue;
pub use source::{CharSource, ReaderSource, StrSource};
pub use tokenizer::Tokenizer;
pub use tokens::{Token, TokenKind};

/// Anything the parser can pull tokens from
pub trait TokenStream {
    /// Next token; end-of-input repeats once reached
    fn next_token(&mut self) -> Token;

    /// Whether tokens are typed live by a user
    fn is_interactive(&self) -> bool {
        false
    }
}

impl<T: TokenStream + ?Sized> TokenStream for Box<T> {
    fn next_token(&mut self) -> Token {
        (**self).next_token()
    }

    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }
}

/// Tokenize a whole string synchronously, end-of-input token included
pub fn tokenize(source: &str) -> Vec<Token> {
    tracing::debug!("tokenizing {} bytes", source.len());

    let mut tokenizer = Tokenizer::new(StrSource::new(source));
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let eof = token.is_eof();
        tokens.push(token);
        if eof {
            break;
        }
    }

    tracing::debug!("tokenized into {} tokens", tokens.len());
    tokens
}
