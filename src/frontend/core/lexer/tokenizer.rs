//! Tokenizer implementation
//! Pull-based token production over a `CharSource`

use super::source::CharSource;
use super::state::LexerState;
use super::TokenStream;
use crate::frontend::core::lexer::tokens::*;
use crate::util::span::{Position, Span};

/// Main lexer structure
///
/// Keeps one character of lookahead in `current`, so a token is returned as
/// soon as the character after it has been read. Nothing is read ahead
/// beyond that, which keeps interactive input responsive.
pub struct Tokenizer<S> {
    source: S,
    current: Option<char>,
    primed: bool,
    line: usize,
    column: usize,
    offset: usize,
    state: LexerState,
}

impl<S: CharSource> Tokenizer<S> {
    /// Create a new tokenizer reading from `source`
    pub fn new(source: S) -> Self {
        Self {
            source,
            // Pseudo-blank so the first `next_token` starts by reading.
            current: Some(' '),
            primed: false,
            line: 1,
            column: 1,
            offset: 0,
            state: LexerState::new(),
        }
    }

    /// Position of the lookahead character
    pub fn position(&self) -> Position {
        Position::with_offset(self.line, self.column, self.offset)
    }

    /// Lines started so far (1-indexed)
    pub fn line_count(&self) -> usize {
        self.line
    }

    /// Characters consumed so far
    pub fn char_count(&self) -> usize {
        self.offset
    }

    /// Whether the underlying source is a human at a terminal
    pub fn is_interactive(&self) -> bool {
        self.source.is_interactive()
    }

    /// Read the next character into the lookahead slot
    pub fn next_char(&mut self) -> Option<char> {
        if self.primed {
            match self.current {
                Some('\n') => {
                    self.line += 1;
                    self.column = 1;
                    self.offset += 1;
                }
                Some(_) => {
                    self.column += 1;
                    self.offset += 1;
                }
                None => {}
            }
        }
        self.primed = true;
        self.current = self.source.next_char();
        self.current
    }

    /// Generate next token
    pub fn next_token(&mut self) -> Token {
        while matches!(self.current, Some(c) if c.is_whitespace()) {
            self.next_char();
        }

        let start = self.position();

        let c = match self.current {
            Some(c) => c,
            None => return Token::new(TokenKind::Eof, Span::new(start, start)),
        };

        let kind = match c {
            ';' => self.single(TokenKind::Semicolon),
            '=' => self.single(TokenKind::Eq),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ',' => self.single(TokenKind::Comma),
            c if c.is_ascii_alphabetic() => self.scan_identifier(),
            c if c.is_ascii_digit() || c == '.' => self.scan_numeral(),
            c => {
                if !is_operator_char(c) {
                    tracing::debug!("unrecognized character {:?} at {}", c, start);
                }
                self.single(TokenKind::Op(c))
            }
        };

        let token = Token::new(kind, Span::new(start, self.position()));
        log_token(&token);
        token
    }

    fn single(
        &mut self,
        kind: TokenKind,
    ) -> TokenKind {
        self.next_char();
        kind
    }

    /// Scan identifier or keyword
    fn scan_identifier(&mut self) -> TokenKind {
        let mut value = String::new();
        while let Some(c) = self.current {
            if !c.is_ascii_alphanumeric() {
                break;
            }
            value.push(c);
            self.next_char();
        }

        self.state
            .keyword_from_str(&value)
            .unwrap_or(TokenKind::Identifier(value))
    }

    /// Scan a numeral; at most one `.` is absorbed
    fn scan_numeral(&mut self) -> TokenKind {
        let mut text = String::new();
        let mut seen_dot = false;

        while let Some(c) = self.current {
            if c == '.' {
                if seen_dot {
                    // A second dot starts the next numeral.
                    break;
                }
                seen_dot = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.next_char();
        }

        if seen_dot {
            TokenKind::FloatLiteral(text)
        } else {
            TokenKind::IntLiteral(text)
        }
    }
}

impl<S: CharSource> TokenStream for Tokenizer<S> {
    fn next_token(&mut self) -> Token {
        Tokenizer::next_token(self)
    }

    fn is_interactive(&self) -> bool {
        Tokenizer::is_interactive(self)
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '<' | '>' | '!' | '%' | '&' | '|' | '^' | '~' | ':' | '#'
    )
}

/// Log a token for debugging
fn log_token(token: &Token) {
    match &token.kind {
        TokenKind::Eof => tracing::trace!("token: eof at {}", token.span.start),
        kind => tracing::trace!("token: {} at {}", kind.describe(), token.span.start),
    }
}
