//! Character sources feeding the tokenizer

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// A sequential character stream
///
/// `None` means end of input; sources keep returning `None` once exhausted.
pub trait CharSource {
    fn next_char(&mut self) -> Option<char>;

    /// Whether reads may block on a human typing
    fn is_interactive(&self) -> bool {
        false
    }
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn next_char(&mut self) -> Option<char> {
        (**self).next_char()
    }

    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }
}

/// In-memory source
#[derive(Debug, Clone)]
pub struct StrSource {
    chars: Vec<char>,
    pos: usize,
}

impl StrSource {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }
}

impl CharSource for StrSource {
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        Some(c)
    }
}

/// Line-buffered source over any `BufRead` (files, piped stdin)
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    line: Vec<char>,
    pos: usize,
    exhausted: bool,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            pos: 0,
            exhausted: false,
        }
    }

    fn refill(&mut self) -> bool {
        let mut buf = String::new();
        match self.reader.read_line(&mut buf) {
            Ok(0) => false,
            Ok(_) => {
                self.line = buf.chars().collect();
                self.pos = 0;
                true
            }
            Err(e) => {
                tracing::error!("read failed, treating as end of input: {}", e);
                false
            }
        }
    }
}

impl ReaderSource<BufReader<File>> {
    /// Open a named file for sequential reads
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl ReaderSource<BufReader<io::Stdin>> {
    /// Non-interactive standard input (pipes, redirects)
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> CharSource for ReaderSource<R> {
    fn next_char(&mut self) -> Option<char> {
        if self.exhausted {
            return None;
        }
        while self.pos >= self.line.len() {
            if !self.refill() {
                self.exhausted = true;
                return None;
            }
        }
        let c = self.line[self.pos];
        self.pos += 1;
        Some(c)
    }
}
