//! Threaded token production
//!
//! The tokenizer runs on a dedicated worker and pushes tokens into a bounded
//! channel; the parser blocks on `recv` only when no token is available yet.
//!
//! ```text
//! CharSource -> [worker: Tokenizer] --bounded channel--> TokenQueue::recv -> Parser
//!                      ^ stop flag checked between tokens
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

use super::source::CharSource;
use super::tokenizer::Tokenizer;
use super::tokens::{Token, TokenKind};
use super::TokenStream;

/// Consumer side of the producer/consumer token queue
pub struct TokenQueue {
    receiver: Receiver<Token>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    interactive: bool,
    /// End of input already delivered (or queue shut down)
    finished: bool,
}

impl TokenQueue {
    /// Start a tokenizer worker over `source`
    pub fn spawn<S>(
        source: S,
        capacity: usize,
    ) -> io::Result<Self>
    where
        S: CharSource + Send + 'static,
    {
        let (sender, receiver) = channel::bounded(capacity.max(1));
        let stop = Arc::new(AtomicBool::new(false));
        let interactive = source.is_interactive();

        let worker_stop = Arc::clone(&stop);
        let worker = thread::Builder::new()
            .name("yapl-tokenizer".to_string())
            .spawn(move || {
                let mut tokenizer = Tokenizer::new(source);
                produce(&mut tokenizer, &sender, &worker_stop);
            })?;

        tracing::debug!("tokenizer worker started (capacity {})", capacity.max(1));

        Ok(Self {
            receiver,
            stop,
            worker: Some(worker),
            interactive,
            finished: false,
        })
    }

    /// Block until the next token is available
    ///
    /// Yields end-of-input forever once the producer is done or gone.
    pub fn recv(&mut self) -> Token {
        if self.finished {
            return Token::from(TokenKind::Eof);
        }
        match self.receiver.recv() {
            Ok(token) => {
                if token.is_eof() {
                    self.finished = true;
                }
                token
            }
            Err(_) => {
                self.finished = true;
                Token::from(TokenKind::Eof)
            }
        }
    }

    /// Non-blocking poll; `None` means "no token yet", not an error
    pub fn try_recv(&mut self) -> Option<Token> {
        if self.finished {
            return Some(Token::from(TokenKind::Eof));
        }
        match self.receiver.try_recv() {
            Ok(token) => {
                if token.is_eof() {
                    self.finished = true;
                }
                Some(token)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                Some(Token::from(TokenKind::Eof))
            }
        }
    }

    /// Signal the worker to stop and release it
    ///
    /// The worker is joined when it has already returned; a worker blocked
    /// on input is detached, it exits at its next send.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.finished = true;
        // Dropping the live receiver disconnects the channel.
        self.receiver = channel::never();

        if let Some(worker) = self.worker.take() {
            if worker.is_finished() {
                if worker.join().is_err() {
                    tracing::warn!("tokenizer worker panicked");
                }
            } else {
                tracing::debug!("tokenizer worker still blocked on input, detaching");
            }
        }
    }
}

impl TokenStream for TokenQueue {
    fn next_token(&mut self) -> Token {
        self.recv()
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl Drop for TokenQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn produce<S: CharSource>(
    tokenizer: &mut Tokenizer<S>,
    sender: &Sender<Token>,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::Acquire) {
        let token = tokenizer.next_token();
        let eof = token.is_eof();
        if sender.send(token).is_err() {
            tracing::debug!("token consumer gone, stopping tokenizer");
            return;
        }
        if eof {
            return;
        }
    }
    tracing::debug!("tokenizer stop signal observed");
}
