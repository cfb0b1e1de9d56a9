//! Read-eval-print loop
//!
//! [`JitDriver`] pulls top-level forms from the parser, lowers them, hands
//! each unit to the backend and prints evaluated expressions.
//! [`EditorSource`] feeds it from an interactive terminal.

pub mod driver;
pub mod line;

pub use driver::{JitDriver, SessionStats};
pub use line::EditorSource;
