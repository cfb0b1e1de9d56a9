//! Core frontend components: tokens in, top-level forms out

pub mod lexer;
pub mod parser;
