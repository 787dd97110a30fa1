pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{MarkupDocument, MarkupElement, MarkupNode};
pub use error::MarkupError;
pub use lexer::{Lexer, Token};
pub use parser::{Parser, parse};
