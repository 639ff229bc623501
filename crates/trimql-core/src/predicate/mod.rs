mod ast;
mod eval;


pub use ast::*;
pub use eval::{FieldPresence, Row, eval};
