pub mod ast;
pub mod input;
pub mod lexer;
pub mod parser;
