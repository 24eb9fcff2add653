use std::rc::Rc;

use thiserror::Error;

use lambda_lang_core::lexer::Lexer;
use lambda_lang_core::parser::{ParseError, Parser};
use lambda_lang_interpreter::builtins;
use lambda_lang_interpreter::evaluator;
use lambda_lang_interpreter::object::{EvaluationError, Value};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Runs a whole program against a fresh global environment and returns
/// its final value. Output happens through the `print` builtin.
pub fn execute(source: &str) -> Result<Rc<Value>, ExecutionError> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program()?;
    let env = builtins::global_environment();
    Ok(evaluator::evaluate(&program, &env)?)
}
