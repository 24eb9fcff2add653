use std::rc::Rc;

use crate::environment::Environment;
use crate::object::{BuiltinFunction, EvaluationError, Value};

fn unexpected_number_of_arguments_error(expected: usize, got: usize) -> EvaluationError {
    EvaluationError::BuiltinFunctionError(
        format!(
            "unexpected number of arguments. Expected {} got {}",
            expected, got
        )
        .into(),
    )
}

/// Prints all arguments on one line, space-separated, newline-terminated.
/// Returns `false` since the language has no null.
fn builtin_print(args: Vec<Rc<Value>>) -> Result<Rc<Value>, EvaluationError> {
    let line = args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", line);
    Ok(Value::boolean(false))
}

fn builtin_to_string(args: Vec<Rc<Value>>) -> Result<Rc<Value>, EvaluationError> {
    if args.len() != 1 {
        return Err(unexpected_number_of_arguments_error(1, args.len()));
    }
    Ok(Value::string(args[0].to_string()))
}

const BUILTINS: &[BuiltinFunction] = &[
    BuiltinFunction {
        name: "print",
        func: builtin_print,
    },
    BuiltinFunction {
        name: "to_string",
        func: builtin_to_string,
    },
];

/// A root scope pre-populated with the host bindings every program can
/// rely on.
pub fn global_environment() -> Environment {
    let env = Environment::new();
    for builtin in BUILTINS {
        env.define(builtin.name.into(), Value::builtin(builtin.clone()));
    }
    env
}
