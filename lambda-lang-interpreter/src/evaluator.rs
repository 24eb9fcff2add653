use std::rc::Rc;

use lambda_lang_core::ast::{BinaryOp, Expr};

use crate::environment::Environment;
use crate::object::{Closure, EvaluationError, Value};

/// Walks the AST and produces a runtime value. Plain recursion: deeply
/// nested programs are bounded by the host call stack.
pub fn evaluate(expression: &Expr, env: &Environment) -> Result<Rc<Value>, EvaluationError> {
    match expression {
        Expr::Number(value) => Ok(Value::number(*value)),
        Expr::String(value) => Ok(Value::string(value.clone())),
        Expr::Bool(value) => Ok(Value::boolean(*value)),
        Expr::Var(name) => env
            .get(name)
            .ok_or_else(|| EvaluationError::UndefinedVariable(name.clone())),
        Expr::Assign { target, value } => {
            // The parser already rejects non-variable targets; re-check
            // here because the evaluator cannot assume a well-formed tree.
            let Expr::Var(name) = target.as_ref() else {
                return Err(EvaluationError::InvalidAssignmentTarget(
                    target.as_ref().clone(),
                ));
            };
            let value = evaluate(value, env)?;
            env.set(name, value)
                .ok_or_else(|| EvaluationError::UndefinedVariable(name.clone()))
        }
        Expr::Binary {
            operator,
            left,
            right,
        } => {
            let left = evaluate(left, env)?;
            let right = evaluate(right, env)?;
            apply_operator(*operator, left, right)
        }
        Expr::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = evaluate(condition, env)?;
            if condition.is_truthy() {
                evaluate(consequence, env)
            } else if let Some(alternative) = alternative {
                evaluate(alternative, env)
            } else {
                Ok(Value::boolean(false))
            }
        }
        Expr::Lambda { parameters, body } => Ok(Value::closure(
            parameters.clone(),
            body.as_ref().clone(),
            env.clone(),
        )),
        Expr::Call {
            function,
            arguments,
        } => {
            let function = evaluate(function, env)?;
            let mut args = Vec::with_capacity(arguments.len());
            for argument in arguments {
                args.push(evaluate(argument, env)?);
            }
            match function.as_ref() {
                Value::Closure(closure) => apply_closure(closure, args),
                Value::Builtin(builtin) => (builtin.func)(args),
                _ => Err(EvaluationError::CallNonFunction(function.clone())),
            }
        }
        Expr::Program(expressions) => {
            let mut result = Value::boolean(false);
            for expression in expressions {
                result = evaluate(expression, env)?;
            }
            Ok(result)
        }
    }
}

/// Binds arguments in a fresh child of the captured scope. Missing
/// trailing arguments bind to `false`; surplus arguments were already
/// evaluated and are dropped here.
fn apply_closure(closure: &Closure, arguments: Vec<Rc<Value>>) -> Result<Rc<Value>, EvaluationError> {
    let scope = closure.env.extend();
    for (i, parameter) in closure.parameters.iter().enumerate() {
        let value = arguments
            .get(i)
            .cloned()
            .unwrap_or_else(|| Value::boolean(false));
        scope.define(parameter.clone(), value);
    }
    evaluate(&closure.body, &scope)
}

fn apply_operator(
    operator: BinaryOp,
    left: Rc<Value>,
    right: Rc<Value>,
) -> Result<Rc<Value>, EvaluationError> {
    use BinaryOp::*;
    match operator {
        Plus => Ok(Value::number(as_number(&left)? + as_number(&right)?)),
        Minus => Ok(Value::number(as_number(&left)? - as_number(&right)?)),
        Multiply => Ok(Value::number(as_number(&left)? * as_number(&right)?)),
        Divide => Ok(Value::number(as_number(&left)? / nonzero(&right)?)),
        Modulo => Ok(Value::number(as_number(&left)? % nonzero(&right)?)),
        LessThan => Ok(Value::boolean(as_number(&left)? < as_number(&right)?)),
        GreaterThan => Ok(Value::boolean(as_number(&left)? > as_number(&right)?)),
        LessEqual => Ok(Value::boolean(as_number(&left)? <= as_number(&right)?)),
        GreaterEqual => Ok(Value::boolean(as_number(&left)? >= as_number(&right)?)),
        Equal => Ok(Value::boolean(strict_equals(&left, &right))),
        NotEqual => Ok(Value::boolean(!strict_equals(&left, &right))),
        // Both operands are already evaluated; truthiness picks one
        And => Ok(if left.is_truthy() { right } else { left }),
        Or => Ok(if left.is_truthy() { left } else { right }),
    }
}

fn as_number(value: &Rc<Value>) -> Result<f64, EvaluationError> {
    match value.as_ref() {
        Value::Number(number) => Ok(*number),
        _ => Err(EvaluationError::ExpectedNumber(value.clone())),
    }
}

fn nonzero(value: &Rc<Value>) -> Result<f64, EvaluationError> {
    let number = as_number(value)?;
    if number == 0.0 {
        return Err(EvaluationError::DivideByZero);
    }
    Ok(number)
}

/// Host-level strict equality: same-kind primitives compare by value,
/// everything else by identity.
fn strict_equals(left: &Rc<Value>, right: &Rc<Value>) -> bool {
    match (left.as_ref(), right.as_ref()) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        _ => Rc::ptr_eq(left, right),
    }
}
