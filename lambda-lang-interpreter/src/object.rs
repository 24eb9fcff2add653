use std::fmt::Display;
use std::rc::Rc;

use lambda_lang_core::ast::Expr;
use thiserror::Error;

use crate::environment::Environment;

/// The closed set of runtime values. There is no null: the `false`
/// literal doubles as the language's absent-value sentinel.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Closure(Closure),
    Builtin(BuiltinFunction),
}

thread_local! {
    static TRUE: Rc<Value> = Rc::new(Value::Boolean(true));
    static FALSE: Rc<Value> = Rc::new(Value::Boolean(false));
}

impl Value {
    pub fn number(value: f64) -> Rc<Value> {
        Rc::new(Value::Number(value))
    }
    pub fn string(value: String) -> Rc<Value> {
        Rc::new(Value::String(value))
    }
    pub fn boolean(value: bool) -> Rc<Value> {
        if value {
            TRUE.with(|x| x.clone())
        } else {
            FALSE.with(|x| x.clone())
        }
    }
    pub fn closure(parameters: Vec<Rc<str>>, body: Expr, env: Environment) -> Rc<Value> {
        Rc::new(Value::Closure(Closure {
            parameters,
            body,
            env,
        }))
    }
    pub fn builtin(function: BuiltinFunction) -> Rc<Value> {
        Rc::new(Value::Builtin(function))
    }

    /// Only the boolean `false` is falsy; `0` and `""` are truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Closure(closure) => {
                write!(f, "<lambda@{:x}>", closure as *const Closure as usize)
            }
            Value::Builtin(function) => write!(f, "<builtin@{}>", function.name),
        }
    }
}

/// A lambda's parameters and body together with the environment that was
/// current when the lambda literal was evaluated. The environment is held
/// by reference, so captured scopes stay alive after their call returns.
#[derive(Clone)]
pub struct Closure {
    pub parameters: Vec<Rc<str>>,
    pub body: Expr,
    pub env: Environment,
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters
            && self.body == other.body
            && self.env.ptr_eq(&other.env)
    }
}

impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closure")
            .field("ptr", &(self as *const Closure as usize))
            .finish()
    }
}

/// A host-provided callable installed in the global scope.
#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: &'static str,
    #[allow(clippy::type_complexity)]
    pub func: fn(Vec<Rc<Value>>) -> Result<Rc<Value>, EvaluationError>,
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.func as usize == other.func as usize
    }
}

impl std::fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum EvaluationError {
    #[error("Undefined variable {0}")]
    UndefinedVariable(Rc<str>),
    #[error("Expected number but got {0}")]
    ExpectedNumber(Rc<Value>),
    #[error("Divide by zero")]
    DivideByZero,
    #[error("Cannot assign to {0}")]
    InvalidAssignmentTarget(Expr),
    #[error("Called a value that is not a function: {0}")]
    CallNonFunction(Rc<Value>),
    #[error("Builtin function error: {0}")]
    BuiltinFunctionError(Rc<str>),
}
