use std::fmt::Display;
use std::rc::Rc;

/// One payload shape per node kind; the parser never hands out a
/// partially-built node.
#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Number(f64),
    String(String),
    Bool(bool),
    Var(Rc<str>),
    Lambda {
        parameters: Vec<Rc<str>>,
        body: Box<Expr>,
    },
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },
    If {
        condition: Box<Expr>,
        consequence: Box<Expr>,
        alternative: Option<Box<Expr>>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Binary {
        operator: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Program(Vec<Expr>),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOp {
    Or,
    And,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        use BinaryOp::*;
        match symbol {
            "||" => Some(Or),
            "&&" => Some(And),
            "<" => Some(LessThan),
            ">" => Some(GreaterThan),
            "<=" => Some(LessEqual),
            ">=" => Some(GreaterEqual),
            "==" => Some(Equal),
            "!=" => Some(NotEqual),
            "+" => Some(Plus),
            "-" => Some(Minus),
            "*" => Some(Multiply),
            "/" => Some(Divide),
            "%" => Some(Modulo),
            _ => None,
        }
    }

    /// Binding strength used by the precedence-climbing parser. Higher
    /// binds tighter; assignment sits below all of these at 1.
    pub fn precedence(&self) -> u8 {
        use BinaryOp::*;
        match self {
            Or => 2,
            And => 3,
            LessThan | GreaterThan | LessEqual | GreaterEqual | Equal | NotEqual => 7,
            Plus | Minus => 10,
            Multiply | Divide | Modulo => 20,
        }
    }

    fn to_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Or => "||",
            And => "&&",
            LessThan => "<",
            GreaterThan => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expr::*;
        match self {
            Number(value) => write!(f, "{}", value),
            String(value) => write!(f, "\"{}\"", value),
            Bool(value) => write!(f, "{}", value),
            Var(name) => write!(f, "{}", name),
            Lambda { parameters, body } => {
                write!(f, "lambda({}) {}", parameters.join(", "), body)
            }
            Call {
                function,
                arguments,
            } => {
                write!(
                    f,
                    "{}({})",
                    function,
                    arguments
                        .iter()
                        .map(|argument| argument.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {} then {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Assign { target, value } => write!(f, "({} = {})", target, value),
            Binary {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Program(expressions) => {
                write!(f, "{{")?;
                for (i, expression) in expressions.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", expression)?;
                }
                write!(f, "}}")
            }
        }
    }
}
