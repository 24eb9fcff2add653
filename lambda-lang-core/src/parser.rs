use std::rc::Rc;

use thiserror::Error;

use crate::ast::{BinaryOp, Expr};
use crate::input::Position;
use crate::lexer::{Keyword, LexError, Lexer, Token};

#[derive(Debug, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("Unexpected token: {found:?} ({position})")]
    UnexpectedToken {
        found: Option<Token>,
        position: Position,
    },
    #[error("Expected punctuation: \"{expected}\" ({position})")]
    ExpectedPunctuation { expected: char, position: Position },
    #[error("Expected keyword: \"{expected}\" ({position})")]
    ExpectedKeyword {
        expected: Keyword,
        position: Position,
    },
    #[error("Expecting variable name ({position})")]
    ExpectedVariableName {
        found: Option<Token>,
        position: Position,
    },
    #[error("Cannot assign to {target} ({position})")]
    InvalidAssignmentTarget { target: Expr, position: Position },
}

fn precedence_of(operator: &str) -> Option<u8> {
    if operator == "=" {
        return Some(1);
    }
    BinaryOp::from_symbol(operator).map(|op| op.precedence())
}

/// Recursive-descent parser over a [`Lexer`], one method per grammar
/// production. There is no error recovery: the first failure aborts with
/// a positioned [`ParseError`].
pub struct Parser<'a> {
    tokens: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Lexer<'a>) -> Self {
        Self { tokens }
    }

    /// Consumes the whole token stream and wraps the top-level
    /// `;`-separated expressions in a single `Program` node.
    pub fn parse_program(&mut self) -> Result<Expr, ParseError> {
        let mut program = Vec::new();
        while !self.tokens.eof()? {
            program.push(self.parse_expression()?);
            if !self.tokens.eof()? {
                self.skip_punctuation(';')?;
            }
        }
        Ok(Expr::Program(program))
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let atom = self.parse_atom()?;
        let expression = self.maybe_binary(atom, 0)?;
        self.maybe_call(expression)
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let expression = if self.is_punctuation('(')? {
            self.tokens.next()?;
            let expression = self.parse_expression()?;
            self.skip_punctuation(')')?;
            expression
        } else if self.is_punctuation('{')? {
            self.parse_block()?
        } else if self.is_keyword(Keyword::If)? {
            self.parse_if()?
        } else if self.is_keyword(Keyword::True)? || self.is_keyword(Keyword::False)? {
            self.parse_bool()?
        } else if self.is_keyword(Keyword::Lambda)? {
            self.tokens.next()?;
            self.parse_lambda()?
        } else {
            match self.tokens.next()? {
                Some(Token::Number(value)) => Expr::Number(value),
                Some(Token::String(value)) => Expr::String(value),
                Some(Token::Ident(name)) => Expr::Var(name.into()),
                found => return Err(self.unexpected(found)),
            }
        };
        self.maybe_call(expression)
    }

    /// A `{...}` block is a comma-separated expression sequence: empty
    /// means the `false` literal, a single expression stands for itself.
    fn parse_block(&mut self) -> Result<Expr, ParseError> {
        let mut expressions = self.delimited('{', '}', ',', Self::parse_expression)?;
        match expressions.len() {
            0 => Ok(Expr::Bool(false)),
            1 => Ok(expressions.remove(0)),
            _ => Ok(Expr::Program(expressions)),
        }
    }

    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        self.skip_keyword(Keyword::If)?;
        let condition = self.parse_expression()?;
        // `then` may be left out when the consequence is a `{...}` block
        if !self.is_punctuation('{')? {
            self.skip_keyword(Keyword::Then)?;
        }
        let consequence = self.parse_expression()?;
        let alternative = if self.is_keyword(Keyword::Else)? {
            self.tokens.next()?;
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        Ok(Expr::If {
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternative,
        })
    }

    fn parse_bool(&mut self) -> Result<Expr, ParseError> {
        match self.tokens.next()? {
            Some(Token::Keyword(Keyword::True)) => Ok(Expr::Bool(true)),
            Some(Token::Keyword(Keyword::False)) => Ok(Expr::Bool(false)),
            found => Err(self.unexpected(found)),
        }
    }

    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        let parameters = self.delimited('(', ')', ',', Self::parse_varname)?;
        let body = self.parse_expression()?;
        Ok(Expr::Lambda {
            parameters,
            body: Box::new(body),
        })
    }

    fn parse_varname(&mut self) -> Result<Rc<str>, ParseError> {
        match self.tokens.next()? {
            Some(Token::Ident(name)) => Ok(name.into()),
            found => Err(ParseError::ExpectedVariableName {
                found,
                position: self.tokens.position(),
            }),
        }
    }

    fn maybe_call(&mut self, mut expression: Expr) -> Result<Expr, ParseError> {
        while self.is_punctuation('(')? {
            let arguments = self.delimited('(', ')', ',', Self::parse_expression)?;
            expression = Expr::Call {
                function: Box::new(expression),
                arguments,
            };
        }
        Ok(expression)
    }

    /// Precedence climbing: fold operators that bind tighter than
    /// `min_precedence` into `left`, recursing for each right-hand side.
    fn maybe_binary(&mut self, left: Expr, min_precedence: u8) -> Result<Expr, ParseError> {
        let Some(operator) = self.peek_operator()? else {
            return Ok(left);
        };
        let Some(precedence) = precedence_of(&operator) else {
            return Ok(left);
        };
        if precedence <= min_precedence {
            return Ok(left);
        }

        self.tokens.next()?;
        let atom = self.parse_atom()?;
        // `=` is right-associative: equal-precedence operators on the
        // right fold into its right-hand side
        let right_precedence = if operator == "=" {
            precedence - 1
        } else {
            precedence
        };
        let right = self.maybe_binary(atom, right_precedence)?;
        let expression = match BinaryOp::from_symbol(&operator) {
            Some(operator) => Expr::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
            // `=` is the only operator with a precedence but no BinaryOp
            None => {
                if !matches!(left, Expr::Var(_)) {
                    return Err(ParseError::InvalidAssignmentTarget {
                        target: left,
                        position: self.tokens.position(),
                    });
                }
                Expr::Assign {
                    target: Box::new(left),
                    value: Box::new(right),
                }
            }
        };
        self.maybe_binary(expression, min_precedence)
    }

    fn delimited<T>(
        &mut self,
        start: char,
        stop: char,
        separator: char,
        mut parse: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut elements = Vec::new();
        let mut first = true;
        self.skip_punctuation(start)?;
        while !self.tokens.eof()? {
            if self.is_punctuation(stop)? {
                break;
            }
            if first {
                first = false;
            } else {
                self.skip_punctuation(separator)?;
            }
            if self.is_punctuation(stop)? {
                break;
            }
            elements.push(parse(self)?);
        }
        self.skip_punctuation(stop)?;
        Ok(elements)
    }

    fn is_punctuation(&mut self, expected: char) -> Result<bool, ParseError> {
        Ok(matches!(
            self.tokens.peek()?,
            Some(Token::Punctuation(ch)) if *ch == expected
        ))
    }

    fn is_keyword(&mut self, expected: Keyword) -> Result<bool, ParseError> {
        Ok(matches!(
            self.tokens.peek()?,
            Some(Token::Keyword(keyword)) if *keyword == expected
        ))
    }

    fn peek_operator(&mut self) -> Result<Option<String>, ParseError> {
        match self.tokens.peek()? {
            Some(Token::Operator(operator)) => Ok(Some(operator.clone())),
            _ => Ok(None),
        }
    }

    fn skip_punctuation(&mut self, expected: char) -> Result<(), ParseError> {
        if self.is_punctuation(expected)? {
            self.tokens.next()?;
            Ok(())
        } else {
            Err(ParseError::ExpectedPunctuation {
                expected,
                position: self.tokens.position(),
            })
        }
    }

    fn skip_keyword(&mut self, expected: Keyword) -> Result<(), ParseError> {
        if self.is_keyword(expected)? {
            self.tokens.next()?;
            Ok(())
        } else {
            Err(ParseError::ExpectedKeyword {
                expected,
                position: self.tokens.position(),
            })
        }
    }

    fn unexpected(&self, found: Option<Token>) -> ParseError {
        ParseError::UnexpectedToken {
            found,
            position: self.tokens.position(),
        }
    }
}
