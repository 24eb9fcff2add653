use std::fmt::Display;

use thiserror::Error;

use crate::input::{InputStream, Position};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Keyword {
    If,
    Then,
    Else,
    Lambda,
    True,
    False,
}

static KEYWORDS: phf::Map<&str, Keyword> = phf::phf_map! {
    "if" => Keyword::If,
    "then" => Keyword::Then,
    "else" => Keyword::Else,
    "lambda" => Keyword::Lambda,
    "λ" => Keyword::Lambda,
    "true" => Keyword::True,
    "false" => Keyword::False,
};

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Keyword::If => "if",
            Keyword::Then => "then",
            Keyword::Else => "else",
            Keyword::Lambda => "lambda",
            Keyword::True => "true",
            Keyword::False => "false",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Number(f64),
    String(String),
    Keyword(Keyword),
    Ident(String),
    Punctuation(char),
    Operator(String),
}

#[derive(Debug, PartialEq, Error)]
pub enum LexError {
    #[error("Can't handle character: {character} ({position})")]
    UnrecognizedCharacter { character: char, position: Position },
    #[error("Invalid number literal: {literal} ({position})")]
    InvalidNumber { literal: String, position: Position },
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n')
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == 'λ'
}

fn is_identifier_char(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit() || "?!-<>=".contains(ch)
}

fn is_operator_char(ch: char) -> bool {
    "+-*/%=&|<>!".contains(ch)
}

fn is_punctuation(ch: char) -> bool {
    ",;(){}[]".contains(ch)
}

/// Lazy tokenizer over an [`InputStream`], with a one-token lookahead
/// buffer refilled by `peek` and drained by `next`.
pub struct Lexer<'a> {
    input: InputStream<'a>,
    lookahead: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            input: InputStream::new(source),
            lookahead: None,
        }
    }

    pub fn next(&mut self) -> Result<Option<Token>, LexError> {
        match self.lookahead.take() {
            Some(token) => Ok(Some(token)),
            None => self.read_next(),
        }
    }

    pub fn peek(&mut self) -> Result<Option<&Token>, LexError> {
        if self.lookahead.is_none() {
            self.lookahead = self.read_next()?;
        }
        Ok(self.lookahead.as_ref())
    }

    pub fn eof(&mut self) -> Result<bool, LexError> {
        Ok(self.peek()?.is_none())
    }

    /// Position of the underlying character stream, used by the parser
    /// for its own diagnostics.
    pub fn position(&self) -> Position {
        self.input.position()
    }

    fn read_next(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            self.read_while(is_whitespace);
            if self.input.peek() == Some('#') {
                self.skip_comment();
                continue;
            }
            break;
        }

        let Some(ch) = self.input.peek() else {
            return Ok(None);
        };

        match ch {
            '"' => Ok(Some(self.read_string())),
            c if c.is_ascii_digit() => self.read_number().map(Some),
            c if is_identifier_start(c) => Ok(Some(self.read_identifier())),
            c if is_punctuation(c) => {
                self.input.next();
                Ok(Some(Token::Punctuation(c)))
            }
            c if is_operator_char(c) => Ok(Some(Token::Operator(self.read_while(is_operator_char)))),
            character => Err(LexError::UnrecognizedCharacter {
                character,
                position: self.input.position(),
            }),
        }
    }

    fn read_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.input.peek() {
            if !predicate(ch) {
                break;
            }
            self.input.next();
            text.push(ch);
        }
        text
    }

    fn skip_comment(&mut self) {
        self.read_while(|ch| ch != '\n');
        self.input.next();
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        // At most one dot; a second one ends the number early.
        let mut seen_dot = false;
        let literal = self.read_while(|ch| {
            if ch != '.' {
                return ch.is_ascii_digit();
            }
            if seen_dot {
                return false;
            }
            seen_dot = true;
            true
        });
        let value = literal.parse().map_err(|_| LexError::InvalidNumber {
            position: self.input.position(),
            literal,
        })?;
        Ok(Token::Number(value))
    }

    fn read_identifier(&mut self) -> Token {
        let identifier = self.read_while(is_identifier_char);
        match KEYWORDS.get(identifier.as_str()) {
            Some(keyword) => Token::Keyword(*keyword),
            None => Token::Ident(identifier),
        }
    }

    /// Reads a string literal. A backslash makes the following character
    /// count as content, whatever it is; there are no named escapes.
    fn read_string(&mut self) -> Token {
        let mut text = String::new();
        let mut escaped = false;
        self.input.next();
        while let Some(ch) = self.input.next() {
            if escaped {
                text.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                break;
            } else {
                text.push(ch);
            }
        }
        Token::String(text)
    }
}

#[cfg(test)]
mod tests {
    use super::{Keyword, LexError, Lexer, Token};

    fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn punctuation_and_operators() {
        let output = tokenize("(){},;[] + <= == && |");

        assert_eq!(
            output,
            vec![
                Token::Punctuation('('),
                Token::Punctuation(')'),
                Token::Punctuation('{'),
                Token::Punctuation('}'),
                Token::Punctuation(','),
                Token::Punctuation(';'),
                Token::Punctuation('['),
                Token::Punctuation(']'),
                Token::Operator("+".to_owned()),
                Token::Operator("<=".to_owned()),
                Token::Operator("==".to_owned()),
                Token::Operator("&&".to_owned()),
                Token::Operator("|".to_owned()),
            ]
        );
    }

    #[test]
    fn lambda_program() {
        let input = "sum = lambda(x, y) x + y; print(sum(2, 3));";
        let expected_output = vec![
            Token::Ident("sum".to_owned()),
            Token::Operator("=".to_owned()),
            Token::Keyword(Keyword::Lambda),
            Token::Punctuation('('),
            Token::Ident("x".to_owned()),
            Token::Punctuation(','),
            Token::Ident("y".to_owned()),
            Token::Punctuation(')'),
            Token::Ident("x".to_owned()),
            Token::Operator("+".to_owned()),
            Token::Ident("y".to_owned()),
            Token::Punctuation(';'),
            Token::Ident("print".to_owned()),
            Token::Punctuation('('),
            Token::Ident("sum".to_owned()),
            Token::Punctuation('('),
            Token::Number(2.0),
            Token::Punctuation(','),
            Token::Number(3.0),
            Token::Punctuation(')'),
            Token::Punctuation(')'),
            Token::Punctuation(';'),
        ];

        assert_eq!(tokenize(input), expected_output);
    }

    #[test]
    fn keywords_and_identifiers() {
        let output = tokenize("if x then λ else lambda true false is-even? _tmp x1");

        assert_eq!(
            output,
            vec![
                Token::Keyword(Keyword::If),
                Token::Ident("x".to_owned()),
                Token::Keyword(Keyword::Then),
                Token::Keyword(Keyword::Lambda),
                Token::Keyword(Keyword::Else),
                Token::Keyword(Keyword::Lambda),
                Token::Keyword(Keyword::True),
                Token::Keyword(Keyword::False),
                Token::Ident("is-even?".to_owned()),
                Token::Ident("_tmp".to_owned()),
                Token::Ident("x1".to_owned()),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let input = "1 # one\n# a whole line\n2";

        assert_eq!(tokenize(input), vec![Token::Number(1.0), Token::Number(2.0)]);
    }

    #[test]
    fn string_escapes_are_literal() {
        let output = tokenize(r#""he said \"hi\"" "a\\b" "a\nb""#);

        assert_eq!(
            output,
            vec![
                Token::String("he said \"hi\"".to_owned()),
                Token::String("a\\b".to_owned()),
                // `\n` is a literal `n`, not a newline
                Token::String("anb".to_owned()),
            ]
        );
    }

    #[test]
    fn numbers() {
        let output = tokenize("5 3.14 0.5");

        assert_eq!(
            output,
            vec![Token::Number(5.0), Token::Number(3.14), Token::Number(0.5)]
        );
    }

    #[test]
    fn second_dot_ends_the_number() {
        let mut lexer = Lexer::new("3.14.15");

        assert_eq!(lexer.next(), Ok(Some(Token::Number(3.14))));
        // The stray dot is not a token of any kind
        assert!(matches!(
            lexer.next(),
            Err(LexError::UnrecognizedCharacter { character: '.', .. })
        ));
    }

    #[test]
    fn unrecognized_character_is_positioned() {
        let mut lexer = Lexer::new("x;\n  @");
        lexer.next().unwrap();
        lexer.next().unwrap();

        let error = lexer.next().unwrap_err();
        assert_eq!(
            error.to_string(),
            "Can't handle character: @ (2:2)".to_owned()
        );
    }

    #[test]
    fn peek_is_memoized() {
        let mut lexer = Lexer::new("a b");

        assert_eq!(lexer.peek(), Ok(Some(&Token::Ident("a".to_owned()))));
        assert_eq!(lexer.peek(), Ok(Some(&Token::Ident("a".to_owned()))));
        assert_eq!(lexer.next(), Ok(Some(Token::Ident("a".to_owned()))));
        assert_eq!(lexer.next(), Ok(Some(Token::Ident("b".to_owned()))));
        assert_eq!(lexer.eof(), Ok(true));
    }

    fn render(tokens: &[Token]) -> String {
        let rendered = tokens.iter().map(|token| match token {
            Token::Number(value) => value.to_string(),
            Token::String(value) => {
                format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Token::Keyword(keyword) => keyword.to_string(),
            Token::Ident(name) => name.clone(),
            Token::Punctuation(ch) => ch.to_string(),
            Token::Operator(op) => op.clone(),
        });
        rendered.collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn retokenizing_rendered_tokens_is_stable() {
        let input = r#"
            fib = lambda(n) if n < 2 then n else fib(n - 1) + fib(n - 2);
            print(fib(10), "done \"quoted\"", 2.5 * 4);
        "#;
        let tokens = tokenize(input);
        let rendered = render(&tokens);

        assert_eq!(tokenize(&rendered), tokens);
    }
}
