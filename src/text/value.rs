//! Generic GAP-style record values and their recursive-descent parser.
//!
//! The grammar covers what automaton records use:
//!
//! ```text
//! value  := int | string | ident | "true" | "false" | "_" | list | range | record
//! list   := "[" [value ("," value)*] "]"
//! range  := "[" int ".." int "]"
//! record := "rec" "(" [ident ":=" value ("," ident ":=" value)*] ")"
//! ```
//!
//! `#` starts a comment running to the end of the line.

use crate::error::{FsaError, Result};

/// A parsed value with the line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    /// 1-based line number
    pub line: usize,
    /// The value itself
    pub kind: Kind,
}

/// The kinds of record values.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// An integer
    Int(i64),
    /// `true` or `false`
    Bool(bool),
    /// A double-quoted string
    Str(String),
    /// A bare identifier
    Ident(String),
    /// `_`
    Blank,
    /// `[a, b, ...]`
    List(Vec<Value>),
    /// `[a..b]`
    Range(i64, i64),
    /// `rec(name := value, ...)`
    Record(Vec<(String, Value)>),
}

impl Value {
    fn error(&self, message: impl Into<String>) -> FsaError {
        FsaError::parse(self.line, message)
    }

    /// Look up a record field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match &self.kind {
            Kind::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// A record field that must be present.
    pub fn required(&self, name: &str) -> Result<&Value> {
        self.field(name)
            .ok_or_else(|| self.error(format!("missing field `{}`", name)))
    }

    /// The value as an integer.
    pub fn as_int(&self) -> Result<i64> {
        match self.kind {
            Kind::Int(i) => Ok(i),
            _ => Err(self.error("expected an integer")),
        }
    }

    /// The value as a non-negative integer.
    pub fn as_usize(&self) -> Result<usize> {
        let i = self.as_int()?;
        usize::try_from(i).map_err(|_| self.error(format!("{} is negative", i)))
    }

    /// The value as a string; identifiers are accepted too.
    pub fn as_str(&self) -> Result<&str> {
        match &self.kind {
            Kind::Str(s) | Kind::Ident(s) => Ok(s),
            _ => Err(self.error("expected a string")),
        }
    }

    /// The value as a list. A range is not a list here.
    pub fn as_list(&self) -> Result<&[Value]> {
        match &self.kind {
            Kind::List(items) => Ok(items),
            _ => Err(self.error("expected a list")),
        }
    }

    /// The value as a list of integers, expanding a range.
    pub fn as_int_list(&self) -> Result<Vec<i64>> {
        match &self.kind {
            Kind::Range(a, b) => Ok((*a..=*b).collect()),
            Kind::List(items) => items.iter().map(Value::as_int).collect(),
            _ => Err(self.error("expected a list of integers")),
        }
    }

    /// Build a parse error located at this value.
    pub fn invalid(&self, message: impl Into<String>) -> FsaError {
        self.error(message)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Assign,
    DotDot,
    Semicolon,
    End,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Lexer {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    fn skip_blanks(&mut self) {
        while let Some(&c) = self.chars.peek() {
            match c {
                '\n' => {
                    self.line += 1;
                    self.chars.next();
                }
                '#' => {
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                _ => break,
            }
        }
    }

    /// The next token and the line it starts on.
    fn next_token(&mut self) -> Result<(Token, usize)> {
        self.skip_blanks();
        let line = self.line;
        let c = match self.chars.next() {
            Some(c) => c,
            None => return Ok((Token::End, line)),
        };
        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            ':' => {
                if self.chars.next() != Some('=') {
                    return Err(FsaError::parse(line, "expected `:=`"));
                }
                Token::Assign
            }
            '.' => {
                if self.chars.next() != Some('.') {
                    return Err(FsaError::parse(line, "expected `..`"));
                }
                Token::DotDot
            }
            '"' => Token::Str(self.string(line)?),
            '-' | '0'..='9' => {
                let mut digits = String::from(c);
                while let Some(&d) = self.chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    self.chars.next();
                }
                let value = digits
                    .parse()
                    .map_err(|_| FsaError::parse(line, format!("bad number `{}`", digits)))?;
                Token::Int(value)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::from(c);
                while let Some(&d) = self.chars.peek() {
                    if !(d.is_alphanumeric() || d == '_') {
                        break;
                    }
                    name.push(d);
                    self.chars.next();
                }
                Token::Ident(name)
            }
            other => return Err(FsaError::parse(line, format!("unexpected character `{}`", other))),
        };
        Ok((token, line))
    }

    fn string(&mut self, line: usize) -> Result<String> {
        let mut s = String::new();
        loop {
            match self.chars.next() {
                None => return Err(FsaError::parse(line, "unterminated string")),
                Some('"') => return Ok(s),
                Some('\\') => match self.chars.next() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err(FsaError::parse(line, "unterminated string")),
                },
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    s.push(c);
                }
            }
        }
    }
}

/// Recursive-descent parser over the token stream with one token of lookahead.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    token: Token,
    line: usize,
}

impl<'a> Parser<'a> {
    /// Start parsing `text`.
    pub fn new(text: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(text);
        let (token, line) = lexer.next_token()?;
        Ok(Parser { lexer, token, line })
    }

    fn advance(&mut self) -> Result<Token> {
        let (next, line) = self.lexer.next_token()?;
        self.line = line;
        Ok(std::mem::replace(&mut self.token, next))
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<()> {
        if self.token == expected {
            self.advance()?;
            Ok(())
        } else {
            Err(FsaError::parse(
                self.line,
                format!("expected {}, found {:?}", what, self.token),
            ))
        }
    }

    /// Parse `name := value;` and return the name and value. A bare value
    /// without an assignment gets an empty name.
    pub fn assignment(&mut self) -> Result<(String, Value)> {
        let value = self.value()?;
        let result = match (&value.kind, &self.token) {
            (Kind::Ident(name), Token::Assign) => {
                let name = name.clone();
                self.advance()?;
                (name, self.value()?)
            }
            _ => (String::new(), value),
        };
        if self.token == Token::Semicolon {
            self.advance()?;
        }
        Ok(result)
    }

    /// True once all input has been consumed.
    pub fn at_end(&self) -> bool {
        self.token == Token::End
    }

    /// Parse one value.
    pub fn value(&mut self) -> Result<Value> {
        let line = self.line;
        let kind = match self.advance()? {
            Token::Int(i) => Kind::Int(i),
            Token::Str(s) => Kind::Str(s),
            Token::Ident(name) => match name.as_str() {
                "true" => Kind::Bool(true),
                "false" => Kind::Bool(false),
                "_" => Kind::Blank,
                "rec" => self.record()?,
                _ => Kind::Ident(name),
            },
            Token::LBracket => self.list()?,
            other => {
                return Err(FsaError::parse(line, format!("unexpected {:?}", other)));
            }
        };
        Ok(Value { line, kind })
    }

    fn list(&mut self) -> Result<Kind> {
        let mut items = Vec::new();
        if self.token == Token::RBracket {
            self.advance()?;
            return Ok(Kind::List(items));
        }
        let first = self.value()?;
        if self.token == Token::DotDot {
            self.advance()?;
            let last = self.value()?;
            self.expect(Token::RBracket, "`]`")?;
            return Ok(Kind::Range(first.as_int()?, last.as_int()?));
        }
        items.push(first);
        while self.token == Token::Comma {
            self.advance()?;
            items.push(self.value()?);
        }
        self.expect(Token::RBracket, "`,` or `]`")?;
        Ok(Kind::List(items))
    }

    fn record(&mut self) -> Result<Kind> {
        self.expect(Token::LParen, "`(`")?;
        let mut fields = Vec::new();
        while self.token != Token::RParen {
            let line = self.line;
            let name = match self.advance()? {
                Token::Ident(name) => name,
                other => {
                    return Err(FsaError::parse(line, format!("expected a field name, found {:?}", other)));
                }
            };
            self.expect(Token::Assign, "`:=`")?;
            fields.push((name, self.value()?));
            if self.token == Token::Comma {
                self.advance()?;
            } else if self.token != Token::RParen {
                return Err(FsaError::parse(self.line, "expected `,` or `)`"));
            }
        }
        self.advance()?;
        Ok(Kind::Record(fields))
    }
}
