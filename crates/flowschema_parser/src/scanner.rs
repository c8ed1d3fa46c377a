//! The scanner/lexer.
//!
//! Converts source text into a flat token stream. Comments are trivia, but
//! the text of the comment immediately preceding a token is kept on that
//! token so the parser can attach it to object properties for the pragma
//! micro-parser.

use flowschema_core::text::{LineMap, TextSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Str,
    Num,
    LBrace,
    RBrace,
    /// `{|` — Flow exact object open.
    ExactLBrace,
    /// `|}` — Flow exact object close.
    ExactRBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Comma,
    Semi,
    Colon,
    Question,
    Pipe,
    Amp,
    Eq,
    /// `=>`
    Arrow,
    Dot,
    /// `...`
    Ellipsis,
    Minus,
    Plus,
    Star,
    Eof,
    /// Anything else; only ever consumed while skipping statements.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Identifier text, string value, or number text. Empty for puncts.
    pub value: String,
    pub span: TextSpan,
    /// Text of the comment immediately before this token, if any.
    pub leading_comment: Option<String>,
}

impl Token {
    /// Whether this token is the identifier `word`.
    pub fn is_ident(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.value == word
    }
}

/// The scanner walks the text once and produces the full token vector.
pub struct Scanner {
    text: Vec<char>,
    pos: usize,
    /// Comment text accumulated since the last token.
    pending_comment: Option<String>,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            pos: 0,
            pending_comment: None,
        }
    }

    /// Tokenize the whole input. The final token is always `Eof`.
    pub fn tokenize(text: &str) -> (Vec<Token>, LineMap) {
        let mut scanner = Scanner::new(text);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, LineMap::new(text))
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> char {
        if self.is_eof() { '\0' } else { self.text[self.pos] }
    }

    fn peek_at(&self, offset: usize) -> char {
        let i = self.pos + offset;
        if i >= self.text.len() { '\0' } else { self.text[i] }
    }

    fn bump(&mut self) -> char {
        let ch = self.peek();
        self.pos += 1;
        ch
    }

    fn skip_trivia(&mut self) {
        loop {
            let ch = self.peek();
            if ch.is_whitespace() {
                self.pos += 1;
            } else if ch == '/' && self.peek_at(1) == '/' {
                self.pos += 2;
                let start = self.pos;
                while !self.is_eof() && self.peek() != '\n' {
                    self.pos += 1;
                }
                let comment: String = self.text[start..self.pos].iter().collect();
                self.pending_comment = Some(comment.trim().to_string());
            } else if ch == '/' && self.peek_at(1) == '*' {
                self.pos += 2;
                let start = self.pos;
                while !self.is_eof() && !(self.peek() == '*' && self.peek_at(1) == '/') {
                    self.pos += 1;
                }
                let comment: String = self.text[start..self.pos].iter().collect();
                self.pos = (self.pos + 2).min(self.text.len());
                self.pending_comment = Some(comment.trim().to_string());
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let leading_comment = self.pending_comment.take();
        let start = self.pos as u32;
        if self.is_eof() {
            return self.token(TokenKind::Eof, start, String::new(), leading_comment);
        }

        let ch = self.peek();
        if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let mut value = String::new();
            while {
                let c = self.peek();
                c.is_alphanumeric() || c == '_' || c == '$'
            } {
                value.push(self.bump());
            }
            return self.token(TokenKind::Ident, start, value, leading_comment);
        }
        if ch.is_ascii_digit() {
            return self.scan_number(start, leading_comment);
        }
        if ch == '\'' || ch == '"' {
            return self.scan_string(start, leading_comment);
        }

        let kind = match self.bump() {
            '{' => {
                if self.peek() == '|' {
                    self.pos += 1;
                    TokenKind::ExactLBrace
                } else {
                    TokenKind::LBrace
                }
            }
            '}' => TokenKind::RBrace,
            '|' => {
                if self.peek() == '}' {
                    self.pos += 1;
                    TokenKind::ExactRBrace
                } else {
                    TokenKind::Pipe
                }
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semi,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Question,
            '&' => TokenKind::Amp,
            '=' => {
                if self.peek() == '>' {
                    self.pos += 1;
                    TokenKind::Arrow
                } else {
                    TokenKind::Eq
                }
            }
            '.' => {
                if self.peek() == '.' && self.peek_at(1) == '.' {
                    self.pos += 2;
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            '-' => TokenKind::Minus,
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            _ => TokenKind::Unknown,
        };
        self.token(kind, start, String::new(), leading_comment)
    }

    fn scan_number(&mut self, start: u32, leading_comment: Option<String>) -> Token {
        let mut value = String::new();
        while self.peek().is_ascii_digit() {
            value.push(self.bump());
        }
        if self.peek() == '.' && self.peek_at(1).is_ascii_digit() {
            value.push(self.bump());
            while self.peek().is_ascii_digit() {
                value.push(self.bump());
            }
        }
        self.token(TokenKind::Num, start, value, leading_comment)
    }

    fn scan_string(&mut self, start: u32, leading_comment: Option<String>) -> Token {
        let quote = self.bump();
        let mut value = String::new();
        while !self.is_eof() && self.peek() != quote {
            let ch = self.bump();
            if ch == '\\' && !self.is_eof() {
                let escaped = self.bump();
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            } else {
                value.push(ch);
            }
        }
        if !self.is_eof() {
            self.pos += 1; // closing quote
        }
        self.token(TokenKind::Str, start, value, leading_comment)
    }

    fn token(
        &self,
        kind: TokenKind,
        start: u32,
        value: String,
        leading_comment: Option<String>,
    ) -> Token {
        Token {
            kind,
            value,
            span: TextSpan::new(start, self.pos as u32),
            leading_comment,
        }
    }
}
