use std::iter::Peekable;
use std::str::Chars;

use crate::token;
use crate::token::Token;

/// Lexer turns source text into a stream of tokens, one `next_token` call at a time.
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    fn read_char(&mut self) -> Option<char> {
        self.input.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    /// Consumes the next char only if it satisfies the predicate.
    fn next_if<F>(&mut self, predicate: F) -> Option<char>
    where
        F: FnOnce(char) -> bool,
    {
        self.input.next_if(|c| predicate(*c))
    }

    fn read_identifier(&mut self, first: char) -> String {
        let mut ident = String::new();
        ident.push(first);

        while let Some(c) = self.next_if(is_id_continue) {
            ident.push(c);
        }

        ident
    }

    fn read_number(&mut self, first: char) -> Token {
        let mut number = String::new();
        number.push(first);

        while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
            number.push(c);
        }

        match number.parse() {
            Ok(value) => Token::Int(value),
            Err(_) => Token::Illegal(number),
        }
    }

    fn read_string(&mut self) -> String {
        let mut res = String::new();

        while let Some(c) = self.next_if(|c| c != '"') {
            res.push(c);
        }

        // Consume the closing '"'
        self.read_char();

        res
    }

    fn skip_whitespace(&mut self) {
        while self.next_if(|c| c.is_whitespace()).is_some() {}
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.read_char() {
            Some('=') => {
                if let Some('=') = self.peek_char() {
                    self.read_char();
                    Token::Eq
                } else {
                    Token::Assign
                }
            }
            Some('+') => Token::Plus,
            Some('!') => {
                if let Some('=') = self.peek_char() {
                    self.read_char();
                    Token::Ne
                } else {
                    Token::Bang
                }
            }
            Some('-') => Token::Minus,
            Some('*') => Token::Asterisk,
            Some('/') => Token::Slash,
            Some('<') => Token::Lt,
            Some('>') => Token::Gt,
            Some('(') => Token::OpenParen,
            Some(')') => Token::CloseParen,
            Some('{') => Token::OpenBrace,
            Some('}') => Token::CloseBrace,
            Some('[') => Token::OpenBracket,
            Some(']') => Token::CloseBracket,
            Some(',') => Token::Comma,
            Some(';') => Token::SemiColon,
            Some(':') => Token::Colon,
            Some('"') => Token::String(self.read_string()),
            Some(c) => {
                if is_id_start(c) {
                    token::lookup_ident(&self.read_identifier(c))
                } else if c.is_ascii_digit() {
                    self.read_number(c)
                } else {
                    Token::Illegal(c.to_string())
                }
            }
            None => Token::Eof,
        }
    }
}

/// Iterates over the tokens up to, but excluding, `Eof`.
impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.next_token() {
            Token::Eof => None,
            token => Some(token),
        }
    }
}

fn is_id_start(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_uppercase() || c == '_'
}

fn is_id_continue(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}
