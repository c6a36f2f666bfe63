use std::fmt;

/// Enum representing common lexeme types.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Token {
    Illegal(String),
    Eof,

    Ident(String),
    Int(i64),
    String(String),

    /// "="
    Assign,
    /// "+"
    Plus,
    /// "-"
    Minus,
    /// "!"
    Bang,
    /// "*"
    Asterisk,
    /// "/"
    Slash,
    /// "<"
    Lt,
    /// ">"
    Gt,
    /// "=="
    Eq,
    /// "!="
    Ne,
    /// "("
    OpenParen,
    /// ")"
    CloseParen,
    /// "{"
    OpenBrace,
    /// "}"
    CloseBrace,
    /// "["
    OpenBracket,
    /// "]"
    CloseBracket,
    /// ","
    Comma,
    /// ";"
    SemiColon,
    /// ":"
    Colon,

    // Keywords
    /// "fn"
    Function,
    /// "let"
    Let,
    /// "if"
    If,
    /// "else"
    Else,
    /// "true"
    True,
    /// "false"
    False,
    /// "return"
    Return,
}

impl Token {
    /// Returns the name of the token's kind, ignoring any literal it carries. Parser
    /// diagnostics are phrased in terms of these names.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Illegal(_) => "ILLEGAL",
            Token::Eof => "EOF",
            Token::Ident(_) => "IDENT",
            Token::Int(_) => "INT",
            Token::String(_) => "STRING",
            Token::Assign => "ASSIGN",
            Token::Plus => "PLUS",
            Token::Minus => "MINUS",
            Token::Bang => "BANG",
            Token::Asterisk => "ASTERISK",
            Token::Slash => "SLASH",
            Token::Lt => "LT",
            Token::Gt => "GT",
            Token::Eq => "EQ",
            Token::Ne => "NE",
            Token::OpenParen => "LPAREN",
            Token::CloseParen => "RPAREN",
            Token::OpenBrace => "LBRACE",
            Token::CloseBrace => "RBRACE",
            Token::OpenBracket => "LBRACKET",
            Token::CloseBracket => "RBRACKET",
            Token::Comma => "COMMA",
            Token::SemiColon => "SEMICOLON",
            Token::Colon => "COLON",
            Token::Function => "FUNCTION",
            Token::Let => "LET",
            Token::If => "IF",
            Token::Else => "ELSE",
            Token::True => "TRUE",
            Token::False => "FALSE",
            Token::Return => "RETURN",
        }
    }

    /// Whether both tokens are of the same kind, regardless of their literals.
    pub fn same_kind(&self, other: &Token) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Renders the token as `KIND literal`, the format used by the lexing REPL.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let literal = match self {
            Token::Illegal(s) | Token::Ident(s) | Token::String(s) => s.clone(),
            Token::Int(v) => v.to_string(),
            Token::Eof => String::new(),
            Token::Assign => "=".to_owned(),
            Token::Plus => "+".to_owned(),
            Token::Minus => "-".to_owned(),
            Token::Bang => "!".to_owned(),
            Token::Asterisk => "*".to_owned(),
            Token::Slash => "/".to_owned(),
            Token::Lt => "<".to_owned(),
            Token::Gt => ">".to_owned(),
            Token::Eq => "==".to_owned(),
            Token::Ne => "!=".to_owned(),
            Token::OpenParen => "(".to_owned(),
            Token::CloseParen => ")".to_owned(),
            Token::OpenBrace => "{".to_owned(),
            Token::CloseBrace => "}".to_owned(),
            Token::OpenBracket => "[".to_owned(),
            Token::CloseBracket => "]".to_owned(),
            Token::Comma => ",".to_owned(),
            Token::SemiColon => ";".to_owned(),
            Token::Colon => ":".to_owned(),
            Token::Function => "fn".to_owned(),
            Token::Let => "let".to_owned(),
            Token::If => "if".to_owned(),
            Token::Else => "else".to_owned(),
            Token::True => "true".to_owned(),
            Token::False => "false".to_owned(),
            Token::Return => "return".to_owned(),
        };

        if literal.is_empty() {
            write!(f, "{}", self.kind())
        } else {
            write!(f, "{} {}", self.kind(), literal)
        }
    }
}

pub fn lookup_ident(ident: &str) -> Token {
    keyword_to_token(ident).unwrap_or_else(|| Token::Ident(ident.to_owned()))
}

fn keyword_to_token(keyword: &str) -> Option<Token> {
    match keyword {
        "fn" => Some(Token::Function),
        "let" => Some(Token::Let),
        "if" => Some(Token::If),
        "else" => Some(Token::Else),
        "true" => Some(Token::True),
        "false" => Some(Token::False),
        "return" => Some(Token::Return),
        _ => None,
    }
}
