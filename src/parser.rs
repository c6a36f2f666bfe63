use crate::ast::{
    BlockStatement, Expression, HashLiteral, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::lexer::Lexer;
use crate::token::Token;
use log::debug;
use thiserror::Error;

type Result<T> = std::result::Result<T, ParserError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParserError {
    #[error("expected next token to be {}, got {}", .expected.kind(), .got.kind())]
    UnexpectedToken { expected: Token, got: Token },
    #[error("no prefix parse function for {} found", .0.kind())]
    NoPrefixParseFn(Token),
}

/// Parses a whole source text, returning the program or every syntax error found in it.
pub fn parse(input: &str) -> std::result::Result<Program, Vec<ParserError>> {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();

    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors)
    }
}

/// Binding strength of the operators, weakest first. The derived ordering is what
/// `parse_expression` compares.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Equals,      // ==
    LessGreater, // > or <
    Sum,         // +
    Product,     // *
    Prefix,      // -X or !X
    Call,        // myFunction(X)
    Index,       // array[index]
}

fn precedence_of(token: &Token) -> Precedence {
    match token {
        Token::Eq | Token::Ne => Precedence::Equals,
        Token::Lt | Token::Gt => Precedence::LessGreater,
        Token::Plus | Token::Minus => Precedence::Sum,
        Token::Asterisk | Token::Slash => Precedence::Product,
        Token::OpenParen => Precedence::Call,
        Token::OpenBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

fn infix_operator(token: &Token) -> Option<InfixOperator> {
    match token {
        Token::Plus => Some(InfixOperator::Plus),
        Token::Minus => Some(InfixOperator::Minus),
        Token::Asterisk => Some(InfixOperator::Asterisk),
        Token::Slash => Some(InfixOperator::Slash),
        Token::Lt => Some(InfixOperator::Lt),
        Token::Gt => Some(InfixOperator::Gt),
        Token::Eq => Some(InfixOperator::Eq),
        Token::Ne => Some(InfixOperator::NotEq),
        _ => None,
    }
}

/// Parser is a Pratt parser: each token kind that can begin an expression has a prefix rule,
/// and each that can continue one has an infix rule plus a precedence.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParserError>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let mut p = Parser {
            lexer,
            cur_token: Token::Eof,
            peek_token: Token::Eof,
            errors: vec![],
        };

        // Read 2 tokens so that cur_token and peek_token are both initialised
        p.next_token();
        p.next_token();

        p
    }

    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = vec![];

        while self.cur_token != Token::Eof {
            if self.cur_token == Token::SemiColon {
                // empty statement
                self.next_token();
                continue;
            }

            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => self.record_error(err),
            }
            self.next_token();
        }

        Program { statements }
    }

    fn record_error(&mut self, err: ParserError) {
        debug!("recording parse error: {}", err);
        self.errors.push(err);
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.cur_token {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Result<Statement> {
        let name = self.expect_peek_ident()?;

        self.expect_peek(Token::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Statement::Let(name, value))
    }

    fn parse_return_statement(&mut self) -> Result<Statement> {
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Statement::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Result<Statement> {
        let exp = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Statement::Expression(exp))
    }

    fn skip_semicolon(&mut self) {
        if self.peek_token == Token::SemiColon {
            self.next_token();
        }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression> {
        let mut left = self.parse_prefix()?;

        while self.peek_token != Token::SemiColon && precedence < precedence_of(&self.peek_token)
        {
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expression> {
        match &self.cur_token {
            Token::Ident(name) => Ok(Expression::Identifier(name.clone())),
            Token::Int(value) => Ok(Expression::IntegerLiteral(*value)),
            Token::String(value) => Ok(Expression::StringLiteral(value.clone())),
            Token::True => Ok(Expression::Boolean(true)),
            Token::False => Ok(Expression::Boolean(false)),
            Token::Bang => self.parse_prefix_expression(PrefixOperator::Bang),
            Token::Minus => self.parse_prefix_expression(PrefixOperator::Minus),
            Token::OpenParen => self.parse_grouped_expression(),
            Token::If => self.parse_if_expression(),
            Token::Function => self.parse_function_literal(),
            Token::OpenBracket => {
                let elements = self.parse_expression_list(Token::CloseBracket)?;
                Ok(Expression::ArrayLiteral(elements))
            }
            Token::OpenBrace => self.parse_hash_literal(),
            token => Err(ParserError::NoPrefixParseFn(token.clone())),
        }
    }

    /// Called with `cur_token` on the operator. Only tokens with a precedence above `Lowest`
    /// reach here, and each of those has an infix rule.
    fn parse_infix(&mut self, left: Expression) -> Result<Expression> {
        match self.cur_token {
            Token::OpenParen => {
                let arguments = self.parse_expression_list(Token::CloseParen)?;
                Ok(Expression::Call(Box::new(left), arguments))
            }
            Token::OpenBracket => self.parse_index_expression(left),
            _ => match infix_operator(&self.cur_token) {
                Some(operator) => self.parse_infix_expression(operator, left),
                None => Err(ParserError::NoPrefixParseFn(self.cur_token.clone())),
            },
        }
    }

    fn parse_prefix_expression(&mut self, operator: PrefixOperator) -> Result<Expression> {
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix(operator, Box::new(right)))
    }

    fn parse_infix_expression(
        &mut self,
        operator: InfixOperator,
        left: Expression,
    ) -> Result<Expression> {
        let precedence = precedence_of(&self.cur_token);
        self.next_token();

        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix(operator, Box::new(left), Box::new(right)))
    }

    fn parse_grouped_expression(&mut self) -> Result<Expression> {
        self.next_token();

        let exp = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::CloseParen)?;

        Ok(exp)
    }

    fn parse_index_expression(&mut self, left: Expression) -> Result<Expression> {
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::CloseBracket)?;

        Ok(Expression::Index(Box::new(left), Box::new(index)))
    }

    fn parse_if_expression(&mut self) -> Result<Expression> {
        self.expect_peek(Token::OpenParen)?;
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::CloseParen)?;
        self.expect_peek(Token::OpenBrace)?;

        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_token == Token::Else {
            self.next_token();
            self.expect_peek(Token::OpenBrace)?;

            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Ok(Expression::If(Box::new(condition), consequence, alternative))
    }

    /// Called with `cur_token` on the opening brace; leaves `cur_token` on the closing one. A
    /// statement that fails to parse is recorded and skipped so the block can still close.
    fn parse_block_statement(&mut self) -> Result<BlockStatement> {
        let mut statements = vec![];
        self.next_token();

        while self.cur_token != Token::CloseBrace {
            if self.cur_token == Token::Eof {
                return Err(ParserError::UnexpectedToken {
                    expected: Token::CloseBrace,
                    got: Token::Eof,
                });
            }

            if self.cur_token != Token::SemiColon {
                match self.parse_statement() {
                    Ok(stmt) => statements.push(stmt),
                    Err(err) => self.record_error(err),
                }
            }
            self.next_token();
        }

        Ok(BlockStatement { statements })
    }

    fn parse_function_literal(&mut self) -> Result<Expression> {
        self.expect_peek(Token::OpenParen)?;

        let parameters = self.parse_function_parameters()?;

        self.expect_peek(Token::OpenBrace)?;

        let body = self.parse_block_statement()?;

        Ok(Expression::FunctionLiteral(parameters, body))
    }

    fn parse_function_parameters(&mut self) -> Result<Vec<String>> {
        let mut identifiers = vec![];

        if self.peek_token == Token::CloseParen {
            self.next_token();
            return Ok(identifiers);
        }

        identifiers.push(self.expect_peek_ident()?);

        while self.peek_token == Token::Comma {
            self.next_token();
            identifiers.push(self.expect_peek_ident()?);
        }

        self.expect_peek(Token::CloseParen)?;

        Ok(identifiers)
    }

    /// Parses a comma-separated list of expressions up to `end`. Called with `cur_token` on the
    /// opening delimiter.
    fn parse_expression_list(&mut self, end: Token) -> Result<Vec<Expression>> {
        let mut list = vec![];

        if self.peek_token == end {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token == Token::Comma {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;

        Ok(list)
    }

    fn parse_hash_literal(&mut self) -> Result<Expression> {
        let mut hash = HashLiteral::default();

        while self.peek_token != Token::CloseBrace {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(Token::Colon)?;
            self.next_token();

            let value = self.parse_expression(Precedence::Lowest)?;
            hash.pairs.push((key, value));

            if self.peek_token != Token::CloseBrace {
                self.expect_peek(Token::Comma)?;
            }
        }

        self.expect_peek(Token::CloseBrace)?;

        Ok(Expression::HashLiteral(hash))
    }

    /// Advances if the next token is of the same kind as `token`, otherwise reports what was
    /// found instead.
    fn expect_peek(&mut self, token: Token) -> Result<()> {
        if !self.peek_token.same_kind(&token) {
            return Err(ParserError::UnexpectedToken {
                expected: token,
                got: self.peek_token.clone(),
            });
        }

        self.next_token();
        Ok(())
    }

    fn expect_peek_ident(&mut self) -> Result<String> {
        if let Token::Ident(ident) = &self.peek_token {
            let ident = ident.clone();
            self.next_token();
            Ok(ident)
        } else {
            Err(ParserError::UnexpectedToken {
                expected: Token::Ident(String::new()),
                got: self.peek_token.clone(),
            })
        }
    }
}
