//! Pratt parser for Rilla.
//!
//! The parser consumes tokens from a [`Lexer`] and builds a [`Program`].
//! Malformed input never aborts the parse: the offending production
//! records a `PAR001`/`PAR002` diagnostic (and a plain-text message in
//! the legacy error log), yields nothing, and parsing resumes at the
//! next token. A program that produced parser errors is reported, never
//! evaluated.
//!
//! Expressions are parsed with precedence climbing: each token kind may
//! act as a prefix (start of an expression) and as an infix (continuing
//! an expression to its left), and the binding strength of the upcoming
//! token decides whether the loop keeps extending the current expression.
//!
//! # Example
//!
//! ```rust
//! use rilla::lexer::Lexer;
//! use rilla::parser::Parser;
//!
//! let mut parser = Parser::new(Lexer::new("let x = 1 + 2 * 3;"));
//! let program = parser.parse_program();
//!
//! assert!(parser.errors().is_empty());
//! assert_eq!(program.to_string(), "let x = (1 + (2 * 3));");
//! ```

use crate::ast::{Block, Expression, Identifier, Program, Statement};
use crate::diag::{Diagnostic, Level};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Operator binding strength, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    /// `== != && || =`
    Equals,
    /// `< > <= >=`
    LessGreater,
    /// `+ - += -=`
    Sum,
    /// `* /`
    Product,
    /// `**`
    Power,
    /// Unary `- ! ++ --`
    Prefix,
    /// Call `(`
    Call,
    /// Member `.`
    Select,
    /// Index `[` and postfix `++` `--`
    Index,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Equals
        | TokenKind::NotEqual
        | TokenKind::And
        | TokenKind::Or
        | TokenKind::Assign => Precedence::Equals,
        TokenKind::LessThan
        | TokenKind::GreaterThan
        | TokenKind::LessEqual
        | TokenKind::GreaterEqual => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus | TokenKind::SumAssign | TokenKind::SubAssign => {
            Precedence::Sum
        }
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::StarStar => Precedence::Power,
        TokenKind::LeftParen => Precedence::Call,
        TokenKind::Dot => Precedence::Select,
        TokenKind::LeftBracket | TokenKind::PlusPlus | TokenKind::MinusMinus => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// Compound assignments are stored with their base operator so the
/// evaluator can reuse the plain arithmetic path; the original token
/// keeps the compound spelling for error messages.
fn infix_operator_literal(token: &Token) -> String {
    match token.kind {
        TokenKind::SumAssign => "+".to_string(),
        TokenKind::SubAssign => "-".to_string(),
        _ => token.literal.clone(),
    }
}

/// The Rilla parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    errors: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over a lexer, primed on the first two tokens.
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Returns the plain-text error log accumulated so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns the parser's structured diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns the diagnostics accumulated by the underlying lexer.
    pub fn lexer_diagnostics(&self) -> &[Diagnostic] {
        self.lexer.diagnostics()
    }

    fn next_token(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    /// Advances when the peek token has the expected kind; otherwise
    /// records a `PAR001` diagnostic and leaves the cursor alone.
    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.next_token();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        let message = format!(
            "Expected next token to be {}, got {} instead",
            expected, self.peek.kind
        );
        self.errors.push(message.clone());
        self.diagnostics.push(Diagnostic {
            level: Level::Error,
            code: "PAR001".to_string(),
            message,
            hint: Some("Check the previous expression or a possible missing ';'".to_string()),
            range: self.peek.range,
        });
    }

    fn no_prefix_parse_fn_error(&mut self) {
        let message = format!("No prefix parse function for {} found", self.current.kind);
        self.errors.push(message.clone());
        self.diagnostics.push(Diagnostic {
            level: Level::Error,
            code: "PAR002".to_string(),
            message,
            hint: Some("Unexpected token at the beginning of an expression".to_string()),
            range: self.current.range,
        });
    }

    fn literal_error(&mut self, code: &str, type_name: &str) {
        let message = format!(
            "Could not parse {:?} as {type_name}",
            self.current.literal
        );
        self.errors.push(message.clone());
        self.diagnostics.push(Diagnostic {
            level: Level::Error,
            code: code.to_string(),
            message,
            hint: Some("Value out of range or invalid format".to_string()),
            range: self.current.range,
        });
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        precedence_of(self.current.kind)
    }

    /// Parses the whole token stream into a program.
    ///
    /// Statements that fail to parse are dropped; their diagnostics stay.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.current_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }
        program
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Import => self.parse_import_statement(),
            TokenKind::Break => {
                let token = self.current.clone();
                self.skip_optional_semicolon();
                Some(Statement::Break { token })
            }
            TokenKind::Continue => {
                let token = self.current.clone();
                self.skip_optional_semicolon();
                Some(Statement::Continue { token })
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        if !self.expect_peek(TokenKind::Identifier) {
            return None;
        }
        let name = Identifier {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        };
        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Some(Statement::Let { token, name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Some(Statement::Return { token, value })
    }

    fn parse_import_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        if !self.expect_peek(TokenKind::String) {
            return None;
        }
        let path = self.current.clone();

        if !self.expect_peek(TokenKind::As) {
            let message = "Expected 'as' after import path".to_string();
            self.errors.push(message.clone());
            self.diagnostics.push(Diagnostic {
                level: Level::Error,
                code: "IMP001".to_string(),
                message,
                hint: Some("The correct form is: import \"path\" as alias;".to_string()),
                range: self.peek.range,
            });
            return None;
        }
        if !self.expect_peek(TokenKind::Identifier) {
            return None;
        }
        let alias = Identifier {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        };
        self.skip_optional_semicolon();
        Some(Statement::Import { token, path, alias })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Some(Statement::Expression { token, expression })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            left = match self.peek.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Asterisk
                | TokenKind::Slash
                | TokenKind::StarStar
                | TokenKind::Assign
                | TokenKind::Equals
                | TokenKind::NotEqual
                | TokenKind::LessThan
                | TokenKind::GreaterThan
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
                | TokenKind::SumAssign
                | TokenKind::SubAssign
                | TokenKind::And
                | TokenKind::Or => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                TokenKind::LeftParen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                TokenKind::LeftBracket => {
                    self.next_token();
                    self.parse_index_expression(left)?
                }
                TokenKind::Dot => {
                    self.next_token();
                    self.parse_member_expression(left)?
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    self.next_token();
                    self.parse_postfix_expression(left)
                }
                _ => return Some(left),
            };
        }

        Some(left)
    }

    /// Dispatches on the current token as the start of an expression.
    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.current.kind {
            TokenKind::Identifier => Some(self.parse_identifier()),
            TokenKind::Integer => self.parse_integer_literal(),
            TokenKind::Float => self.parse_float_literal(),
            TokenKind::String => Some(self.parse_string_literal()),
            TokenKind::True | TokenKind::False => Some(self.parse_boolean_literal()),
            TokenKind::Bang
            | TokenKind::Minus
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => self.parse_prefix_expression(),
            TokenKind::LeftParen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::While => self.parse_while_expression(),
            TokenKind::For => self.parse_for_expression(),
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_hash_literal(),
            _ => {
                self.no_prefix_parse_fn_error();
                None
            }
        }
    }

    fn parse_identifier(&self) -> Expression {
        Expression::Identifier(Identifier {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        })
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral { token, value }),
            Err(_) => {
                self.literal_error("LIT001", "integer");
                None
            }
        }
    }

    fn parse_float_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        match token.literal.parse::<f64>() {
            Ok(value) => Some(Expression::FloatLiteral { token, value }),
            Err(_) => {
                self.literal_error("LIT002", "float");
                None
            }
        }
    }

    fn parse_string_literal(&self) -> Expression {
        Expression::StringLiteral {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        }
    }

    fn parse_boolean_literal(&self) -> Expression {
        Expression::BooleanLiteral {
            token: self.current.clone(),
            value: self.current_is(TokenKind::True),
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let operator = token.literal.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            token,
            operator,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RightParen) {
            return None;
        }
        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        if !self.expect_peek(TokenKind::LeftParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RightParen) {
            return None;
        }
        if !self.expect_peek(TokenKind::LeftBrace) {
            return None;
        }
        let consequence = self.parse_block();

        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LeftBrace) {
                return None;
            }
            Some(self.parse_block())
        } else {
            None
        };

        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Parses `while (<condition>) { <body> }`.
    fn parse_while_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        if !self.expect_peek(TokenKind::LeftParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RightParen) {
            return None;
        }
        if !self.expect_peek(TokenKind::LeftBrace) {
            return None;
        }
        let body = self.parse_block();

        Some(Expression::While {
            token,
            init: None,
            condition: Some(Box::new(condition)),
            post: None,
            body,
        })
    }

    /// Parses `for (<init>; <condition>; <post>) { <body> }`.
    ///
    /// Any of the three clauses may be empty; `for (;;) { ... }` loops
    /// forever.
    fn parse_for_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        if !self.expect_peek(TokenKind::LeftParen) {
            return None;
        }

        self.next_token();
        let init = if self.current_is(TokenKind::Semicolon) {
            None
        } else if self.current_is(TokenKind::Let) {
            Some(Box::new(self.parse_let_statement()?))
        } else {
            let stmt_token = self.current.clone();
            let expression = self.parse_expression(Precedence::Lowest)?;
            self.skip_optional_semicolon();
            Some(Box::new(Statement::Expression {
                token: stmt_token,
                expression,
            }))
        };
        // The init clause consumes its own terminator above.
        if !self.current_is(TokenKind::Semicolon) {
            self.expect_peek(TokenKind::Semicolon);
            return None;
        }

        let condition = if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
            None
        } else {
            self.next_token();
            let cond = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenKind::Semicolon) {
                return None;
            }
            Some(Box::new(cond))
        };

        let post = if self.peek_is(TokenKind::RightParen) {
            None
        } else {
            self.next_token();
            Some(Box::new(self.parse_expression(Precedence::Lowest)?))
        };
        if !self.expect_peek(TokenKind::RightParen) {
            return None;
        }
        if !self.expect_peek(TokenKind::LeftBrace) {
            return None;
        }
        let body = self.parse_block();

        Some(Expression::While {
            token,
            init,
            condition,
            post,
            body,
        })
    }

    fn parse_block(&mut self) -> Block {
        let token = self.current.clone();
        let mut statements = Vec::new();
        self.next_token();
        while !self.current_is(TokenKind::RightBrace) && !self.current_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }
        Block { token, statements }
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        if !self.expect_peek(TokenKind::LeftParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(TokenKind::LeftBrace) {
            return None;
        }
        let body = self.parse_block();
        Some(Expression::FunctionLiteral {
            token,
            parameters,
            body,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut identifiers = Vec::new();
        if self.peek_is(TokenKind::RightParen) {
            self.next_token();
            return Some(identifiers);
        }

        self.next_token();
        identifiers.push(Identifier {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        });
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            identifiers.push(Identifier {
                token: self.current.clone(),
                value: self.current.literal.clone(),
            });
        }

        if !self.expect_peek(TokenKind::RightParen) {
            return None;
        }
        Some(identifiers)
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let elements = self.parse_expression_list(TokenKind::RightBracket)?;
        Some(Expression::ArrayLiteral { token, elements })
    }

    /// Parses a comma-separated expression list ending at `end`.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let mut pairs = Vec::new();

        while !self.peek_is(TokenKind::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            // A trailing comma before `}` is permitted but not required.
            if !self.peek_is(TokenKind::RightBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenKind::RightBrace) {
            return None;
        }
        Some(Expression::HashLiteral { token, pairs })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let operator = infix_operator_literal(&token);
        let precedence = self.current_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            token,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let arguments = self.parse_expression_list(TokenKind::RightParen)?;
        Some(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current.clone();
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RightBracket) {
            return None;
        }
        Some(Expression::Index {
            token,
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_member_expression(&mut self, object: Expression) -> Option<Expression> {
        let token = self.current.clone();
        if !self.expect_peek(TokenKind::Identifier) {
            return None;
        }
        let property = Identifier {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        };
        Some(Expression::Member {
            token,
            object: Box::new(object),
            property,
        })
    }

    fn parse_postfix_expression(&mut self, left: Expression) -> Expression {
        let token = self.current.clone();
        let operator = token.literal.clone();
        Expression::Postfix {
            token,
            operator,
            left: Box::new(left),
        }
    }
}
