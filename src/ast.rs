//! Abstract syntax tree for Rilla.
//!
//! Every node carries the token that introduced it, so each node can be
//! traced back to a source range. The `Display` implementations produce
//! the canonical text form of a program: a deterministic, fully
//! parenthesized rendering used by the parser-mode REPL and by tests.
//!
//! # Example
//!
//! ```rust
//! use rilla::lexer::Lexer;
//! use rilla::parser::Parser;
//!
//! let mut parser = Parser::new(Lexer::new("a + b * c;"));
//! let program = parser.parse_program();
//! assert_eq!(program.to_string(), "(a + (b * c))");
//! ```

use std::fmt;

use crate::token::Token;

/// A complete parsed program: a sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Top-level statements in source order
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

/// A name appearing in the source, with its token.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// The identifier token
    pub token: Token,
    /// The name itself
    pub value: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A braced sequence of statements.
///
/// Blocks appear as the bodies of `if`, `while`/`for`, and function
/// literals. The canonical text form concatenates the statement texts
/// without braces.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The `{` token that opened the block
    pub token: Token,
    /// Statements in source order
    pub statements: Vec<Statement>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let <name> = <value>;`
    Let {
        /// The `let` token
        token: Token,
        /// The bound name
        name: Identifier,
        /// The bound value
        value: Expression,
    },
    /// `return <value>;`
    Return {
        /// The `return` token
        token: Token,
        /// The returned value
        value: Expression,
    },
    /// A bare expression used as a statement
    Expression {
        /// First token of the expression
        token: Token,
        /// The expression itself
        expression: Expression,
    },
    /// `break;`
    Break {
        /// The `break` token
        token: Token,
    },
    /// `continue;`
    Continue {
        /// The `continue` token
        token: Token,
    },
    /// `import "<path>" as <alias>;`
    Import {
        /// The `import` token
        token: Token,
        /// The string token holding the import path
        path: Token,
        /// The local alias for the imported module
        alias: Identifier,
    },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value, .. } => write!(f, "let {name} = {value};"),
            Statement::Return { value, .. } => write!(f, "return {value};"),
            Statement::Expression { expression, .. } => write!(f, "{expression}"),
            Statement::Break { .. } => write!(f, "break;"),
            Statement::Continue { .. } => write!(f, "continue;"),
            Statement::Import { path, alias, .. } => {
                write!(f, "import \"{}\" as {alias};", path.literal)
            }
        }
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A reference to a name
    Identifier(Identifier),
    /// An integer literal
    IntegerLiteral {
        /// The integer token
        token: Token,
        /// The parsed value
        value: i64,
    },
    /// A float literal
    FloatLiteral {
        /// The float token
        token: Token,
        /// The parsed value
        value: f64,
    },
    /// A string literal
    StringLiteral {
        /// The string token
        token: Token,
        /// The literal content between the quotes
        value: String,
    },
    /// `true` or `false`
    BooleanLiteral {
        /// The boolean token
        token: Token,
        /// The literal value
        value: bool,
    },
    /// `[e1, e2, ...]`
    ArrayLiteral {
        /// The `[` token
        token: Token,
        /// Element expressions in source order
        elements: Vec<Expression>,
    },
    /// `{k1: v1, k2: v2, ...}`
    ///
    /// Pairs keep their source order so diagnostics and rendering are
    /// deterministic even though runtime lookup is by hash.
    HashLiteral {
        /// The `{` token
        token: Token,
        /// Key/value pairs in source order
        pairs: Vec<(Expression, Expression)>,
    },
    /// A prefix operator application, e.g. `-x` or `!ok`
    Prefix {
        /// The operator token
        token: Token,
        /// Operator text (`-`, `!`, `++`, `--`)
        operator: String,
        /// The operand
        right: Box<Expression>,
    },
    /// A binary operator application
    Infix {
        /// The operator token
        token: Token,
        /// Operator text; compound assignments store their base
        /// operator here (`+` for `+=`) while the token keeps `+=`
        operator: String,
        /// Left operand
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
    },
    /// A postfix operator application, e.g. `x++`
    Postfix {
        /// The operator token
        token: Token,
        /// Operator text (`++` or `--`)
        operator: String,
        /// The operand
        left: Box<Expression>,
    },
    /// `if (<condition>) { ... } else { ... }`
    If {
        /// The `if` token
        token: Token,
        /// The tested condition
        condition: Box<Expression>,
        /// Block evaluated when the condition is truthy
        consequence: Block,
        /// Optional block evaluated otherwise
        alternative: Option<Block>,
    },
    /// A loop; represents both `while` and `for`.
    ///
    /// `while (c) { ... }` sets only `condition` and `body`.
    /// `for (init; cond; post) { ... }` fills all four fields.
    /// Missing clauses are `None`.
    While {
        /// The `while` or `for` token
        token: Token,
        /// Optional initializer, run once before the first iteration
        init: Option<Box<Statement>>,
        /// Optional loop condition; absent means loop forever
        condition: Option<Box<Expression>>,
        /// Optional post-iteration expression
        post: Option<Box<Expression>>,
        /// The loop body
        body: Block,
    },
    /// `fn(<params>) { ... }`
    FunctionLiteral {
        /// The `fn` token
        token: Token,
        /// Parameter names
        parameters: Vec<Identifier>,
        /// The function body
        body: Block,
    },
    /// `<callee>(<args>)`
    Call {
        /// The `(` token
        token: Token,
        /// The called expression
        function: Box<Expression>,
        /// Argument expressions in source order
        arguments: Vec<Expression>,
    },
    /// `<target>[<index>]`
    Index {
        /// The `[` token
        token: Token,
        /// The indexed expression
        left: Box<Expression>,
        /// The index expression
        index: Box<Expression>,
    },
    /// `<object>.<property>`
    Member {
        /// The `.` token
        token: Token,
        /// The accessed object
        object: Box<Expression>,
        /// The property name
        property: Identifier,
    },
}

impl Expression {
    /// Returns the token that introduced this expression.
    pub fn token(&self) -> &Token {
        match self {
            Expression::Identifier(ident) => &ident.token,
            Expression::IntegerLiteral { token, .. }
            | Expression::FloatLiteral { token, .. }
            | Expression::StringLiteral { token, .. }
            | Expression::BooleanLiteral { token, .. }
            | Expression::ArrayLiteral { token, .. }
            | Expression::HashLiteral { token, .. }
            | Expression::Prefix { token, .. }
            | Expression::Infix { token, .. }
            | Expression::Postfix { token, .. }
            | Expression::If { token, .. }
            | Expression::While { token, .. }
            | Expression::FunctionLiteral { token, .. }
            | Expression::Call { token, .. }
            | Expression::Index { token, .. }
            | Expression::Member { token, .. } => token,
        }
    }
}

fn join(items: &[Expression]) -> String {
    items
        .iter()
        .map(Expression::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{ident}"),
            Expression::IntegerLiteral { token, .. }
            | Expression::FloatLiteral { token, .. }
            | Expression::StringLiteral { token, .. }
            | Expression::BooleanLiteral { token, .. } => f.write_str(&token.literal),
            Expression::ArrayLiteral { elements, .. } => write!(f, "[{}]", join(elements)),
            Expression::HashLiteral { pairs, .. } => {
                let rendered = pairs
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{rendered}}}")
            }
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({operator}{right})"),
            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => write!(f, "({left} {operator} {right})"),
            Expression::Postfix { operator, left, .. } => write!(f, "({left}{operator})"),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if{condition} {consequence}")?;
                if let Some(alt) = alternative {
                    write!(f, "else {alt}")?;
                }
                Ok(())
            }
            Expression::While {
                init,
                condition,
                post,
                body,
                ..
            } => {
                if init.is_none() && post.is_none() {
                    write!(f, "while (")?;
                    if let Some(cond) = condition {
                        write!(f, "{cond}")?;
                    }
                    write!(f, ") {body}")
                } else {
                    write!(f, "for (")?;
                    match init {
                        Some(stmt) => {
                            let text = stmt.to_string();
                            write!(f, "{text}")?;
                            // Expression statements render without their
                            // terminating semicolon.
                            if !text.ends_with(';') {
                                write!(f, ";")?;
                            }
                        }
                        None => write!(f, ";")?,
                    }
                    if let Some(cond) = condition {
                        write!(f, " {cond}")?;
                    }
                    write!(f, ";")?;
                    if let Some(post) = post {
                        write!(f, " {post}")?;
                    }
                    write!(f, ") {body}")
                }
            }
            Expression::FunctionLiteral {
                parameters, body, ..
            } => {
                let params = parameters
                    .iter()
                    .map(|p| p.value.clone())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "fn({params}){body}")
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => write!(f, "{function}({})", join(arguments)),
            Expression::Index { left, index, .. } => write!(f, "({left}[{index}])"),
            Expression::Member {
                object, property, ..
            } => write!(f, "({object}.{property})"),
        }
    }
}
