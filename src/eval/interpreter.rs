//! The Rilla tree-walking evaluator.
//!
//! Evaluation is a synchronous recursive walk over the AST against an
//! environment. There is no exception mechanism: runtime failures are
//! [`Value::Error`] results, and `return`/`break`/`continue` travel as
//! signal values that enclosing blocks, loops, and calls intercept.
//! Every arm inspects its sub-results before composing further, so an
//! error short-circuits through expression lists, call arguments, and
//! loop bodies.

use crate::ast::{Block, Expression, Identifier, Program, Statement};
use crate::eval::builtins;
use crate::eval::value::{Environment, EnvRef, FunctionValue, HashPair, Value};
use crate::token::TokenKind;
use indexmap::IndexMap;
use std::rc::Rc;

/// The tree-walking interpreter.
///
/// The interpreter owns the loop-depth counter used to reject `break`
/// and `continue` outside a loop. The counter is saved and reset across
/// function calls, so a closure called inside a loop cannot `break` out
/// of its caller's loop. Keeping the counter here (rather than in shared
/// state) lets multiple interpreters run independently.
///
/// # Example
///
/// ```rust
/// use rilla::eval::{Environment, Interpreter, Value};
/// use rilla::lexer::Lexer;
/// use rilla::parser::Parser;
///
/// let mut parser = Parser::new(Lexer::new("let x = 2; x * 21"));
/// let program = parser.parse_program();
///
/// let env = Environment::new();
/// let mut interpreter = Interpreter::new();
/// assert_eq!(interpreter.eval(&program, &env), Value::Integer(42));
/// ```
#[derive(Debug, Default)]
pub struct Interpreter {
    loop_depth: u32,
}

/// True for results that must abort the current loop: errors and
/// returns travel upward, while break/continue are handled in place.
fn should_halt_loop(value: &Value) -> bool {
    matches!(value, Value::Return(_) | Value::Error(_))
}

fn unwrap_return(value: Value) -> Value {
    match value {
        Value::Return(inner) => *inner,
        other => other,
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Integer(n) => *n as f64,
        Value::Float(x) => *x,
        _ => 0.0,
    }
}

fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Integer(_) | Value::Float(_))
}

/// Applies `++` or `--` to a number, or reports the unusable operand.
fn step_number(current: &Value, operator: &str) -> Value {
    let delta: i64 = if operator == "++" { 1 } else { -1 };
    match current {
        Value::Integer(n) => Value::Integer(n.wrapping_add(delta)),
        Value::Float(x) => Value::Float(x + delta as f64),
        other => Value::Error(format!(
            "unknown operator: {}{operator}",
            other.type_name()
        )),
    }
}

/// Identity comparison for the `==`/`!=` fallback on non-primitive
/// operands: collections and functions compare by reference, null by
/// kind, and values of different types are simply unequal.
fn values_identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
        (Value::Hash(a), Value::Hash(b)) => Rc::ptr_eq(a, b),
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Builtin(a), Value::Builtin(b)) => a == b,
        _ => false,
    }
}

impl Interpreter {
    /// Creates a new interpreter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates a program in the given environment and returns the
    /// program result: the value of the last statement, the payload of
    /// a top-level `return`, or the first runtime error.
    pub fn eval(&mut self, program: &Program, env: &EnvRef) -> Value {
        let mut result = Value::Null;
        for statement in &program.statements {
            result = self.eval_statement(statement, env);
            match result {
                Value::Return(inner) => return *inner,
                Value::Error(_) => return result,
                Value::Break => {
                    return Value::Error("break statement outside of loop".to_string())
                }
                Value::Continue => {
                    return Value::Error("continue statement outside of loop".to_string())
                }
                _ => {}
            }
        }
        result
    }

    /// Evaluates a block, letting signals pass through unwrapped so the
    /// enclosing loop or function can see them.
    fn eval_block(&mut self, block: &Block, env: &EnvRef) -> Value {
        let mut result = Value::Null;
        for statement in &block.statements {
            result = self.eval_statement(statement, env);
            if matches!(
                result,
                Value::Return(_) | Value::Error(_) | Value::Break | Value::Continue
            ) {
                return result;
            }
        }
        result
    }

    fn eval_statement(&mut self, statement: &Statement, env: &EnvRef) -> Value {
        match statement {
            Statement::Let { name, value, .. } => {
                let val = self.eval_let_value(value, env);
                if val.is_error() {
                    return val;
                }
                env.borrow_mut().set(name.value.clone(), val);
                Value::Null
            }
            Statement::Return { value, .. } => {
                let val = self.eval_expression(value, env);
                if val.is_error() {
                    return val;
                }
                Value::Return(Box::new(val))
            }
            Statement::Expression { expression, .. } => self.eval_expression(expression, env),
            Statement::Break { .. } => {
                if self.loop_depth == 0 {
                    return Value::Error("break statement outside of loop".to_string());
                }
                Value::Break
            }
            Statement::Continue { .. } => {
                if self.loop_depth == 0 {
                    return Value::Error("continue statement outside of loop".to_string());
                }
                Value::Continue
            }
            // Import has no runtime semantics yet; the statement parses
            // and binds nothing.
            Statement::Import { .. } => Value::Null,
        }
    }

    /// Evaluates the right-hand side of a `let`.
    ///
    /// A prefix `++x`/`--x` on the right-hand side binds the pre-update
    /// value while the identifier itself is updated, so
    /// `let a = ++x;` observes the same `a` as `let a = x; x += 1;`.
    fn eval_let_value(&mut self, expression: &Expression, env: &EnvRef) -> Value {
        if let Expression::Prefix {
            operator, right, ..
        } = expression
        {
            if operator == "++" || operator == "--" {
                let Expression::Identifier(ident) = right.as_ref() else {
                    return Value::Error(format!(
                        "invalid prefix target: {}",
                        right.token().literal
                    ));
                };
                let Some(current) = env.borrow().get(&ident.value) else {
                    return Value::Error(format!("identifier not found: {}", ident.value));
                };
                let updated = step_number(&current, operator);
                if updated.is_error() {
                    return updated;
                }
                env.borrow_mut().set(ident.value.clone(), updated);
                return current;
            }
        }
        self.eval_expression(expression, env)
    }

    fn eval_expression(&mut self, expression: &Expression, env: &EnvRef) -> Value {
        match expression {
            Expression::Identifier(ident) => self.eval_identifier(ident, env),
            Expression::IntegerLiteral { value, .. } => Value::Integer(*value),
            Expression::FloatLiteral { value, .. } => Value::Float(*value),
            Expression::StringLiteral { value, .. } => Value::String(Rc::from(value.as_str())),
            Expression::BooleanLiteral { value, .. } => Value::Boolean(*value),
            Expression::ArrayLiteral { elements, .. } => {
                match self.eval_expressions(elements, env) {
                    Ok(values) => Value::Array(Rc::new(values)),
                    Err(error) => error,
                }
            }
            Expression::HashLiteral { pairs, .. } => self.eval_hash_literal(pairs, env),
            Expression::Prefix {
                operator, right, ..
            } => {
                if operator == "++" || operator == "--" {
                    return self.eval_prefix_update(operator, right, env);
                }
                let value = self.eval_expression(right, env);
                if value.is_error() {
                    return value;
                }
                self.eval_prefix_operator(operator, &value)
            }
            Expression::Infix {
                token,
                operator,
                left,
                right,
            } => {
                if operator == "=" {
                    return self.eval_assignment(left, right, env);
                }
                if matches!(token.kind, TokenKind::SumAssign | TokenKind::SubAssign) {
                    return self.eval_compound_assignment(token, operator, left, right, env);
                }
                let left_value = self.eval_expression(left, env);
                if left_value.is_error() {
                    return left_value;
                }
                let right_value = self.eval_expression(right, env);
                if right_value.is_error() {
                    return right_value;
                }
                self.eval_infix_operator(operator, &left_value, &right_value, operator)
            }
            Expression::Postfix { operator, left, .. } => {
                self.eval_postfix_update(operator, left, env)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let cond = self.eval_expression(condition, env);
                if cond.is_error() {
                    return cond;
                }
                if cond.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alt) = alternative {
                    self.eval_block(alt, env)
                } else {
                    Value::Null
                }
            }
            Expression::While {
                init,
                condition,
                post,
                body,
                ..
            } => self.eval_while(init.as_deref(), condition.as_deref(), post.as_deref(), body, env),
            Expression::FunctionLiteral {
                parameters, body, ..
            } => Value::Function(Rc::new(FunctionValue {
                parameters: parameters.clone(),
                body: body.clone(),
                env: env.clone(),
            })),
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let callee = self.eval_expression(function, env);
                if callee.is_error() {
                    return callee;
                }
                let args = match self.eval_expressions(arguments, env) {
                    Ok(values) => values,
                    Err(error) => return error,
                };
                self.apply_function(callee, args)
            }
            Expression::Index { left, index, .. } => {
                let target = self.eval_expression(left, env);
                if target.is_error() {
                    return target;
                }
                let idx = self.eval_expression(index, env);
                if idx.is_error() {
                    return idx;
                }
                self.eval_index(&target, &idx)
            }
            Expression::Member {
                object, property, ..
            } => {
                let obj = self.eval_expression(object, env);
                if obj.is_error() {
                    return obj;
                }
                Value::Error(format!(
                    "unknown operator: {}.{}",
                    obj.type_name(),
                    property.value
                ))
            }
        }
    }

    fn eval_identifier(&self, ident: &Identifier, env: &EnvRef) -> Value {
        if let Some(value) = env.borrow().get(&ident.value) {
            return value;
        }
        if let Some(builtin) = builtins::lookup(&ident.value) {
            return builtin;
        }
        Value::Error(format!("identifier not found: {}", ident.value))
    }

    /// Evaluates expressions left to right, stopping at the first error.
    fn eval_expressions(
        &mut self,
        expressions: &[Expression],
        env: &EnvRef,
    ) -> Result<Vec<Value>, Value> {
        let mut values = Vec::with_capacity(expressions.len());
        for expression in expressions {
            let value = self.eval_expression(expression, env);
            if value.is_error() {
                return Err(value);
            }
            values.push(value);
        }
        Ok(values)
    }

    fn eval_hash_literal(
        &mut self,
        pairs: &[(Expression, Expression)],
        env: &EnvRef,
    ) -> Value {
        let mut map = IndexMap::new();
        for (key_expr, value_expr) in pairs {
            let key = self.eval_expression(key_expr, env);
            if key.is_error() {
                return key;
            }
            let Some(hash_key) = key.hash_key() else {
                return Value::Error(format!("unusable as hash key: {}", key.type_name()));
            };
            let value = self.eval_expression(value_expr, env);
            if value.is_error() {
                return value;
            }
            // A repeated key overwrites the earlier entry but keeps its
            // original position.
            map.insert(hash_key, HashPair { key, value });
        }
        Value::Hash(Rc::new(map))
    }

    fn eval_prefix_operator(&self, operator: &str, right: &Value) -> Value {
        match operator {
            "!" => Value::Boolean(!right.is_truthy()),
            "-" => match right {
                Value::Integer(n) => Value::Integer(n.wrapping_neg()),
                Value::Float(x) => Value::Float(-x),
                other => Value::Error(format!("unknown operator: -{}", other.type_name())),
            },
            _ => Value::Error(format!(
                "unknown operator: {operator} {}",
                right.type_name()
            )),
        }
    }

    /// `++x` / `--x`: update the binding in place and yield the new value.
    fn eval_prefix_update(&mut self, operator: &str, right: &Expression, env: &EnvRef) -> Value {
        let Expression::Identifier(ident) = right else {
            return Value::Error(format!(
                "invalid prefix target: {}",
                right.token().literal
            ));
        };
        let Some(current) = env.borrow().get(&ident.value) else {
            return Value::Error(format!("identifier not found: {}", ident.value));
        };
        let updated = step_number(&current, operator);
        if updated.is_error() {
            return updated;
        }
        env.borrow_mut().set(ident.value.clone(), updated.clone());
        updated
    }

    /// `x++` / `x--`: update the binding in place and yield the old value.
    fn eval_postfix_update(&mut self, operator: &str, left: &Expression, env: &EnvRef) -> Value {
        let Expression::Identifier(ident) = left else {
            return Value::Error(format!(
                "invalid postfix target: {}",
                left.token().literal
            ));
        };
        let current = self.eval_identifier(ident, env);
        if current.is_error() {
            return current;
        }
        let updated = step_number(&current, operator);
        if updated.is_error() {
            return updated;
        }
        env.borrow_mut().set(ident.value.clone(), updated);
        current
    }

    /// `<ident> = <value>`: write into the innermost scope.
    fn eval_assignment(&mut self, left: &Expression, right: &Expression, env: &EnvRef) -> Value {
        let Expression::Identifier(ident) = left else {
            return Value::Error(format!(
                "invalid assignment target: {}",
                left.token().literal
            ));
        };
        let value = self.eval_expression(right, env);
        if value.is_error() {
            return value;
        }
        env.borrow_mut().set(ident.value.clone(), value.clone());
        value
    }

    /// `+=` / `-=`: evaluate both sides, apply the base operator, then
    /// write back. Errors render with the compound token so `5 += true`
    /// reports `INTEGER += BOOLEAN`.
    fn eval_compound_assignment(
        &mut self,
        token: &crate::token::Token,
        operator: &str,
        left: &Expression,
        right: &Expression,
        env: &EnvRef,
    ) -> Value {
        let current = self.eval_expression(left, env);
        if current.is_error() {
            return current;
        }
        let right_value = self.eval_expression(right, env);
        if right_value.is_error() {
            return right_value;
        }
        let result = self.eval_infix_operator(operator, &current, &right_value, &token.literal);
        if result.is_error() {
            return result;
        }
        let Expression::Identifier(ident) = left else {
            return Value::Error(format!(
                "invalid assignment target: {}",
                left.token().literal
            ));
        };
        env.borrow_mut().set(ident.value.clone(), result.clone());
        result
    }

    /// Applies a binary operator. `display` is the operator spelling used
    /// in error messages (the compound form for `+=`/`-=`).
    fn eval_infix_operator(
        &self,
        operator: &str,
        left: &Value,
        right: &Value,
        display: &str,
    ) -> Value {
        if is_numeric(left) && is_numeric(right) {
            return self.eval_number_infix(operator, left, right, display);
        }
        match (left, right) {
            (Value::String(a), Value::String(b)) => {
                if operator == "+" {
                    Value::String(Rc::from(format!("{a}{b}")))
                } else {
                    Value::Error(format!("unknown operator: STRING {display} STRING"))
                }
            }
            (Value::Boolean(a), Value::Boolean(b)) => match operator {
                "&&" => Value::Boolean(*a && *b),
                "||" => Value::Boolean(*a || *b),
                "==" => Value::Boolean(a == b),
                "!=" => Value::Boolean(a != b),
                _ => Value::Error(format!("unknown operator: BOOLEAN {display} BOOLEAN")),
            },
            _ => {
                if operator == "==" {
                    return Value::Boolean(values_identical(left, right));
                }
                if operator == "!=" {
                    return Value::Boolean(!values_identical(left, right));
                }
                if left.type_name() != right.type_name() {
                    Value::Error(format!(
                        "type mismatch: {} {display} {}",
                        left.type_name(),
                        right.type_name()
                    ))
                } else {
                    Value::Error(format!(
                        "unknown operator: {} {display} {}",
                        left.type_name(),
                        right.type_name()
                    ))
                }
            }
        }
    }

    fn eval_number_infix(
        &self,
        operator: &str,
        left: &Value,
        right: &Value,
        display: &str,
    ) -> Value {
        // Integer stays integer; any float operand promotes both sides.
        if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
            return match operator {
                "+" => Value::Integer(a.wrapping_add(*b)),
                "-" => Value::Integer(a.wrapping_sub(*b)),
                "*" => Value::Integer(a.wrapping_mul(*b)),
                "/" => {
                    if *b == 0 {
                        Value::Error("division by zero".to_string())
                    } else {
                        // Truncates toward zero.
                        Value::Integer(a.wrapping_div(*b))
                    }
                }
                "**" => Value::Integer((*a as f64).powf(*b as f64) as i64),
                "<" => Value::Boolean(a < b),
                ">" => Value::Boolean(a > b),
                "<=" => Value::Boolean(a <= b),
                ">=" => Value::Boolean(a >= b),
                "==" => Value::Boolean(a == b),
                "!=" => Value::Boolean(a != b),
                _ => Value::Error(format!("unknown operator: INTEGER {display} INTEGER")),
            };
        }

        let a = as_f64(left);
        let b = as_f64(right);
        match operator {
            "+" => Value::Float(a + b),
            "-" => Value::Float(a - b),
            "*" => Value::Float(a * b),
            "/" => Value::Float(a / b),
            "**" => Value::Float(a.powf(b)),
            "<" => Value::Boolean(a < b),
            ">" => Value::Boolean(a > b),
            "<=" => Value::Boolean(a <= b),
            ">=" => Value::Boolean(a >= b),
            "==" => Value::Boolean(a == b),
            "!=" => Value::Boolean(a != b),
            _ => Value::Error(format!(
                "unknown operator: {} {display} {}",
                left.type_name(),
                right.type_name()
            )),
        }
    }

    fn eval_while(
        &mut self,
        init: Option<&Statement>,
        condition: Option<&Expression>,
        post: Option<&Expression>,
        body: &Block,
        env: &EnvRef,
    ) -> Value {
        if let Some(init) = init {
            let result = self.eval_statement(init, env);
            if should_halt_loop(&result) {
                return result;
            }
        }

        // The loop's own result: the last non-signal, non-null body value.
        let mut loop_result = Value::Null;

        loop {
            if let Some(condition) = condition {
                let cond = self.eval_expression(condition, env);
                if should_halt_loop(&cond) {
                    return cond;
                }
                if !cond.is_truthy() {
                    break;
                }
            }

            self.loop_depth += 1;
            let body_result = self.eval_block(body, env);
            self.loop_depth -= 1;

            match body_result {
                Value::Break => return loop_result,
                Value::Continue => {}
                other if should_halt_loop(&other) => return other,
                Value::Null => {}
                other => loop_result = other,
            }

            if let Some(post) = post {
                let post_result = self.eval_expression(post, env);
                if should_halt_loop(&post_result) {
                    return post_result;
                }
            }
        }

        loop_result
    }

    fn apply_function(&mut self, function: Value, args: Vec<Value>) -> Value {
        match function {
            Value::Function(func) => {
                if args.len() != func.parameters.len() {
                    return Value::Error(format!(
                        "wrong number of arguments. got={}, want={}",
                        args.len(),
                        func.parameters.len()
                    ));
                }
                let extended = Environment::new_enclosed(func.env.clone());
                for (param, arg) in func.parameters.iter().zip(args) {
                    extended.borrow_mut().set(param.value.clone(), arg);
                }
                // A function body starts outside any loop, whatever the
                // call site was doing.
                let saved_depth = self.loop_depth;
                self.loop_depth = 0;
                let result = self.eval_block(&func.body, &extended);
                self.loop_depth = saved_depth;
                unwrap_return(result)
            }
            Value::Builtin(name) => builtins::call(name, &args),
            other => Value::Error(format!("not a function: {}", other.type_name())),
        }
    }

    fn eval_index(&self, target: &Value, index: &Value) -> Value {
        match (target, index) {
            (Value::Array(elements), Value::Integer(idx)) => {
                if *idx < 0 || *idx as usize >= elements.len() {
                    return Value::Null;
                }
                elements[*idx as usize].clone()
            }
            (Value::Hash(pairs), _) => {
                let Some(key) = index.hash_key() else {
                    return Value::Error(format!(
                        "unusable as hash key: {}",
                        index.type_name()
                    ));
                };
                match pairs.get(&key) {
                    Some(pair) => pair.value.clone(),
                    None => Value::Null,
                }
            }
            _ => Value::Error(format!(
                "index operator not supported: {}",
                target.type_name()
            )),
        }
    }
}
