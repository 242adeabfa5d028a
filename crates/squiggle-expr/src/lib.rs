//! Expression IR: the evaluator-facing form of a parsed program.
//!
//! - Operators, pipes and lookups are lowered to plain calls of standard library names
//! - Every node keeps the span of the source it came from, for error reporting

use serde::{Deserialize, Serialize};
use squiggle_ast::ast::*;
use squiggle_ast::span::Span;
use std::collections::HashSet;

/// Name of the builtin that implements `a.b` and `a[b]`.
pub const INDEX_LOOKUP_FN: &str = "$_atIndex_$";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
    Void,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LambdaParam {
    pub name: String,
    /// Domain expression such as `[3, 5]`, evaluated when the lambda is created.
    pub annotation: Option<Expression>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Op {
    /// Statements and a final expression evaluated in a fresh scope.
    Block(Vec<Expression>),
    /// Top-level statements; the bindings they create are part of the result.
    Program { statements: Vec<Expression>, result: Option<Box<Expression>> },
    Assign { left: String, right: Box<Expression> },
    Symbol(String),
    Value(Literal),
    Call { callee: Box<Expression>, args: Vec<Expression> },
    Lambda { name: Option<String>, params: Vec<LambdaParam>, body: Box<Expression> },
    Ternary { condition: Box<Expression>, if_true: Box<Expression>, if_false: Box<Expression> },
    Array(Vec<Expression>),
    Dict(Vec<(String, Expression)>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expression {
    pub op: Op,
    pub span: Span,
}

impl Expression {
    pub fn new(op: Op, span: Span) -> Self {
        Self { op, span }
    }

    pub fn symbol<S: Into<String>>(name: S, span: Span) -> Self {
        Self::new(Op::Symbol(name.into()), span)
    }

    pub fn number(n: f64, span: Span) -> Self {
        Self::new(Op::Value(Literal::Number(n)), span)
    }

    pub fn string<S: Into<String>>(s: S, span: Span) -> Self {
        Self::new(Op::Value(Literal::Str(s.into())), span)
    }

    /// Call of a standard library function by name.
    pub fn call_named(name: &str, args: Vec<Expression>, span: Span) -> Self {
        Self::new(Op::Call { callee: Box::new(Self::symbol(name, span)), args }, span)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Duplicate parameter name: {name}")]
    DuplicateParameter { name: String, span: Span },
    #[error("Can't define a variable with a namespaced name: {name}")]
    NamespacedBinding { name: String, span: Span },
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::DuplicateParameter { span, .. }
            | CompileError::NamespacedBinding { span, .. } => *span,
        }
    }
}

fn check_binding_name(name: &str, span: Span) -> Result<(), CompileError> {
    if name.contains('.') {
        return Err(CompileError::NamespacedBinding { name: name.to_string(), span });
    }
    Ok(())
}

pub fn compile_program(p: &Program) -> Result<Expression, CompileError> {
    let statements = p.statements.iter().map(compile_statement).collect::<Result<Vec<_>, _>>()?;
    let result = match &p.result {
        Some(e) => Some(Box::new(compile_expr(e)?)),
        None => None,
    };
    Ok(Expression::new(Op::Program { statements, result }, p.span))
}

fn compile_statement(s: &Statement) -> Result<Expression, CompileError> {
    match &s.kind {
        StatementKind::Let { name, name_span, value } => {
            check_binding_name(name, *name_span)?;
            let right = compile_expr(value)?;
            Ok(Expression::new(Op::Assign { left: name.clone(), right: Box::new(right) }, s.span))
        }
        StatementKind::Defun { name, name_span, params, body } => {
            check_binding_name(name, *name_span)?;
            let lambda = compile_lambda(Some(name.clone()), params, body, s.span)?;
            Ok(Expression::new(Op::Assign { left: name.clone(), right: Box::new(lambda) }, s.span))
        }
    }
}

fn compile_lambda(
    name: Option<String>,
    params: &[Param],
    body: &Expr,
    span: Span,
) -> Result<Expression, CompileError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(params.len());
    for p in params {
        check_binding_name(&p.name, p.span)?;
        if !seen.insert(p.name.as_str()) {
            return Err(CompileError::DuplicateParameter { name: p.name.clone(), span: p.span });
        }
        let annotation = p.annotation.as_ref().map(compile_expr).transpose()?;
        out.push(LambdaParam { name: p.name.clone(), annotation });
    }
    let body = compile_expr(body)?;
    Ok(Expression::new(Op::Lambda { name, params: out, body: Box::new(body) }, span))
}

pub fn compile_expr(e: &Expr) -> Result<Expression, CompileError> {
    let span = e.span;
    Ok(match &e.kind {
        ExprKind::Void => Expression::new(Op::Value(Literal::Void), span),
        ExprKind::Number(n) => Expression::number(*n, span),
        ExprKind::Str(s) => Expression::string(s.clone(), span),
        ExprKind::Bool(b) => Expression::new(Op::Value(Literal::Bool(*b)), span),
        ExprKind::Ident(n) => Expression::symbol(n.clone(), span),
        ExprKind::Array(xs) => {
            Expression::new(Op::Array(xs.iter().map(compile_expr).collect::<Result<_, _>>()?), span)
        }
        ExprKind::Dict(entries) => {
            let mut fields = Vec::with_capacity(entries.len());
            for kv in entries {
                fields.push((kv.key.clone(), compile_expr(&kv.value)?));
            }
            Expression::new(Op::Dict(fields), span)
        }
        ExprKind::Block { statements, result } => {
            let mut items = statements.iter().map(compile_statement).collect::<Result<Vec<_>, _>>()?;
            items.push(compile_expr(result)?);
            Expression::new(Op::Block(items), span)
        }
        ExprKind::Lambda { params, body } => compile_lambda(None, params, body, span)?,
        ExprKind::Call { callee, args } => Expression::new(
            Op::Call {
                callee: Box::new(compile_expr(callee)?),
                args: args.iter().map(compile_expr).collect::<Result<_, _>>()?,
            },
            span,
        ),
        ExprKind::Infix { op, left, right } => {
            Expression::call_named(op.builtin_name(), vec![compile_expr(left)?, compile_expr(right)?], span)
        }
        ExprKind::Unary { op, arg } => match (op, &arg.kind) {
            // -5 is a literal rather than a call
            (UnaryOp::Minus, ExprKind::Number(n)) => Expression::number(-n, span),
            _ => Expression::call_named(op.builtin_name(), vec![compile_expr(arg)?], span),
        },
        ExprKind::Pipe { value, callee, args } => {
            let mut all = Vec::with_capacity(args.len() + 1);
            all.push(compile_expr(value)?);
            for a in args {
                all.push(compile_expr(a)?);
            }
            Expression::new(Op::Call { callee: Box::new(compile_expr(callee)?), args: all }, span)
        }
        ExprKind::DotLookup { target, field } => Expression::call_named(
            INDEX_LOOKUP_FN,
            vec![compile_expr(target)?, Expression::string(field.clone(), span)],
            span,
        ),
        ExprKind::BracketLookup { target, key } => {
            Expression::call_named(INDEX_LOOKUP_FN, vec![compile_expr(target)?, compile_expr(key)?], span)
        }
        ExprKind::Ternary { condition, then_branch, else_branch } => Expression::new(
            Op::Ternary {
                condition: Box::new(compile_expr(condition)?),
                if_true: Box::new(compile_expr(then_branch)?),
                if_false: Box::new(compile_expr(else_branch)?),
            },
            span,
        ),
    })
}

fn print_literal(l: &Literal) -> String {
    match l {
        Literal::Number(n) => format!("{}", n),
        Literal::Str(s) => format!("'{}'", s.escape_default()),
        Literal::Bool(b) => format!("{}", b),
        Literal::Void => "()".into(),
    }
}

fn print_all(xs: &[Expression], sep: &str) -> String {
    xs.iter().map(print_expression).collect::<Vec<_>>().join(sep)
}

/// Deterministic single-line rendering used for diagnostics and `--dump-expr`.
pub fn print_expression(e: &Expression) -> String {
    match &e.op {
        Op::Block(items) => format!("{{{}}}", print_all(items, "; ")),
        Op::Program { statements, result } => {
            let mut parts: Vec<String> = statements.iter().map(print_expression).collect();
            if let Some(r) = result {
                parts.push(print_expression(r));
            }
            parts.join("; ")
        }
        Op::Assign { left, right } => format!("{} = {}", left, print_expression(right)),
        Op::Symbol(n) => n.clone(),
        Op::Value(l) => print_literal(l),
        Op::Call { callee, args } if args.is_empty() => format!("({})", print_expression(callee)),
        Op::Call { callee, args } => {
            format!("({} {})", print_expression(callee), print_all(args, " "))
        }
        Op::Lambda { params, body, .. } => {
            let ps = params
                .iter()
                .map(|p| match &p.annotation {
                    Some(a) => format!("{}: {}", p.name, print_expression(a)),
                    None => p.name.clone(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{|{}| {}}}", ps, print_expression(body))
        }
        Op::Ternary { condition, if_true, if_false } => format!(
            "({} ? {} : {})",
            print_expression(condition),
            print_expression(if_true),
            print_expression(if_false)
        ),
        Op::Array(xs) => format!("[{}]", print_all(xs, ", ")),
        Op::Dict(fields) => {
            let inner = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", k, print_expression(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{}}}", inner)
        }
    }
}
