use crate::bindings::Bindings;
use crate::context::{Frame, ReducerContext, MAX_CALL_DEPTH};
use crate::error::RuntimeError;
use crate::reducer::evaluate;
use crate::registry::FnDefinition;
use crate::value::{Domain, Value};
use squiggle_ast::span::Span;
use squiggle_expr::Expression;
use std::sync::Arc;
use tracing::{debug, trace};

pub type VariadicFn = fn(&[Value], &mut ReducerContext) -> Result<Value, RuntimeError>;

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaParameter {
    pub name: String,
    pub domain: Option<Domain>,
}

/// Closure over the scope it was created in.
#[derive(Debug)]
pub struct UserLambda {
    pub name: Option<String>,
    pub params: Vec<LambdaParameter>,
    pub body: Expression,
    pub captured: Bindings,
    pub span: Span,
}

pub enum BuiltinBody {
    Definitions(Vec<FnDefinition>),
    /// Arbitrary argument lists that no fixed-arity overload can describe.
    Variadic(VariadicFn),
}

pub struct BuiltinLambda {
    pub name: String,
    pub body: BuiltinBody,
}

#[derive(Clone)]
pub enum Lambda {
    User(Arc<UserLambda>),
    Builtin(Arc<BuiltinLambda>),
}

impl Lambda {
    pub fn builtin(name: String, body: BuiltinBody) -> Self {
        Lambda::Builtin(Arc::new(BuiltinLambda { name, body }))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Lambda::User(l) => l.name.as_deref(),
            Lambda::Builtin(b) => Some(&b.name),
        }
    }

    /// Builtins report a single `...` parameter.
    pub fn parameters(&self) -> Vec<LambdaParameter> {
        match self {
            Lambda::User(l) => l.params.clone(),
            Lambda::Builtin(_) => vec![LambdaParameter { name: "...".into(), domain: None }],
        }
    }

    pub fn call(&self, args: &[Value], ctx: &mut ReducerContext) -> Result<Value, RuntimeError> {
        match self {
            Lambda::User(l) => call_user(l, args, ctx),
            Lambda::Builtin(b) => call_builtin(b, args, ctx),
        }
    }
}

fn call_user(l: &UserLambda, args: &[Value], ctx: &mut ReducerContext) -> Result<Value, RuntimeError> {
    if args.len() != l.params.len() {
        return Err(RuntimeError::Arity { expected: l.params.len(), given: args.len() });
    }
    for (p, a) in l.params.iter().zip(args) {
        if let Some(domain) = &p.domain {
            domain.validate(a)?;
        }
    }
    if ctx.depth() >= MAX_CALL_DEPTH {
        return Err(RuntimeError::StackOverflow);
    }
    let mut scope = l.captured.clone();
    for (p, a) in l.params.iter().zip(args) {
        scope.insert(p.name.clone(), a.clone());
    }
    let saved = std::mem::replace(&mut ctx.bindings, scope);
    ctx.frames.push(Frame {
        name: l.name.clone().unwrap_or_else(|| "<anonymous>".into()),
        span: l.span,
    });
    let result = evaluate(&l.body, ctx);
    ctx.frames.pop();
    ctx.bindings = saved;
    if let Err(e) = &result {
        debug!(lambda = l.name.as_deref().unwrap_or("<anonymous>"), error = %e, "lambda call failed");
    }
    result
}

fn call_builtin(b: &BuiltinLambda, args: &[Value], ctx: &mut ReducerContext) -> Result<Value, RuntimeError> {
    match &b.body {
        BuiltinBody::Definitions(defs) => {
            for def in defs {
                trace!(function = %b.name, signature = %def.signature(&b.name), "trying definition");
                if let Some(result) = def.try_call(args, ctx) {
                    return result;
                }
            }
            let signatures: Vec<String> = defs.iter().map(|d| d.signature(&b.name)).collect();
            Err(RuntimeError::NoMatchingDefinition {
                name: b.name.clone(),
                signatures: signatures.join(", "),
            })
        }
        BuiltinBody::Variadic(f) => f(args, ctx),
    }
}

impl std::fmt::Debug for Lambda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lambda::User(l) => f
                .debug_struct("UserLambda")
                .field("name", &l.name)
                .field("params", &l.params)
                .finish_non_exhaustive(),
            Lambda::Builtin(b) => write!(f, "Builtin({})", b.name),
        }
    }
}

impl std::fmt::Display for Lambda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lambda::User(l) => {
                let names: Vec<&str> = l.params.iter().map(|p| p.name.as_str()).collect();
                write!(f, "lambda({}=>internal code)", names.join(","))
            }
            Lambda::Builtin(b) => write!(f, "Builtin({})", b.name),
        }
    }
}
