//! Tree-walking evaluator over the expression IR.

use crate::context::ReducerContext;
use crate::error::RuntimeError;
use crate::lambda::{Lambda, LambdaParameter, UserLambda};
use crate::value::{Domain, Value, ValueMap};
use squiggle_expr::{Expression, LambdaParam, Literal, Op};
use std::sync::Arc;

fn literal(l: &Literal) -> Value {
    match l {
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::String(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Void => Value::Void,
    }
}

pub fn evaluate(e: &Expression, ctx: &mut ReducerContext) -> Result<Value, RuntimeError> {
    match &e.op {
        Op::Value(l) => Ok(literal(l)),
        Op::Symbol(name) => ctx
            .bindings
            .get(name)
            .ok_or_else(|| RuntimeError::SymbolNotFound(name.clone()).with_span(e.span)),
        Op::Array(items) => {
            let values = items.iter().map(|x| evaluate(x, ctx)).collect::<Result<Vec<_>, _>>()?;
            Ok(Value::array(values))
        }
        Op::Dict(entries) => {
            let mut map = ValueMap::with_capacity(entries.len());
            for (k, x) in entries {
                let v = evaluate(x, ctx)?;
                map.insert(k.clone(), v);
            }
            Ok(Value::dict(map))
        }
        Op::Block(items) => {
            let saved = ctx.bindings.clone();
            let result = evaluate_sequence(items, ctx);
            ctx.bindings = saved;
            result
        }
        Op::Program { statements, result } => {
            evaluate_sequence(statements, ctx)?;
            match result {
                Some(r) => evaluate(r, ctx),
                None => Ok(Value::Void),
            }
        }
        Op::Assign { left, right } => {
            let v = evaluate(right, ctx)?;
            ctx.bindings.insert(left.clone(), v);
            Ok(Value::Void)
        }
        Op::Call { callee, args } => {
            let f = evaluate(callee, ctx)?;
            let argv = args.iter().map(|x| evaluate(x, ctx)).collect::<Result<Vec<_>, _>>()?;
            match f {
                Value::Lambda(l) => l.call(&argv, ctx).map_err(|err| err.with_span(e.span)),
                other => Err(RuntimeError::NotAFunction(other.to_string()).with_span(e.span)),
            }
        }
        Op::Lambda { name, params, body } => {
            let params = params
                .iter()
                .map(|p| lambda_parameter(p, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Lambda(Lambda::User(Arc::new(UserLambda {
                name: name.clone(),
                params,
                body: (**body).clone(),
                captured: ctx.bindings.clone(),
                span: e.span,
            }))))
        }
        Op::Ternary { condition, if_true, if_false } => match evaluate(condition, ctx)? {
            Value::Bool(true) => evaluate(if_true, ctx),
            Value::Bool(false) => evaluate(if_false, ctx),
            other => Err(RuntimeError::ExpectedType {
                expected: "Bool".into(),
                found: other.type_name().into(),
            }
            .with_span(condition.span)),
        },
    }
}

// Value of the last item; statements yield Void
fn evaluate_sequence(items: &[Expression], ctx: &mut ReducerContext) -> Result<Value, RuntimeError> {
    let mut last = Value::Void;
    for item in items {
        last = evaluate(item, ctx)?;
    }
    Ok(last)
}

fn lambda_parameter(p: &LambdaParam, ctx: &mut ReducerContext) -> Result<LambdaParameter, RuntimeError> {
    let domain = match &p.annotation {
        None => None,
        Some(a) => Some(annotation_domain(evaluate(a, ctx)?).map_err(|err| err.with_span(a.span))?),
    };
    Ok(LambdaParameter { name: p.name.clone(), domain })
}

/// `[min, max]` or a domain value.
fn annotation_domain(v: Value) -> Result<Domain, RuntimeError> {
    match v {
        Value::Domain(d) => Ok(d),
        Value::Array(items) => match items.as_slice() {
            [Value::Number(min), Value::Number(max)] => Domain::numeric_range(*min, *max),
            [_, _] => Err(RuntimeError::other("Only numeric ranges are supported in annotations")),
            _ => Err(RuntimeError::other("Only two-item arrays are supported in annotations")),
        },
        other => Err(RuntimeError::ExpectedType {
            expected: "Domain".into(),
            found: other.type_name().into(),
        }),
    }
}
