use super::fr_types::FrType;
use crate::context::ReducerContext;
use crate::error::RuntimeError;
use crate::value::Value;

type RunFn =
    Box<dyn Fn(&[Value], &mut ReducerContext) -> Option<Result<Value, RuntimeError>> + Send + Sync>;

/// One fixed-arity overload of a builtin.
pub struct FnDefinition {
    pub inputs: Vec<String>,
    run: RunFn,
}

impl FnDefinition {
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// `None` when the arguments do not fit this overload.
    pub fn try_call(
        &self,
        args: &[Value],
        ctx: &mut ReducerContext,
    ) -> Option<Result<Value, RuntimeError>> {
        if args.len() != self.inputs.len() {
            return None;
        }
        (self.run)(args, ctx)
    }

    pub fn signature(&self, name: &str) -> String {
        format!("{}({})", name, self.inputs.join(", "))
    }
}

impl std::fmt::Debug for FnDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FnDefinition({})", self.inputs.join(", "))
    }
}

pub fn make_definition0<F>(run: F) -> FnDefinition
where
    F: Fn(&mut ReducerContext) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    FnDefinition {
        inputs: vec![],
        run: Box::new(move |_: &[Value], ctx: &mut ReducerContext| Some(run(ctx))),
    }
}

pub fn make_definition1<A, F>(a: A, run: F) -> FnDefinition
where
    A: FrType,
    F: Fn(A::Output, &mut ReducerContext) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    FnDefinition {
        inputs: vec![a.name()],
        run: Box::new(move |args: &[Value], ctx: &mut ReducerContext| {
            let x = a.unpack(args.first()?)?;
            Some(run(x, ctx))
        }),
    }
}

pub fn make_definition2<A, B, F>(a: A, b: B, run: F) -> FnDefinition
where
    A: FrType,
    B: FrType,
    F: Fn(A::Output, B::Output, &mut ReducerContext) -> Result<Value, RuntimeError>
        + Send
        + Sync
        + 'static,
{
    FnDefinition {
        inputs: vec![a.name(), b.name()],
        run: Box::new(move |args: &[Value], ctx: &mut ReducerContext| {
            let x = a.unpack(args.first()?)?;
            let y = b.unpack(args.get(1)?)?;
            Some(run(x, y, ctx))
        }),
    }
}

pub fn make_definition3<A, B, C, F>(a: A, b: B, c: C, run: F) -> FnDefinition
where
    A: FrType,
    B: FrType,
    C: FrType,
    F: Fn(A::Output, B::Output, C::Output, &mut ReducerContext) -> Result<Value, RuntimeError>
        + Send
        + Sync
        + 'static,
{
    FnDefinition {
        inputs: vec![a.name(), b.name(), c.name()],
        run: Box::new(move |args: &[Value], ctx: &mut ReducerContext| {
            let x = a.unpack(args.first()?)?;
            let y = b.unpack(args.get(1)?)?;
            let z = c.unpack(args.get(2)?)?;
            Some(run(x, y, z, ctx))
        }),
    }
}

pub fn make_definition4<A, B, C, D, F>(a: A, b: B, c: C, d: D, run: F) -> FnDefinition
where
    A: FrType,
    B: FrType,
    C: FrType,
    D: FrType,
    F: Fn(A::Output, B::Output, C::Output, D::Output, &mut ReducerContext) -> Result<Value, RuntimeError>
        + Send
        + Sync
        + 'static,
{
    FnDefinition {
        inputs: vec![a.name(), b.name(), c.name(), d.name()],
        run: Box::new(move |args: &[Value], ctx: &mut ReducerContext| {
            let w = a.unpack(args.first()?)?;
            let x = b.unpack(args.get(1)?)?;
            let y = c.unpack(args.get(2)?)?;
            let z = d.unpack(args.get(3)?)?;
            Some(run(w, x, y, z, ctx))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Environment;
    use crate::registry::fr_types::{fr_number, fr_string};

    #[test]
    fn arity_and_type_mismatches_are_skipped() {
        let def = make_definition2(fr_number(), fr_number(), |a, b, _| Ok(Value::Number(a + b)));
        let mut ctx = ReducerContext::new(Environment::default());
        assert!(def.try_call(&[Value::Number(1.0)], &mut ctx).is_none());
        assert!(def.try_call(&[Value::Number(1.0), Value::string("x")], &mut ctx).is_none());
        let out = def.try_call(&[Value::Number(1.0), Value::Number(2.0)], &mut ctx);
        assert_eq!(out.map(|r| r.map(|v| v.to_string())), Some(Ok("3".to_string())));
    }

    #[test]
    fn signature_lists_input_types() {
        let def = make_definition2(fr_string(), fr_number(), |_, _, _| Ok(Value::Void));
        assert_eq!(def.signature("f"), "f(string, number)");
    }
}
