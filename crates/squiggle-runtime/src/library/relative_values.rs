use crate::registry::*;
use crate::value::{Plot, Value};
use std::sync::Arc;

const MAKER: FnFactory = FnFactory::new("RelativeValues", true);

pub fn library() -> Vec<FrFunction> {
    vec![MAKER.make(
        "gridPlot",
        vec![make_definition1(
            fr_dict2(("ids", fr_array(fr_string())), ("fn", fr_lambda())),
            |(ids, func), _| Ok(Value::Plot(Arc::new(Plot::RelativeValues { func, ids }))),
        )],
    )]
}
