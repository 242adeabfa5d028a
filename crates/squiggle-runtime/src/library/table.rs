use crate::registry::*;
use crate::value::{TableChart, TableColumn, Value};
use std::sync::Arc;

const MAKER: FnFactory = FnFactory::new("Table", true);

pub fn library() -> Vec<FrFunction> {
    vec![MAKER.make(
        "make",
        vec![make_definition1(
            fr_dict2(
                ("data", fr_array_any()),
                ("columns", fr_array(fr_dict2(("fn", fr_lambda()), ("name", fr_optional(fr_string()))))),
            ),
            |(data, columns), _| {
                let columns = columns.into_iter().map(|(func, name)| TableColumn { func, name }).collect();
                Ok(Value::TableChart(Arc::new(TableChart { data: data.to_vec(), columns })))
            },
        )],
    )]
}

#[cfg(test)]
mod tests {
    use crate::context::{Environment, ReducerContext};
    use crate::value::Value;
    use crate::{evaluate_string_to_result, result_to_string};

    const TABLE: &str = "Table.make({data: [1, 2, 3], columns: [{fn: {|x| x * 10}, name: \"tens\"}, {fn: {|x| x + 1}}]})";

    #[test]
    fn table_reports_its_shape() {
        let out = evaluate_string_to_result(TABLE, Environment::default());
        assert_eq!(result_to_string(&out), "Table with 2x3 elements");
    }

    #[test]
    fn cells_evaluate_lazily() {
        let Ok(Value::TableChart(t)) = evaluate_string_to_result(TABLE, Environment::default()) else {
            panic!("expected a table")
        };
        assert_eq!(t.columns[0].name.as_deref(), Some("tens"));
        assert_eq!(t.columns[1].name, None);
        let mut ctx = ReducerContext::new(Environment::default());
        assert_eq!(t.item(1, 0, &mut ctx).unwrap().to_string(), "20");
        assert_eq!(t.item(2, 1, &mut ctx).unwrap().to_string(), "4");
        assert!(t.item(3, 0, &mut ctx).is_err());
    }

    #[test]
    fn columns_require_functions() {
        let out = evaluate_string_to_result("Table.make({data: [1], columns: [{fn: 3}]})", Environment::default());
        assert!(result_to_string(&out).starts_with("Error(There are function matches for Table.make()"));
    }
}
