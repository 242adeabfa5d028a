use crate::error::RuntimeError;
use crate::registry::*;
use crate::value::{Value, ValueMap};

const MAKER: FnFactory = FnFactory::new("Dict", true);

pub fn library() -> Vec<FrFunction> {
    vec![
        MAKER.make(
            "set",
            vec![make_definition3(fr_dict_any(), fr_string(), fr_any(), |dict, key, value, _| {
                let mut out = (*dict).clone();
                out.insert(key, value);
                Ok(Value::dict(out))
            })],
        ),
        MAKER.make(
            "merge",
            vec![make_definition2(fr_dict_any(), fr_dict_any(), |a, b, _| {
                let mut out = (*a).clone();
                out.extend(b.iter().map(|(k, v)| (k.clone(), v.clone())));
                Ok(Value::dict(out))
            })],
        ),
        MAKER.make(
            "mergeMany",
            vec![make_definition1(fr_array(fr_dict_any()), |dicts, _| {
                let mut out = ValueMap::new();
                for d in dicts {
                    out.extend(d.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Ok(Value::dict(out))
            })],
        ),
        MAKER.make(
            "keys",
            vec![make_definition1(fr_dict_any(), |dict, _| {
                Ok(Value::array(dict.keys().map(|k| Value::string(k.as_str())).collect()))
            })],
        ),
        MAKER.make(
            "values",
            vec![make_definition1(fr_dict_any(), |dict, _| {
                Ok(Value::array(dict.values().cloned().collect()))
            })],
        ),
        MAKER.make(
            "toList",
            vec![make_definition1(fr_dict_any(), |dict, _| {
                let pairs = dict
                    .iter()
                    .map(|(k, v)| Value::array(vec![Value::string(k.as_str()), v.clone()]))
                    .collect();
                Ok(Value::array(pairs))
            })],
        ),
        MAKER.make(
            "fromList",
            vec![make_definition1(fr_array(fr_tuple2(fr_string(), fr_any())), |pairs, _| {
                Ok(Value::dict(pairs.into_iter().collect()))
            })],
        ),
        MAKER.make(
            "map",
            vec![make_definition2(fr_dict_any(), fr_lambda(), |dict, f, ctx| {
                let mut out = ValueMap::with_capacity(dict.len());
                for (k, v) in dict.iter() {
                    out.insert(k.clone(), f.call(std::slice::from_ref(v), ctx)?);
                }
                Ok(Value::dict(out))
            })],
        ),
        MAKER.make(
            "mapKeys",
            vec![make_definition2(fr_dict_any(), fr_lambda(), |dict, f, ctx| {
                let mut out = ValueMap::with_capacity(dict.len());
                for (k, v) in dict.iter() {
                    match f.call(&[Value::string(k.as_str())], ctx)? {
                        // later entries overwrite earlier ones with the same key
                        Value::String(mapped) => {
                            out.insert(mapped, v.clone());
                        }
                        _ => return Err(RuntimeError::other("mapKeys: lambda must return a string")),
                    }
                }
                Ok(Value::dict(out))
            })],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::{evaluate_string_to_result, result_to_string, Environment};

    fn eval(code: &str) -> String {
        result_to_string(&evaluate_string_to_result(code, Environment::default()))
    }

    #[test]
    fn map_over_values() {
        assert_eq!(eval("Dict.map({a: 1, b: 2}, {|x| x + 1})"), "{a: 2,b: 3}");
    }

    #[test]
    fn map_keys_collisions_keep_last_value() {
        assert_eq!(eval("Dict.mapKeys({a: 1, b: 2}, {|x| \"z\"})"), "{z: 2}");
        assert_eq!(eval("Dict.mapKeys({a: 1}, {|x| concat(x, \"-1\")})"), "{a-1: 1}");
        assert_eq!(
            eval("Dict.mapKeys({a: 1}, {|x| 3})"),
            "Error(mapKeys: lambda must return a string)"
        );
    }

    #[test]
    fn construction_helpers() {
        assert_eq!(eval("Dict.set({a: 1}, \"b\", 2)"), "{a: 1,b: 2}");
        assert_eq!(eval("Dict.merge({a: 1, b: 2}, {b: 3})"), "{a: 1,b: 3}");
        assert_eq!(eval("Dict.mergeMany([{a: 1}, {b: 2}])"), "{a: 1,b: 2}");
        assert_eq!(eval("Dict.keys({a: 1, b: 2})"), "[\"a\",\"b\"]");
        assert_eq!(eval("Dict.values({a: 1, b: 2})"), "[1,2]");
        assert_eq!(eval("Dict.toList({a: 1})"), "[[\"a\",1]]");
        assert_eq!(eval("Dict.fromList([[\"a\", 1], [\"b\", 2]])"), "{a: 1,b: 2}");
    }

    #[test]
    fn set_leaves_original_untouched() {
        assert_eq!(eval("d = {a: 1}\ne = Dict.set(d, \"a\", 5)\n[d.a, e.a]"), "[1,5]");
    }

    #[test]
    fn callback_failures_propagate() {
        assert_eq!(eval("Dict.map({a: 1}, {|x| x.foo})"), "Error(Can't access a property of a value of type Number)");
    }
}
