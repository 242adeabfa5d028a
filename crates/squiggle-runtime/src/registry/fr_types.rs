//! Type descriptors for builtin arguments.
//!
//! `unpack` never fails loudly: `None` means "this definition does not apply"
//! and dispatch moves on to the next overload.

use crate::dist::{Dist, DistError};
use crate::lambda::Lambda;
use crate::value::{Scale, Value, ValueMap};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::Arc;

pub trait FrType: Send + Sync + 'static {
    type Output;

    fn unpack(&self, v: &Value) -> Option<Self::Output>;
    fn pack(&self, x: Self::Output) -> Value;
    fn name(&self) -> String;

    /// Output used when a dict field of this type is absent.
    fn missing(&self) -> Option<Self::Output> {
        None
    }

    fn is_optional(&self) -> bool {
        false
    }

    /// Packed form of a dict field; `None` leaves the key out.
    fn pack_field(&self, x: Self::Output) -> Option<Value> {
        Some(self.pack(x))
    }
}

macro_rules! fr_scalar {
    ($ty:ident, $ctor:ident, $out:ty, $name:literal, $variant:ident) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        pub fn $ctor() -> $ty {
            $ty
        }

        impl FrType for $ty {
            type Output = $out;

            fn unpack(&self, v: &Value) -> Option<$out> {
                match v {
                    Value::$variant(x) => Some(x.clone()),
                    _ => None,
                }
            }

            fn pack(&self, x: $out) -> Value {
                Value::$variant(x)
            }

            fn name(&self) -> String {
                $name.to_string()
            }
        }
    };
}

fr_scalar!(FrNumber, fr_number, f64, "number", Number);
fr_scalar!(FrString, fr_string, String, "string", String);
fr_scalar!(FrBool, fr_bool, bool, "bool", Bool);
fr_scalar!(FrDate, fr_date, DateTime<Utc>, "date", Date);
fr_scalar!(FrDuration, fr_duration, f64, "duration", Duration);
fr_scalar!(FrDist, fr_dist, Dist, "distribution", Dist);
fr_scalar!(FrLambda, fr_lambda, Lambda, "lambda", Lambda);
fr_scalar!(FrScale, fr_scale, Scale, "scale", Scale);

#[derive(Debug, Clone)]
pub enum DistOrNumber {
    Number(f64),
    Dist(Dist),
}

impl DistOrNumber {
    /// Numbers become point masses.
    pub fn into_dist(self) -> Result<Dist, DistError> {
        match self {
            DistOrNumber::Number(x) => Dist::point_mass(x),
            DistOrNumber::Dist(d) => Ok(d),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrDistOrNumber;

pub fn fr_dist_or_number() -> FrDistOrNumber {
    FrDistOrNumber
}

impl FrType for FrDistOrNumber {
    type Output = DistOrNumber;

    fn unpack(&self, v: &Value) -> Option<DistOrNumber> {
        match v {
            Value::Number(x) => Some(DistOrNumber::Number(*x)),
            Value::Dist(d) => Some(DistOrNumber::Dist(d.clone())),
            _ => None,
        }
    }

    fn pack(&self, x: DistOrNumber) -> Value {
        match x {
            DistOrNumber::Number(n) => Value::Number(n),
            DistOrNumber::Dist(d) => Value::Dist(d),
        }
    }

    fn name(&self) -> String {
        "distribution|number".into()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrAny;

pub fn fr_any() -> FrAny {
    FrAny
}

impl FrType for FrAny {
    type Output = Value;

    fn unpack(&self, v: &Value) -> Option<Value> {
        Some(v.clone())
    }

    fn pack(&self, x: Value) -> Value {
        x
    }

    fn name(&self) -> String {
        "any".into()
    }
}

/// Array of anything, unpacked without visiting the elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrArrayAny;

pub fn fr_array_any() -> FrArrayAny {
    FrArrayAny
}

impl FrType for FrArrayAny {
    type Output = Arc<Vec<Value>>;

    fn unpack(&self, v: &Value) -> Option<Self::Output> {
        match v {
            Value::Array(items) => Some(items.clone()),
            _ => None,
        }
    }

    fn pack(&self, x: Self::Output) -> Value {
        Value::Array(x)
    }

    fn name(&self) -> String {
        "list(any)".into()
    }
}

/// Dict of anything, unpacked without visiting the entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrDictAny;

pub fn fr_dict_any() -> FrDictAny {
    FrDictAny
}

impl FrType for FrDictAny {
    type Output = Arc<ValueMap>;

    fn unpack(&self, v: &Value) -> Option<Self::Output> {
        match v {
            Value::Dict(map) => Some(map.clone()),
            _ => None,
        }
    }

    fn pack(&self, x: Self::Output) -> Value {
        Value::Dict(x)
    }

    fn name(&self) -> String {
        "dict(any)".into()
    }
}

#[derive(Debug, Clone)]
pub struct FrArray<T>(pub T);

pub fn fr_array<T: FrType>(item: T) -> FrArray<T> {
    FrArray(item)
}

impl<T: FrType> FrType for FrArray<T> {
    type Output = Vec<T::Output>;

    fn unpack(&self, v: &Value) -> Option<Self::Output> {
        match v {
            Value::Array(items) => items.iter().map(|x| self.0.unpack(x)).collect(),
            _ => None,
        }
    }

    fn pack(&self, xs: Self::Output) -> Value {
        Value::array(xs.into_iter().map(|x| self.0.pack(x)).collect())
    }

    fn name(&self) -> String {
        format!("list({})", self.0.name())
    }
}

#[derive(Debug, Clone)]
pub struct FrTuple2<A, B>(pub A, pub B);

pub fn fr_tuple2<A: FrType, B: FrType>(a: A, b: B) -> FrTuple2<A, B> {
    FrTuple2(a, b)
}

impl<A: FrType, B: FrType> FrType for FrTuple2<A, B> {
    type Output = (A::Output, B::Output);

    fn unpack(&self, v: &Value) -> Option<Self::Output> {
        match v {
            Value::Array(items) if items.len() == 2 => {
                Some((self.0.unpack(&items[0])?, self.1.unpack(&items[1])?))
            }
            _ => None,
        }
    }

    fn pack(&self, (a, b): Self::Output) -> Value {
        Value::array(vec![self.0.pack(a), self.1.pack(b)])
    }

    fn name(&self) -> String {
        format!("tuple({}, {})", self.0.name(), self.1.name())
    }
}

#[derive(Debug, Clone)]
pub struct FrDictWithArbitraryKeys<T>(pub T);

pub fn fr_dict_with_arbitrary_keys<T: FrType>(item: T) -> FrDictWithArbitraryKeys<T> {
    FrDictWithArbitraryKeys(item)
}

impl<T: FrType> FrType for FrDictWithArbitraryKeys<T> {
    type Output = IndexMap<String, T::Output>;

    fn unpack(&self, v: &Value) -> Option<Self::Output> {
        match v {
            Value::Dict(map) => {
                map.iter().map(|(k, x)| Some((k.clone(), self.0.unpack(x)?))).collect()
            }
            _ => None,
        }
    }

    fn pack(&self, xs: Self::Output) -> Value {
        Value::dict(xs.into_iter().map(|(k, x)| (k, self.0.pack(x))).collect())
    }

    fn name(&self) -> String {
        format!("dict({})", self.0.name())
    }
}

#[derive(Debug, Clone)]
pub struct FrOptional<T>(pub T);

pub fn fr_optional<T: FrType>(inner: T) -> FrOptional<T> {
    FrOptional(inner)
}

impl<T: FrType> FrType for FrOptional<T> {
    type Output = Option<T::Output>;

    fn unpack(&self, v: &Value) -> Option<Self::Output> {
        self.0.unpack(v).map(Some)
    }

    fn pack(&self, x: Self::Output) -> Value {
        match x {
            Some(x) => self.0.pack(x),
            None => Value::Void,
        }
    }

    fn name(&self) -> String {
        format!("optional({})", self.0.name())
    }

    fn missing(&self) -> Option<Self::Output> {
        Some(None)
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn pack_field(&self, x: Self::Output) -> Option<Value> {
        x.map(|x| self.0.pack(x))
    }
}

fn dict_field<T: FrType>(map: &ValueMap, key: &str, ty: &T) -> Option<T::Output> {
    match map.get(key) {
        Some(v) => ty.unpack(v),
        None => ty.missing(),
    }
}

fn field_name<T: FrType>(key: &str, ty: &T) -> String {
    format!("{}: {}", key, ty.name())
}

macro_rules! fr_dict {
    ($ty:ident, $ctor:ident, $(($T:ident, $f:ident, $idx:tt)),+) => {
        /// Dict with fixed keys. Extra keys are ignored.
        #[derive(Debug, Clone)]
        pub struct $ty<$($T),+> {
            $(pub $f: (&'static str, $T),)+
        }

        pub fn $ctor<$($T: FrType),+>($($f: (&'static str, $T)),+) -> $ty<$($T),+> {
            $ty { $($f),+ }
        }

        impl<$($T: FrType),+> FrType for $ty<$($T),+> {
            type Output = ($($T::Output,)+);

            fn unpack(&self, v: &Value) -> Option<Self::Output> {
                let Value::Dict(map) = v else { return None };
                Some(($(dict_field(map, self.$f.0, &self.$f.1)?,)+))
            }

            fn pack(&self, x: Self::Output) -> Value {
                let mut map = ValueMap::new();
                $(
                    if let Some(v) = self.$f.1.pack_field(x.$idx) {
                        map.insert(self.$f.0.to_string(), v);
                    }
                )+
                Value::dict(map)
            }

            fn name(&self) -> String {
                let fields = [$(field_name(self.$f.0, &self.$f.1)),+];
                format!("{{{}}}", fields.join(", "))
            }
        }
    };
}

fr_dict!(FrDict1, fr_dict1, (A, a, 0));
fr_dict!(FrDict2, fr_dict2, (A, a, 0), (B, b, 1));
fr_dict!(FrDict3, fr_dict3, (A, a, 0), (B, b, 1), (C, c, 2));
fr_dict!(FrDict4, fr_dict4, (A, a, 0), (B, b, 1), (C, c, 2), (D, d, 3));
fr_dict!(FrDict5, fr_dict5, (A, a, 0), (B, b, 1), (C, c, 2), (D, d, 3), (E, e, 4));

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(entries: &[(&str, Value)]) -> Value {
        Value::dict(entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    #[test]
    fn array_unpack_fails_on_any_bad_element() {
        let ty = fr_array(fr_number());
        let ok = Value::array(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(ty.unpack(&ok), Some(vec![1.0, 2.0]));
        let bad = Value::array(vec![Value::Number(1.0), Value::string("x")]);
        assert_eq!(ty.unpack(&bad), None);
        assert_eq!(ty.name(), "list(number)");
    }

    #[test]
    fn absent_optional_field_is_none() {
        let ty = fr_dict2(("min", fr_optional(fr_number())), ("max", fr_optional(fr_number())));
        let v = dict(&[("min", Value::Number(3.0)), ("extra", Value::Bool(true))]);
        assert_eq!(ty.unpack(&v), Some((Some(3.0), None)));
        assert_eq!(ty.name(), "{min: optional(number), max: optional(number)}");
    }

    #[test]
    fn absent_required_field_fails() {
        let ty = fr_dict2(("mean", fr_number()), ("stdev", fr_number()));
        assert!(ty.unpack(&dict(&[("mean", Value::Number(0.0))])).is_none());
    }

    #[test]
    fn optional_fields_are_dropped_when_packing() {
        let ty = fr_dict2(("a", fr_number()), ("b", fr_optional(fr_string())));
        assert_eq!(ty.pack((1.0, None)).to_string(), "{a: 1}");
    }

    #[test]
    fn tuple_requires_exact_length() {
        let ty = fr_tuple2(fr_string(), fr_any());
        let three = Value::array(vec![Value::string("a"), Value::Number(1.0), Value::Void]);
        assert!(ty.unpack(&three).is_none());
    }

    #[test]
    fn array_any_shares_storage() {
        let inner = Arc::new(vec![Value::Number(1.0)]);
        let out = fr_array_any().unpack(&Value::Array(inner.clone())).unwrap();
        assert!(Arc::ptr_eq(&inner, &out));
    }
}
