use crate::error::RuntimeError;
use crate::registry::*;
use crate::value::{Value, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_YEAR};
use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Utc};

const DATE: FnFactory = FnFactory::new("Date", true);
const DURATION: FnFactory = FnFactory::new("Duration", true);

fn year_start(year: i32) -> Result<DateTime<Utc>, RuntimeError> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| RuntimeError::other(format!("Year {} is out of range", year)))
}

fn integer(x: f64, what: &str) -> Result<i32, RuntimeError> {
    if x.fract() != 0.0 || x.abs() > i32::MAX as f64 {
        return Err(RuntimeError::other(format!("{} must be an integer", what)));
    }
    Ok(x as i32)
}

fn make_date(year: f64, month: f64, day: f64) -> Result<Value, RuntimeError> {
    let (y, m, d) = (integer(year, "Year")?, integer(month, "Month")?, integer(day, "Day")?);
    if m < 1 || d < 1 {
        return Err(RuntimeError::other("Invalid date"));
    }
    Utc.with_ymd_and_hms(y, m as u32, d as u32, 0, 0, 0)
        .single()
        .map(Value::Date)
        .ok_or_else(|| RuntimeError::other("Invalid date"))
}

// Fractional years are spread over that calendar year's actual length
fn from_year(year: f64) -> Result<Value, RuntimeError> {
    let whole = integer(year.floor(), "Year")?;
    let start = year_start(whole)?;
    let length = (year_start(whole + 1)? - start).num_milliseconds() as f64;
    TimeDelta::try_milliseconds(((year - year.floor()) * length).round() as i64)
        .and_then(|offset| start.checked_add_signed(offset))
        .map(Value::Date)
        .ok_or_else(|| RuntimeError::other("Date is out of range"))
}

fn to_year(d: DateTime<Utc>) -> Result<Value, RuntimeError> {
    let start = year_start(d.year())?;
    let length = (year_start(d.year() + 1)? - start).num_milliseconds() as f64;
    let elapsed = (d - start).num_milliseconds() as f64;
    Ok(Value::Number(d.year() as f64 + elapsed / length))
}

fn from_unit(name: &'static str, ms: f64) -> FrFunction {
    DURATION.make(name, vec![make_definition1(fr_number(), move |x, _| Ok(Value::Duration(x * ms)))])
}

fn to_unit(name: &'static str, ms: f64) -> FrFunction {
    DURATION.make(name, vec![make_definition1(fr_duration(), move |x, _| Ok(Value::Number(x / ms)))])
}

pub fn library() -> Vec<FrFunction> {
    vec![
        DATE.make(
            "make",
            vec![make_definition3(fr_number(), fr_number(), fr_number(), |y, m, d, _| make_date(y, m, d))],
        ),
        DATE.make("fromYear", vec![make_definition1(fr_number(), |y, _| from_year(y))]),
        DATE.make("toYear", vec![make_definition1(fr_date(), |d, _| to_year(d))]),
        from_unit("fromMinutes", MS_PER_MINUTE),
        from_unit("fromHours", MS_PER_HOUR),
        from_unit("fromDays", MS_PER_DAY),
        from_unit("fromYears", MS_PER_YEAR),
        to_unit("toMinutes", MS_PER_MINUTE),
        to_unit("toHours", MS_PER_HOUR),
        to_unit("toDays", MS_PER_DAY),
        to_unit("toYears", MS_PER_YEAR),
    ]
}
