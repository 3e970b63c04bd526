use crate::udbc::value::Value;
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use mysql_async::Value as MyValue;
use mysql_async::consts::ColumnType;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Converts one column of a fetched row. `column_type` picks how textual
/// payloads are read back: DECIMAL as [`Decimal`], text as UTF-8 when valid.
pub fn from_mysql_value(v: &MyValue, column_type: ColumnType) -> Value {
    match v {
        MyValue::NULL => Value::Null,
        MyValue::Int(i) => Value::I64(*i),
        MyValue::UInt(u) => Value::U64(*u),
        MyValue::Float(f) => Value::F64(*f as f64),
        MyValue::Double(d) => Value::F64(*d),
        MyValue::Bytes(b) => from_bytes(b, column_type),
        MyValue::Date(y, m, d, h, min, s, micro) => {
            let Some(date) = NaiveDate::from_ymd_opt(*y as i32, *m as u32, *d as u32) else {
                // zero dates such as 0000-00-00
                return Value::Str(format!("{:04}-{:02}-{:02}", y, m, d));
            };
            if *h == 0 && *min == 0 && *s == 0 && *micro == 0 && column_type == ColumnType::MYSQL_TYPE_DATE {
                return Value::Date(date);
            }
            match date.and_hms_micro_opt(*h as u32, *min as u32, *s as u32, *micro) {
                Some(dt) => Value::DateTime(dt),
                None => Value::Date(date),
            }
        }
        MyValue::Time(is_neg, days, h, min, s, micro) => {
            let total_h = *days * 24 + (*h as u32);
            match NaiveTime::from_hms_micro_opt(total_h, *min as u32, *s as u32, *micro) {
                Some(t) if !*is_neg => Value::Time(t),
                _ => Value::Str(format!(
                    "{}{:02}:{:02}:{:02}.{:06}",
                    if *is_neg { "-" } else { "" },
                    total_h,
                    min,
                    s,
                    micro
                )),
            }
        }
    }
}

fn from_bytes(b: &[u8], column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            match std::str::from_utf8(b).ok().and_then(|s| Decimal::from_str(s).ok()) {
                Some(d) => Value::Decimal(d),
                None => Value::Bytes(b.to_vec()),
            }
        }
        ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_GEOMETRY
        | ColumnType::MYSQL_TYPE_BIT => match std::str::from_utf8(b) {
            // TEXT columns are reported as BLOB too
            Ok(s) => Value::Str(s.to_string()),
            Err(_) => Value::Bytes(b.to_vec()),
        },
        _ => match String::from_utf8(b.to_vec()) {
            Ok(s) => Value::Str(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
    }
}

pub fn to_mysql_value(v: &Value) -> MyValue {
    match v {
        Value::Null => MyValue::NULL,
        Value::Bool(b) => MyValue::Int(if *b { 1 } else { 0 }),
        Value::I16(i) => MyValue::Int(*i as i64),
        Value::I32(i) => MyValue::Int(*i as i64),
        Value::I64(i) => MyValue::Int(*i),
        Value::U8(u) => MyValue::UInt(*u as u64),
        Value::U64(u) => MyValue::UInt(*u),
        Value::F64(f) => MyValue::Double(*f),
        Value::Str(s) => MyValue::Bytes(s.clone().into_bytes()),
        Value::Bytes(b) => MyValue::Bytes(b.clone()),
        Value::Date(d) => MyValue::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0),
        Value::Time(t) => MyValue::Time(
            false,
            0u32,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            t.nanosecond() / 1000,
        ),
        Value::DateTime(dt) => MyValue::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.and_utc().timestamp_subsec_micros(),
        ),
        Value::DateTimeUtc(dt) => {
            let ndt = dt.naive_utc();
            MyValue::Date(
                ndt.year() as u16,
                ndt.month() as u8,
                ndt.day() as u8,
                ndt.hour() as u8,
                ndt.minute() as u8,
                ndt.second() as u8,
                ndt.and_utc().timestamp_subsec_micros(),
            )
        }
        Value::Decimal(d) => MyValue::Bytes(d.to_string().into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varchar_bytes_become_string() {
        let v = from_mysql_value(&MyValue::Bytes(b"oven1".to_vec()), ColumnType::MYSQL_TYPE_VAR_STRING);
        assert_eq!(v, Value::Str("oven1".into()));
    }

    #[test]
    fn test_decimal_column() {
        let v = from_mysql_value(&MyValue::Bytes(b"72.50".to_vec()), ColumnType::MYSQL_TYPE_NEWDECIMAL);
        assert_eq!(v, Value::Decimal(Decimal::from_str("72.50").unwrap()));
    }

    #[test]
    fn test_float_widened() {
        let v = from_mysql_value(&MyValue::Float(72.5), ColumnType::MYSQL_TYPE_FLOAT);
        assert_eq!(v, Value::F64(72.5));
    }

    #[test]
    fn test_zero_date_kept_as_text() {
        let v = from_mysql_value(&MyValue::Date(0, 0, 0, 0, 0, 0, 0), ColumnType::MYSQL_TYPE_DATETIME);
        assert_eq!(v, Value::Str("0000-00-00".into()));
    }

    #[test]
    fn test_midnight_datetime_stays_datetime() {
        let v = from_mysql_value(&MyValue::Date(2024, 5, 1, 0, 0, 0, 0), ColumnType::MYSQL_TYPE_DATETIME);
        assert!(matches!(v, Value::DateTime(_)));
        let v = from_mysql_value(&MyValue::Date(2024, 5, 1, 0, 0, 0, 0), ColumnType::MYSQL_TYPE_DATE);
        assert!(matches!(v, Value::Date(_)));
    }

    #[test]
    fn test_unsigned_bigint_is_lossless() {
        let big = (1u64 << 63) + 5;
        let v = from_mysql_value(&MyValue::UInt(big), ColumnType::MYSQL_TYPE_LONGLONG);
        assert_eq!(v, Value::U64(big));
        assert_eq!(to_mysql_value(&v), MyValue::UInt(big));
    }

    #[test]
    fn test_bool_param() {
        assert_eq!(to_mysql_value(&Value::Bool(true)), MyValue::Int(1));
        assert_eq!(to_mysql_value(&Value::Null), MyValue::NULL);
    }
}
