//! Conversion of loosely typed grid input into typed column values.
//!
//! Grid widgets post field values as JSON or, for form posts, as plain strings. Each
//! value is converted according to the column's declared [`ColumnType`] before it reaches
//! an active model, so `"12"` becomes an integer for an integer column and `""` becomes
//! `NULL` for a numeric one.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ColumnType, DbErr, EntityTrait, Value};
use serde_json::{Map, Value as Json};
use std::fmt::Display;
use uuid::Uuid;

use crate::RecordId;
use crate::errors::GridError;
use crate::traits::GridResource;

/// Field values keyed by column name
pub type Fields = Map<String, Json>;

/// Parse a record id from a JSON number or numeric string.
#[must_use]
pub fn parse_record_id(value: &Json) -> Option<RecordId> {
    match value {
        Json::Number(number) => number.as_i64().and_then(|id| RecordId::try_from(id).ok()),
        Json::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Convert a JSON value to the database value for `column`.
pub fn to_db_value<C: ColumnTrait>(column: &C, value: &Json) -> Result<Value, String> {
    let column_type = column.def().get_column_type().clone();
    convert(&column_type, value)
}

#[allow(clippy::cast_possible_truncation)]
fn convert(column_type: &ColumnType, value: &Json) -> Result<Value, String> {
    let converted = match column_type {
        ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => match text(value)? {
            Some(text) => Value::from(text),
            None => Value::String(None),
        },
        ColumnType::TinyInteger => Value::TinyInt(narrow(integer(value)?)?),
        ColumnType::SmallInteger => Value::SmallInt(narrow(integer(value)?)?),
        ColumnType::Integer => Value::Int(narrow(integer(value)?)?),
        ColumnType::BigInteger => Value::BigInt(integer(value)?),
        ColumnType::TinyUnsigned => Value::TinyUnsigned(narrow(unsigned(value)?)?),
        ColumnType::SmallUnsigned => Value::SmallUnsigned(narrow(unsigned(value)?)?),
        ColumnType::Unsigned => Value::Unsigned(narrow(unsigned(value)?)?),
        ColumnType::BigUnsigned => Value::BigUnsigned(unsigned(value)?),
        ColumnType::Float => Value::Float(float(value)?.map(|f| f as f32)),
        ColumnType::Double => Value::Double(float(value)?),
        ColumnType::Boolean => Value::Bool(boolean(value)?),
        ColumnType::TimestampWithTimeZone => match timestamp(value)? {
            Some(at) => Value::from(at.with_timezone(&Utc)),
            None => Value::ChronoDateTimeUtc(None),
        },
        ColumnType::DateTime | ColumnType::Timestamp => match timestamp(value)? {
            Some(at) => Value::from(at.naive_utc()),
            None => Value::ChronoDateTime(None),
        },
        ColumnType::Date => match parsed::<NaiveDate>(value, "date")? {
            Some(date) => Value::from(date),
            None => Value::ChronoDate(None),
        },
        ColumnType::Time => match parsed::<NaiveTime>(value, "time")? {
            Some(time) => Value::from(time),
            None => Value::ChronoTime(None),
        },
        ColumnType::Uuid => match parsed::<Uuid>(value, "uuid")? {
            Some(uuid) => Value::from(uuid),
            None => Value::Uuid(None),
        },
        ColumnType::Json | ColumnType::JsonBinary => match value {
            Json::Null => Value::Json(None),
            other => Value::from(other.clone()),
        },
        other => return Err(format!("unsupported column type {other:?}")),
    };
    Ok(converted)
}

/// JSON null and blank strings count as missing
fn blank(value: &Json) -> bool {
    match value {
        Json::Null => true,
        Json::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Whether `value` converts to NULL for a column of `column_type`
fn missing(column_type: &ColumnType, value: &Json) -> bool {
    match column_type {
        ColumnType::Char(_)
        | ColumnType::String(_)
        | ColumnType::Text
        | ColumnType::Json
        | ColumnType::JsonBinary => value.is_null(),
        _ => blank(value),
    }
}

fn text(value: &Json) -> Result<Option<String>, String> {
    match value {
        Json::Null => Ok(None),
        Json::String(text) => Ok(Some(text.clone())),
        Json::Number(number) => Ok(Some(number.to_string())),
        Json::Bool(flag) => Ok(Some(flag.to_string())),
        other => Err(format!("expected text, got {other}")),
    }
}

fn integer(value: &Json) -> Result<Option<i64>, String> {
    if blank(value) {
        return Ok(None);
    }
    match value {
        Json::Number(number) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("expected an integer, got {number}")),
        Json::String(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("expected an integer, got '{text}'")),
        Json::Bool(flag) => Ok(Some(i64::from(*flag))),
        other => Err(format!("expected an integer, got {other}")),
    }
}

fn unsigned(value: &Json) -> Result<Option<u64>, String> {
    if blank(value) {
        return Ok(None);
    }
    match value {
        Json::Number(number) => number
            .as_u64()
            .map(Some)
            .ok_or_else(|| format!("expected an unsigned integer, got {number}")),
        Json::String(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("expected an unsigned integer, got '{text}'")),
        other => Err(format!("expected an unsigned integer, got {other}")),
    }
}

fn narrow<S, T>(value: Option<S>) -> Result<Option<T>, String>
where
    S: Copy + Display,
    T: TryFrom<S>,
{
    value
        .map(|v| T::try_from(v).map_err(|_| format!("{v} is out of range")))
        .transpose()
}

fn float(value: &Json) -> Result<Option<f64>, String> {
    if blank(value) {
        return Ok(None);
    }
    match value {
        Json::Number(number) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("expected a number, got {number}")),
        Json::String(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("expected a number, got '{text}'")),
        other => Err(format!("expected a number, got {other}")),
    }
}

fn boolean(value: &Json) -> Result<Option<bool>, String> {
    if blank(value) {
        return Ok(None);
    }
    match value {
        Json::Bool(flag) => Ok(Some(*flag)),
        Json::Number(number) => match number.as_i64() {
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            _ => Err(format!("expected a boolean, got {number}")),
        },
        Json::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(format!("expected a boolean, got '{text}'")),
        },
        other => Err(format!("expected a boolean, got {other}")),
    }
}

fn timestamp(value: &Json) -> Result<Option<DateTime<FixedOffset>>, String> {
    if blank(value) {
        return Ok(None);
    }
    let Json::String(text) = value else {
        return Err(format!("expected a timestamp, got {value}"));
    };
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(at));
    }
    // Naive timestamps are taken as UTC
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Some(naive.and_utc().fixed_offset()))
        .ok_or_else(|| format!("expected a timestamp, got '{text}'"))
}

fn parsed<T: std::str::FromStr>(value: &Json, what: &str) -> Result<Option<T>, String> {
    if blank(value) {
        return Ok(None);
    }
    match value {
        Json::String(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("expected a {what}, got '{text}'")),
        other => Err(format!("expected a {what}, got {other}")),
    }
}

/// The same instant in each chrono form a timestamp field may be declared with.
///
/// Empty for values that are not timestamps.
fn timestamp_forms(value: &Value) -> Vec<Value> {
    let instant = match value {
        Value::ChronoDateTimeUtc(at) => at.as_ref().map(|at| at.fixed_offset()),
        Value::ChronoDateTimeWithTimeZone(at) => at.as_ref().map(|at| at.fixed_offset()),
        Value::ChronoDateTime(at) => at.as_ref().map(|at| at.and_utc().fixed_offset()),
        _ => return Vec::new(),
    };
    match instant {
        Some(at) => vec![
            Value::from(at),
            Value::from(at.with_timezone(&Utc)),
            Value::from(at.naive_utc()),
        ],
        None => vec![
            Value::ChronoDateTimeWithTimeZone(None),
            Value::ChronoDateTimeUtc(None),
            Value::ChronoDateTime(None),
        ],
    }
}

/// Set `column` on `active` without panicking on a field type mismatch.
///
/// Timestamps are retried in the other chrono forms, since the column type alone does not
/// tell `DateTime<Utc>` from `DateTime<FixedOffset>` fields.
pub(crate) fn assign<A: ActiveModelTrait>(
    active: &mut A,
    name: &str,
    column: <A::Entity as EntityTrait>::Column,
    value: Value,
) -> Result<(), GridError> {
    let mut failure = match active.try_set(column, value.clone()) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    for form in timestamp_forms(&value) {
        match active.try_set(column, form) {
            Ok(()) => return Ok(()),
            Err(e) => failure = e,
        }
    }
    Err(GridError::invalid(format!("field '{name}': {failure}")))
}

/// Copy every selected editable field present in `fields` onto `active`.
///
/// Keys that do not name an editable column are ignored. A value that does not convert
/// to its column type fails the whole population.
pub fn populate<R: GridResource>(
    active: &mut R::ActiveModel,
    fields: &Fields,
    select: impl Fn(&str) -> bool,
) -> Result<(), GridError> {
    for (name, column) in R::editable_columns() {
        if !select(name) {
            continue;
        }
        if let Some(raw) = fields.get(name) {
            let def = column.def();
            if !def.is_null() && missing(def.get_column_type(), raw) {
                return Err(GridError::invalid(format!("field '{name}' cannot be empty")));
            }
            let value = to_db_value(&column, raw)
                .map_err(|reason| GridError::invalid(format!("field '{name}': {reason}")))?;
            assign(active, name, column, value)?;
        }
    }
    Ok(())
}

/// Serialize a model and reduce it to the grid columns. The id field is always kept.
pub fn format_row<R: GridResource>(model: &R::Model) -> Result<Json, GridError> {
    let value = serde_json::to_value(model).map_err(|e| DbErr::Json(e.to_string()))?;
    let Json::Object(mut object) = value else {
        return Ok(value);
    };
    let id_field = R::id_field();
    let columns = R::grid_columns();
    object.retain(|key, _| {
        key == id_field || columns.iter().any(|column| *column == key.as_str())
    });
    Ok(Json::Object(object))
}
