use chrono::{DateTime, NaiveDate};
use duckdb::types::{TimeUnit, Value};

/// Renders a value the way it appears inside a result tuple: text quoted,
/// NULL as `None`.
pub fn literal_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Boolean(true) => "True".to_string(),
        Value::Boolean(false) => "False".to_string(),
        Value::Text(s) | Value::Enum(s) => quote(s),
        Value::Date32(_) | Value::Timestamp(_, _) => quote(&display_value(value)),
        _ => display_value(value),
    }
}

/// Plain rendering used for sample rows.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::TinyInt(v) => v.to_string(),
        Value::SmallInt(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::BigInt(v) => v.to_string(),
        Value::HugeInt(v) => v.to_string(),
        Value::UTinyInt(v) => v.to_string(),
        Value::USmallInt(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::UBigInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::Text(s) | Value::Enum(s) => s.clone(),
        Value::Date32(days) => date_from_days(*days),
        Value::Timestamp(unit, raw) => timestamp(*unit, *raw),
        other => format!("{:?}", other),
    }
}

pub fn tuple(values: &[String]) -> String {
    match values {
        [single] => format!("({},)", single),
        _ => format!("({})", values.join(", ")),
    }
}

pub fn create_table_ddl(table_name: &str, columns: &[(String, String, bool)]) -> String {
    let mut create_table = format!("CREATE TABLE {} (\n", table_name);

    for (i, (name, data_type, nullable)) in columns.iter().enumerate() {
        let null_str = if *nullable { "" } else { " NOT NULL" };
        create_table.push_str(&format!("    \"{}\" {}{}", name, data_type, null_str));

        if i < columns.len() - 1 {
            create_table.push_str(",\n");
        } else {
            create_table.push('\n');
        }
    }

    create_table.push(')');
    create_table
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "\\'"))
}

fn date_from_days(days: i32) -> String {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days as i64)))
        .map(|d| d.to_string())
        .unwrap_or_else(|| days.to_string())
}

fn timestamp(unit: TimeUnit, raw: i64) -> String {
    let micros = match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    };

    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.naive_utc().to_string())
        .unwrap_or_else(|| raw.to_string())
}
