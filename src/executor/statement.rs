use crate::error::DbError;
use crate::schema::{ID_COLUMN, Ident, Schema};
use crate::udbc::driver::Driver;
use crate::udbc::value::{Record, Value};

/// SQL text plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<(String, Value)>,
}

pub fn select_last(
    driver: &dyn Driver,
    schema: &Schema,
    table: &str,
    column: &str,
) -> Result<Statement, DbError> {
    let table = schema.table(table)?;
    let column = schema.column(&table, column)?;
    let id = schema.column(&table, ID_COLUMN)?;
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {} DESC LIMIT 1",
        driver.quote_ident(column.as_str()),
        driver.quote_ident(table.as_str()),
        driver.quote_ident(id.as_str()),
    );
    Ok(Statement {
        sql,
        params: Vec::new(),
    })
}

pub fn insert(
    driver: &dyn Driver,
    schema: &Schema,
    table: &str,
    record: &Record,
) -> Result<Statement, DbError> {
    let table = schema.table(table)?;
    let columns = resolve_columns(schema, &table, record)?;
    let names = columns
        .iter()
        .map(|c| driver.quote_ident(c.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = columns
        .iter()
        .enumerate()
        .map(|(i, c)| driver.placeholder(i + 1, c.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        driver.quote_ident(table.as_str()),
        names,
        placeholders
    );
    Ok(Statement {
        sql,
        params: record.as_slice().to_vec(),
    })
}

pub fn update(
    driver: &dyn Driver,
    schema: &Schema,
    table: &str,
    record_id: u64,
    record: &Record,
) -> Result<Statement, DbError> {
    if record.is_empty() {
        return Err(DbError::Query(format!("no columns to update in {}", table)));
    }
    let table = schema.table(table)?;
    let columns = resolve_columns(schema, &table, record)?;
    let id = schema.column(&table, ID_COLUMN)?;
    let set_clause = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{} = {}",
                driver.quote_ident(c.as_str()),
                driver.placeholder(i + 1, c.as_str())
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        driver.quote_ident(table.as_str()),
        set_clause,
        driver.quote_ident(id.as_str()),
        driver.placeholder(columns.len() + 1, ID_COLUMN)
    );
    let mut params = record.as_slice().to_vec();
    params.push((ID_COLUMN.to_string(), Value::from(record_id)));
    Ok(Statement { sql, params })
}

fn resolve_columns(schema: &Schema, table: &Ident, record: &Record) -> Result<Vec<Ident>, DbError> {
    record.columns().map(|c| schema.column(table, c)).collect()
}
