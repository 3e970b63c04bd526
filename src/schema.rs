//! Identifier validation.
//!
//! Table and column names end up in SQL text, so every name passes through
//! here before a statement is built. Values never do; they are always bound.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::DbError;

pub const ID_COLUMN: &str = "id";

const MAX_IDENT_LEN: usize = 64;

/// A table or column name that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    pub fn parse(name: &str) -> Result<Self, DbError> {
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if valid_start && valid_rest && name.len() <= MAX_IDENT_LEN {
            Ok(Ident(name.to_string()))
        } else {
            Err(DbError::Identifier(format!("{:?} is not a valid identifier", name)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Table/column allow-list.
///
/// A permissive schema only checks identifier syntax; a strict one also
/// requires the table and column to be listed. `id` is always accepted for a
/// listed table.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: Option<HashMap<String, HashSet<String>>>,
}

impl Schema {
    pub fn permissive() -> Self {
        Self { tables: None }
    }

    pub fn strict<T, C, I>(tables: T) -> Result<Self, DbError>
    where
        T: IntoIterator<Item = (String, I)>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let mut out = HashMap::new();
        for (table, columns) in tables {
            Ident::parse(&table)?;
            let mut set = HashSet::new();
            for column in columns {
                let column = column.into();
                Ident::parse(&column)?;
                set.insert(column);
            }
            set.insert(ID_COLUMN.to_string());
            out.insert(table, set);
        }
        Ok(Self { tables: Some(out) })
    }

    /// Builds the schema from the optional `[schema]` config section.
    pub fn from_config(section: Option<&BTreeMap<String, Vec<String>>>) -> Result<Self, DbError> {
        match section {
            Some(tables) => Self::strict(tables.iter().map(|(t, c)| (t.clone(), c.iter().cloned()))),
            None => Ok(Self::permissive()),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.tables.is_some()
    }

    pub fn table(&self, name: &str) -> Result<Ident, DbError> {
        let ident = Ident::parse(name)?;
        if let Some(tables) = &self.tables {
            if !tables.contains_key(name) {
                return Err(DbError::Identifier(format!("table {:?} is not allowed", name)));
            }
        }
        Ok(ident)
    }

    pub fn column(&self, table: &Ident, name: &str) -> Result<Ident, DbError> {
        let ident = Ident::parse(name)?;
        if let Some(tables) = &self.tables {
            let allowed = tables
                .get(table.as_str())
                .is_some_and(|columns| columns.contains(name));
            if !allowed {
                return Err(DbError::Identifier(format!(
                    "column {:?} is not allowed on table {:?}",
                    name,
                    table.as_str()
                )));
            }
        }
        Ok(ident)
    }
}
