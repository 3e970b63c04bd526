//! In-memory `Driver` used by the integration tests.
//!
//! It understands exactly the statements the facade generates, pulling the
//! backtick-quoted identifiers out of the SQL text. Writes are staged per
//! connection and only become visible on COMMIT.

#![allow(dead_code)]

use async_trait::async_trait;
use hornodb::udbc::connection::Connection;
use hornodb::udbc::driver::Driver;
use hornodb::{DbError, Record, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Default)]
struct Table {
    next_id: u64,
    rows: BTreeMap<u64, Record>,
}

#[derive(Default)]
struct Store {
    tables: BTreeMap<String, Table>,
}

pub struct MemoryDriver {
    store: Arc<Mutex<Store>>,
    slots: Arc<Semaphore>,
    pool_size: usize,
    fail_next_execute: Arc<Mutex<Option<String>>>,
    executed: Arc<Mutex<Vec<String>>>,
    acquired: AtomicUsize,
}

impl MemoryDriver {
    pub fn new(pool_size: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            slots: Arc::new(Semaphore::new(pool_size)),
            pool_size,
            fail_next_execute: Arc::new(Mutex::new(None)),
            executed: Arc::new(Mutex::new(Vec::new())),
            acquired: AtomicUsize::new(0),
        }
    }

    pub fn with_table(self, table: &str) -> Self {
        self.store
            .lock()
            .unwrap()
            .tables
            .insert(table.to_string(), Table::default());
        self
    }

    pub fn row(&self, table: &str, id: u64) -> Option<Record> {
        let store = self.store.lock().unwrap();
        store.tables.get(table)?.rows.get(&id).cloned()
    }

    pub fn row_count(&self, table: &str) -> usize {
        let store = self.store.lock().unwrap();
        store.tables.get(table).map_or(0, |t| t.rows.len())
    }

    /// Connections currently checked out.
    pub fn checked_out(&self) -> usize {
        self.pool_size - self.slots.available_permits()
    }

    pub fn acquired_total(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Makes the next write fail as if the server rejected it.
    pub fn fail_next_execute(&self, message: &str) {
        *self.fail_next_execute.lock().unwrap() = Some(message.to_string());
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    fn name(&self) -> &str {
        "memory"
    }

    fn placeholder(&self, _param_seq: usize, _param_name: &str) -> String {
        "?".to_string()
    }

    async fn connection(&self) -> Result<Arc<dyn Connection>, DbError> {
        let permit = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DbError::Connection("pool closed".into()))?;
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemoryConnection {
            store: self.store.clone(),
            fail_next_execute: self.fail_next_execute.clone(),
            executed: self.executed.clone(),
            state: Mutex::new(ConnState::default()),
            _permit: permit,
        }))
    }

    async fn close(&self) -> Result<(), DbError> {
        self.slots.close();
        Ok(())
    }
}

enum Pending {
    Insert { table: String, id: u64, row: Record },
    Update { table: String, id: u64, changes: Record },
}

#[derive(Default)]
struct ConnState {
    in_tx: bool,
    pending: Vec<Pending>,
    last_insert_id: u64,
}

struct MemoryConnection {
    store: Arc<Mutex<Store>>,
    fail_next_execute: Arc<Mutex<Option<String>>>,
    executed: Arc<Mutex<Vec<String>>>,
    state: Mutex<ConnState>,
    _permit: OwnedSemaphorePermit,
}

fn quoted(sql: &str) -> Vec<String> {
    sql.split('`')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s.to_string())
        .collect()
}

fn missing_table(table: &str) -> DbError {
    DbError::Query(format!("Table '{}' doesn't exist (1146)", table))
}

impl MemoryConnection {
    fn apply(store: &mut Store, op: Pending) {
        match op {
            Pending::Insert { table, id, row } => {
                if let Some(t) = store.tables.get_mut(&table) {
                    t.rows.insert(id, row);
                }
            }
            Pending::Update { table, id, changes } => {
                if let Some(row) = store.tables.get_mut(&table).and_then(|t| t.rows.get_mut(&id)) {
                    for (column, value) in changes {
                        row.insert(column, value);
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn query(&self, sql: &str, _args: &[(String, Value)]) -> Result<Vec<Record>, DbError> {
        let idents = quoted(sql);
        let (column, table) = match idents.as_slice() {
            [column, table, _id] if sql.starts_with("SELECT") => (column, table),
            _ => return Err(DbError::Query(format!("unsupported query: {}", sql))),
        };
        let store = self.store.lock().unwrap();
        let t = store.tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(t
            .rows
            .values()
            .next_back()
            .map(|row| {
                let value = row.get(column).cloned().unwrap_or(Value::Null);
                vec![Record::new().set(column.clone(), value)]
            })
            .unwrap_or_default())
    }

    async fn execute(&self, sql: &str, args: &[(String, Value)]) -> Result<u64, DbError> {
        self.executed.lock().unwrap().push(sql.to_string());
        if let Some(message) = self.fail_next_execute.lock().unwrap().take() {
            return Err(DbError::Query(message));
        }
        let idents = quoted(sql);
        let mut store = self.store.lock().unwrap();
        let mut state = self.state.lock().unwrap();
        let op = if sql.starts_with("INSERT") {
            let table = &idents[0];
            let t = store.tables.get_mut(table).ok_or_else(|| missing_table(table))?;
            t.next_id += 1;
            let row: Record = idents[1..]
                .iter()
                .cloned()
                .zip(args.iter().map(|(_, v)| v.clone()))
                .collect();
            state.last_insert_id = t.next_id;
            Pending::Insert {
                table: table.clone(),
                id: t.next_id,
                row,
            }
        } else if sql.starts_with("UPDATE") {
            let table = &idents[0];
            let t = store.tables.get(table).ok_or_else(|| missing_table(table))?;
            let id = match args.last() {
                Some((_, Value::U64(id))) => *id,
                other => return Err(DbError::Query(format!("bad id parameter {:?}", other))),
            };
            let column_count = idents.len() - 2;
            let changes: Record = idents[1..=column_count]
                .iter()
                .cloned()
                .zip(args.iter().map(|(_, v)| v.clone()))
                .collect();
            if !t.rows.contains_key(&id) {
                return Ok(0);
            }
            Pending::Update {
                table: table.clone(),
                id,
                changes,
            }
        } else {
            return Err(DbError::Query(format!("unsupported statement: {}", sql)));
        };
        if state.in_tx {
            state.pending.push(op);
        } else {
            Self::apply(&mut store, op);
        }
        Ok(1)
    }

    async fn last_insert_id(&self) -> Result<u64, DbError> {
        Ok(self.state.lock().unwrap().last_insert_id)
    }

    async fn begin(&self) -> Result<(), DbError> {
        self.state.lock().unwrap().in_tx = true;
        Ok(())
    }

    async fn commit(&self) -> Result<(), DbError> {
        let mut store = self.store.lock().unwrap();
        let mut state = self.state.lock().unwrap();
        state.in_tx = false;
        for op in state.pending.drain(..) {
            Self::apply(&mut store, op);
        }
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        state.in_tx = false;
        state.pending.clear();
        Ok(())
    }
}
