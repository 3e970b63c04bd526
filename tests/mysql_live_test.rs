//! Runs against a real server. Point `HORNODB_TEST_CONFIG` at a config file
//! whose database the test may create a `hornodb_temps` table in, then run
//! `cargo test -- --ignored`.

#![cfg(feature = "mysql")]

use hornodb::{AppConfig, DataAccessFacade, ErrorKind, Record, Value};
use mysql_async::prelude::Queryable;
use std::collections::HashSet;
use tokio::sync::{mpsc, oneshot};

const TABLE: &str = "hornodb_temps";

fn load_config() -> AppConfig {
    let path = std::env::var("HORNODB_TEST_CONFIG").expect("HORNODB_TEST_CONFIG must be set");
    let mut config = AppConfig::load(path).expect("test config");
    config.schema = None;
    config
}

async fn reset_table(config: &AppConfig) {
    let m = &config.mysql;
    let opts = mysql_async::OptsBuilder::default()
        .ip_or_hostname(m.host.clone())
        .tcp_port(m.port)
        .user(Some(m.user.clone()))
        .pass(Some(m.password.clone()))
        .db_name(Some(m.database.clone()));
    let mut conn = mysql_async::Conn::new(opts).await.unwrap();
    conn.query_drop(format!("DROP TABLE IF EXISTS {}", TABLE)).await.unwrap();
    conn.query_drop(format!(
        "CREATE TABLE {} (id BIGINT AUTO_INCREMENT PRIMARY KEY, value DOUBLE NULL, sensor VARCHAR(32) NULL)",
        TABLE
    ))
    .await
    .unwrap();
    conn.disconnect().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_round_trip_against_mysql() {
    let config = load_config();
    reset_table(&config).await;
    let facade = DataAccessFacade::from_config(&config).unwrap();

    let (tx, rx) = oneshot::channel();
    facade.get_last_value(TABLE, "value", move |r| {
        let _ = tx.send(r);
    });
    assert_eq!(rx.await.unwrap().unwrap(), Value::Null);

    let (tx, rx) = oneshot::channel();
    facade.save_record(TABLE, Record::new().set("value", 72.5).set("sensor", "oven1"), move |r| {
        let _ = tx.send(r);
    });
    let id = rx.await.unwrap().unwrap();
    assert!(id > 0);

    let (tx, rx) = oneshot::channel();
    facade.get_last_value(TABLE, "value", move |r| {
        let _ = tx.send(r);
    });
    assert_eq!(rx.await.unwrap().unwrap(), Value::F64(72.5));

    let (tx, rx) = oneshot::channel();
    facade.update_record(TABLE, id + 1000, Record::new().set("value", 1.0), move |r| {
        let _ = tx.send(r);
    });
    assert_eq!(rx.await.unwrap().unwrap(), 0);

    let sensor: Option<String> = facade.access().last_value_as(TABLE, "sensor").await.unwrap();
    assert_eq!(sensor.as_deref(), Some("oven1"));

    let (tx, rx) = oneshot::channel();
    facade.save_record(TABLE, Record::new().set("no_such_column", 1), move |r| {
        let _ = tx.send(r);
    });
    assert_eq!(rx.await.unwrap().unwrap_err().kind(), ErrorKind::Query);

    let (tx, mut rx) = mpsc::unbounded_channel();
    for i in 0..20 {
        let tx = tx.clone();
        facade.save_record(TABLE, Record::new().set("value", i as f64), move |r| {
            let _ = tx.send(r);
        });
    }
    drop(tx);
    let mut ids = HashSet::new();
    while let Some(r) = rx.recv().await {
        assert!(ids.insert(r.unwrap()));
    }
    assert_eq!(ids.len(), 20);

    facade.shutdown().await.unwrap();
}
