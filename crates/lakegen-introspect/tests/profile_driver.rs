use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use lakegen_core::{
    Column, DataSource, Error, FixedClock, IndexedColumn, Result, RowStats, Uniqueness,
};
use lakegen_introspect::{
    profile_all, profile_datasource, Connector, ProfileOptions, SchemaIntrospector,
};

#[derive(Clone, Default)]
struct MockTable {
    columns: Vec<Column>,
    primary_keys: Vec<String>,
    indexed: Vec<IndexedColumn>,
    stats: RowStats,
}

#[derive(Clone, Default)]
struct MockSession {
    tables: BTreeMap<String, MockTable>,
    fail_on_table: Option<String>,
    direct: bool,
}

#[async_trait]
impl SchemaIntrospector for MockSession {
    fn engine(&self) -> &'static str {
        "mock"
    }

    async fn list_tables(&self, _schema: &str) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn get_columns(&self, _schema: &str, table: &str) -> Result<Vec<Column>> {
        if self.fail_on_table.as_deref() == Some(table) {
            return Err(Error::Db("connection reset by peer".to_string()));
        }
        Ok(self.table(table).columns)
    }

    async fn get_primary_keys(&self, _schema: &str, table: &str) -> Result<Vec<String>> {
        Ok(self.table(table).primary_keys)
    }

    async fn get_unique_keys(&self, _schema: &str, _table: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn get_indexed_columns(&self, _schema: &str, table: &str) -> Result<Vec<IndexedColumn>> {
        Ok(self.table(table).indexed)
    }

    async fn get_row_stats(&self, _schema: &str, table: &str) -> Result<RowStats> {
        Ok(self.table(table).stats)
    }

    async fn probe_direct_path_permission(&self) -> bool {
        self.direct
    }
}

impl MockSession {
    fn table(&self, name: &str) -> MockTable {
        self.tables.get(name).cloned().unwrap_or_default()
    }
}

struct MockConnector {
    session: MockSession,
    failures_before_success: u32,
    attempts: AtomicU32,
    unreachable: Vec<String>,
}

impl MockConnector {
    fn new(session: MockSession) -> Self {
        Self {
            session,
            failures_before_success: 0,
            attempts: AtomicU32::new(0),
            unreachable: Vec::new(),
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Session = MockSession;

    async fn connect(&self, datasource: &DataSource) -> Result<MockSession> {
        if self.unreachable.contains(&datasource.name) {
            return Err(Error::Connection(format!("{} unreachable", datasource.name)));
        }
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures_before_success {
            return Err(Error::Connection(format!("attempt {attempt} refused")));
        }
        Ok(self.session.clone())
    }
}

fn column(field: &str, data_type: &str, ordinal: i32) -> Column {
    Column {
        field: field.to_string(),
        data_type: data_type.to_string(),
        ordinal,
        comment: None,
    }
}

fn datasource(name: &str) -> DataSource {
    DataSource {
        name: name.to_string(),
        ip: "10.0.0.1".to_string(),
        port: 1521,
        tns: "ORCL".to_string(),
        schema: "SC".to_string(),
        login: "reader".to_string(),
        password: "pw".to_string(),
    }
}

fn clock() -> FixedClock {
    FixedClock(
        NaiveDate::from_ymd_opt(2026, 1, 14)
            .and_then(|d| d.and_hms_opt(10, 20, 5))
            .unwrap(),
    )
}

fn session() -> MockSession {
    let mut tables = BTreeMap::new();
    tables.insert(
        "T1".to_string(),
        MockTable {
            columns: vec![column("ID", "NUMBER", 1), column("LAST_UPD", "DATE", 2)],
            primary_keys: vec!["ID".to_string()],
            indexed: vec![IndexedColumn {
                field: "LAST_UPD".to_string(),
                uniqueness: Uniqueness::Nonunique,
            }],
            stats: RowStats {
                num_rows: Some(10),
                avg_row_len: Some(100),
            },
        },
    );
    tables.insert(
        "T2_AUDIT".to_string(),
        MockTable {
            columns: vec![column("MSG", "VARCHAR2", 1)],
            ..MockTable::default()
        },
    );
    MockSession {
        tables,
        fail_on_table: None,
        direct: true,
    }
}

#[tokio::test]
async fn profiles_tables_and_stamps_direct() {
    let connector = MockConnector::new(session());
    let options = ProfileOptions::default().with_excludes(["SC.T2_AUDIT"]);

    let doc = profile_datasource(&connector, datasource("DS1"), &options, &clock()).await;

    assert_eq!(doc.error(), None);
    assert!(doc.direct());
    assert_eq!(doc.tables().len(), 1);
    let t1 = &doc.tables()[0];
    assert_eq!(t1.split_by.as_deref(), Some("ID"));
    assert_eq!(t1.check_column.as_deref(), Some("LAST_UPD"));
    assert_eq!(t1.merge_key.as_deref(), Some("ID"));
    assert_eq!(t1.estimated_size, Some(1000));
    assert!(t1.direct);
    assert_eq!(doc.metadata().start_dt.as_deref(), Some("2026-01-14-10-20-05"));
}

#[tokio::test]
async fn retries_connection_before_succeeding() {
    let mut connector = MockConnector::new(session());
    connector.failures_before_success = 2;

    let doc =
        profile_datasource(&connector, datasource("DS1"), &ProfileOptions::default(), &clock())
            .await;

    assert_eq!(doc.error(), None);
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let mut connector = MockConnector::new(session());
    connector.failures_before_success = 5;

    let doc =
        profile_datasource(&connector, datasource("DS1"), &ProfileOptions::default(), &clock())
            .await;

    assert_eq!(connector.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(doc.error(), Some("connection error: attempt 3 refused"));
    assert!(doc.tables().is_empty());
    assert!(!doc.direct());
}

#[tokio::test]
async fn midway_failure_discards_partial_tables() {
    let mut broken = session();
    broken.fail_on_table = Some("T2_AUDIT".to_string());
    let connector = MockConnector::new(broken);

    let doc =
        profile_datasource(&connector, datasource("DS1"), &ProfileOptions::default(), &clock())
            .await;

    assert!(doc.tables().is_empty());
    assert_eq!(doc.error(), Some("database error: connection reset by peer"));
}

#[tokio::test]
async fn one_failed_source_does_not_stop_others() {
    let mut connector = MockConnector::new(session());
    connector.unreachable = vec!["DOWN".to_string()];

    let docs = profile_all(
        &connector,
        vec![datasource("DOWN"), datasource("DS1")],
        &ProfileOptions::default(),
        &clock(),
    )
    .await;

    assert_eq!(docs.len(), 2);
    assert!(docs[0].is_failed());
    assert!(docs[0].tables().is_empty());
    assert!(!docs[1].is_failed());
    assert_eq!(docs[1].tables().len(), 2);
}
