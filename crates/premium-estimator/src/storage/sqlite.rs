use super::record::{OwnerId, PredictionRecord, RecordId, UserAccount};
use super::repository::{IdentityStore, PredictionRepository, RepositoryError, StorageBackend};
use crate::estimation::{PredictionInput, PredictionKind};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{named_params, Connection, ErrorCode, OpenFlags, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS predictions (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        input_json TEXT NOT NULL,
        premium INTEGER NOT NULL,
        kind TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_predictions_owner_created
        ON predictions (owner_id, created_at DESC);

    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE COLLATE NOCASE,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        first_name TEXT,
        last_name TEXT,
        phone TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    );
"#;

/// SQLite-backed store. Each call opens its own connection; `ping` prepares the schema.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_connection(&self) -> Result<Connection, RepositoryError> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| unavailable(&err))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|err| unavailable(&err))?;
        Ok(conn)
    }

    fn with_connection<F, T>(&self, callback: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&Connection) -> Result<T, RepositoryError>,
    {
        let conn = self.get_connection()?;
        callback(&conn)
    }

    fn initialize(&self) -> Result<Connection, RepositoryError> {
        info!(db_path = %self.path.display(), "opening prediction database");
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|err| unavailable(&err))?;
            }
        }

        let conn = Connection::open(&self.path).map_err(|err| unavailable(&err))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|err| unavailable(&err))?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|err| unavailable(&err))?;
        debug!(db_path = %self.path.display(), "database schema ready");
        Ok(conn)
    }
}

impl PredictionRepository for SqliteStore {
    fn insert(&self, record: PredictionRecord) -> Result<RecordId, RepositoryError> {
        let input_json = serde_json::to_string(&record.input)
            .map_err(|err| RepositoryError::Corrupt(err.to_string()))?;

        self.with_connection(|conn| {
            conn.execute(
                r#"
                    INSERT INTO predictions (id, owner_id, input_json, premium, kind, created_at)
                    VALUES (:id, :owner_id, :input_json, :premium, :kind, :created_at)
                "#,
                named_params! {
                    ":id": &record.id.0,
                    ":owner_id": &record.owner_id.0,
                    ":input_json": &input_json,
                    ":premium": record.premium,
                    ":kind": record.kind.label(),
                    ":created_at": format_timestamp(&record.created_at),
                },
            )
            .map_err(map_write_error)?;
            Ok(record.id.clone())
        })
    }

    fn list_by_owner(
        &self,
        owner: &OwnerId,
        limit: Option<usize>,
    ) -> Result<Vec<PredictionRecord>, RepositoryError> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit
            .map(|value| i64::try_from(value).unwrap_or(i64::MAX))
            .unwrap_or(-1);

        self.with_connection(|conn| {
            let mut statement = conn
                .prepare(
                    r#"
                        SELECT id, owner_id, input_json, premium, kind, created_at
                        FROM predictions
                        WHERE owner_id = :owner_id
                        ORDER BY created_at DESC, rowid DESC
                        LIMIT :limit
                    "#,
                )
                .map_err(|err| unavailable(&err))?;

            let rows = statement
                .query_map(
                    named_params! { ":owner_id": &owner.0, ":limit": limit },
                    PredictionRow::try_from_row,
                )
                .map_err(|err| unavailable(&err))?;

            let records = rows
                .map(|row| row.map_err(|err| unavailable(&err))?.into_record())
                .collect::<Result<Vec<_>, _>>();
            records
        })
    }
}

impl IdentityStore for SqliteStore {
    fn insert_user(&self, account: UserAccount) -> Result<UserAccount, RepositoryError> {
        self.with_connection(|conn| {
            conn.execute(
                r#"
                    INSERT INTO users (
                        id, username, email, password_hash, first_name, last_name, phone,
                        is_active, created_at
                    ) VALUES (
                        :id, :username, :email, :password_hash, :first_name, :last_name, :phone,
                        :is_active, :created_at
                    )
                "#,
                named_params! {
                    ":id": &account.id.0,
                    ":username": &account.username,
                    ":email": &account.email,
                    ":password_hash": &account.password_hash,
                    ":first_name": &account.first_name,
                    ":last_name": &account.last_name,
                    ":phone": &account.phone,
                    ":is_active": account.is_active,
                    ":created_at": format_timestamp(&account.created_at),
                },
            )
            .map_err(map_write_error)?;
            Ok(account)
        })
    }

    fn find_user(&self, id: &OwnerId) -> Result<Option<UserAccount>, RepositoryError> {
        self.with_connection(|conn| {
            conn.query_row(
                &format!("{USER_COLUMNS} WHERE id = :id"),
                named_params! { ":id": &id.0 },
                UserRow::try_from_row,
            )
            .optional()
            .map_err(|err| unavailable(&err))?
            .map(UserRow::into_account)
            .transpose()
        })
    }

    fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        self.with_connection(|conn| {
            conn.query_row(
                &format!("{USER_COLUMNS} WHERE username = :username COLLATE NOCASE"),
                named_params! { ":username": username },
                UserRow::try_from_row,
            )
            .optional()
            .map_err(|err| unavailable(&err))?
            .map(UserRow::into_account)
            .transpose()
        })
    }
}

impl StorageBackend for SqliteStore {
    fn label(&self) -> &'static str {
        "sqlite"
    }

    fn ping(&self) -> Result<(), RepositoryError> {
        self.initialize()?
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|err| unavailable(&err))
    }
}

const USER_COLUMNS: &str = r#"
    SELECT id, username, email, password_hash, first_name, last_name, phone, is_active, created_at
    FROM users
"#;

struct PredictionRow {
    id: String,
    owner_id: String,
    input_json: String,
    premium: i64,
    kind: String,
    created_at: String,
}

impl PredictionRow {
    fn try_from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            input_json: row.get("input_json")?,
            premium: row.get("premium")?,
            kind: row.get("kind")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_record(self) -> Result<PredictionRecord, RepositoryError> {
        let input: PredictionInput = serde_json::from_str(&self.input_json)
            .map_err(|err| RepositoryError::Corrupt(format!("record {}: {err}", self.id)))?;
        let kind = PredictionKind::from_label(&self.kind).ok_or_else(|| {
            RepositoryError::Corrupt(format!("record {}: unknown kind '{}'", self.id, self.kind))
        })?;

        Ok(PredictionRecord {
            created_at: parse_timestamp(&self.id, &self.created_at)?,
            id: RecordId(self.id),
            owner_id: OwnerId(self.owner_id),
            input,
            premium: self.premium,
            kind,
        })
    }
}

struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    is_active: bool,
    created_at: String,
}

impl UserRow {
    fn try_from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            email: row.get("email")?,
            password_hash: row.get("password_hash")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            phone: row.get("phone")?,
            is_active: row.get("is_active")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_account(self) -> Result<UserAccount, RepositoryError> {
        Ok(UserAccount {
            created_at: parse_timestamp(&self.id, &self.created_at)?,
            id: OwnerId(self.id),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            is_active: self.is_active,
        })
    }
}

/// Fixed-width RFC 3339 so lexical order in SQL matches chronological order.
fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(id: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| RepositoryError::Corrupt(format!("row {id}: bad timestamp '{raw}': {err}")))
}

fn map_write_error(err: rusqlite::Error) -> RepositoryError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepositoryError::Conflict
        }
        _ => unavailable(&err),
    }
}

fn unavailable(err: &dyn std::error::Error) -> RepositoryError {
    RepositoryError::Unavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::{InsurancePlan, SmokingStatus};
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn open_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SqliteStore::new(dir.path().join("nested").join("premiums.db"));
        store.ping().expect("database opens");
        (dir, store)
    }

    fn record(owner: &str, premium: i64, minutes: i64) -> PredictionRecord {
        let mut input = PredictionInput::new(45, 2, 15);
        input.insurance_plan = InsurancePlan::Gold;
        input.smoking_status = SmokingStatus::Occasional;
        let created_at = Utc
            .with_ymd_and_hms(2026, 3, 14, 8, 30, 0)
            .single()
            .expect("valid timestamp")
            + ChronoDuration::minutes(minutes);
        PredictionRecord::new(
            OwnerId(owner.to_string()),
            input,
            premium,
            PredictionKind::Formula,
            created_at,
        )
    }

    fn account(id: &str, username: &str) -> UserAccount {
        UserAccount {
            id: OwnerId(id.to_string()),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "pbkdf2-sha256$1$c2FsdA$aGFzaA".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            phone: None,
            is_active: true,
            created_at: Utc
                .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[test]
    fn round_trips_records_newest_first() {
        let (_dir, store) = open_store();
        let older = record("owner-1", 14_000, 0);
        let newer = record("owner-1", 15_500, 90);
        store.insert(older.clone()).expect("insert older");
        store.insert(newer.clone()).expect("insert newer");
        store.insert(record("owner-2", 9_000, 30)).expect("insert other");

        let history = store
            .list_by_owner(&OwnerId("owner-1".to_string()), None)
            .expect("list");
        assert_eq!(history, vec![newer.clone(), older]);

        let capped = store
            .list_by_owner(&OwnerId("owner-1".to_string()), Some(1))
            .expect("list");
        assert_eq!(capped, vec![newer]);
    }

    #[test]
    fn duplicate_usernames_conflict() {
        let (_dir, store) = open_store();
        store
            .insert_user(account("u-1", "dana"))
            .expect("first insert");

        assert!(matches!(
            store.insert_user(account("u-2", "DANA")),
            Err(RepositoryError::Conflict)
        ));

        let found = store
            .find_by_username("Dana")
            .expect("lookup")
            .expect("account present");
        assert_eq!(found, account("u-1", "dana"));
        assert_eq!(
            store
                .find_user(&OwnerId("u-1".to_string()))
                .expect("lookup by id"),
            Some(account("u-1", "dana"))
        );
        assert!(store
            .find_user(&OwnerId("missing".to_string()))
            .expect("lookup")
            .is_none());
    }

    #[test]
    fn missing_database_is_unavailable_until_pinged() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SqliteStore::new(dir.path().join("nested").join("premiums.db"));

        assert!(matches!(
            store.list_by_owner(&OwnerId("owner-1".to_string()), None),
            Err(RepositoryError::Unavailable(_))
        ));

        store.ping().expect("creates database");
        assert!(store
            .list_by_owner(&OwnerId("owner-1".to_string()), None)
            .expect("list after ping")
            .is_empty());
    }

    #[test]
    fn separate_handles_share_the_database_file() {
        let (dir, store) = open_store();
        store.insert(record("owner-1", 14_000, 0)).expect("insert");

        let other = SqliteStore::new(dir.path().join("nested").join("premiums.db"));
        let history = other
            .list_by_owner(&OwnerId("owner-1".to_string()), None)
            .expect("list through second handle");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].premium, 14_000);
    }
}
