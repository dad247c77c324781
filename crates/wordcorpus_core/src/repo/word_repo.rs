//! Word repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `words` storage.
//! - Serve the uniqueness lookup used by the admission pipeline.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `WordEntry::check_invariants()` before SQL mutations.
//! - The partial unique index on active names is the authoritative
//!   uniqueness guarantee; its violations surface as `DuplicateName`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::word::{WordEntry, WordId, WordRecord};
use crate::pipeline::validation::{UniquenessCheck, UniquenessScope, ValidationErrors};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const WORD_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    characters,
    proper_noun,
    created_at,
    updated_at,
    deleted_at
FROM words";

const REQUIRED_WORD_COLUMNS: [&str; 7] = [
    "uuid",
    "name",
    "characters",
    "proper_noun",
    "created_at",
    "updated_at",
    "deleted_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for word persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationErrors),
    Db(DbError),
    NotFound(WordId),
    /// Storage unique index rejected the write.
    DuplicateName(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "word not found: {id}"),
            Self::DuplicateName(_) => write!(f, "name already exists in corpus"),
            Self::InvalidData(message) => write!(f, "invalid persisted word data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for RepoError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing words.
#[derive(Debug, Clone, Default)]
pub struct WordListQuery {
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for word CRUD operations.
///
/// Implementations also answer the pipeline's uniqueness lookup.
pub trait WordRepository: UniquenessCheck<Error = RepoError> {
    fn create_word(&self, entry: &WordEntry) -> RepoResult<WordId>;
    fn update_word(&self, entry: &WordEntry) -> RepoResult<()>;
    fn get_word(&self, id: WordId, include_deleted: bool) -> RepoResult<Option<WordEntry>>;
    fn find_by_name(&self, name: &str, include_deleted: bool) -> RepoResult<Vec<WordEntry>>;
    fn list_words(&self, query: &WordListQuery) -> RepoResult<Vec<WordEntry>>;
    fn soft_delete_word(&self, id: WordId) -> RepoResult<()>;
    fn restore_word(&self, id: WordId) -> RepoResult<()>;
}

/// SQLite-backed word repository.
pub struct SqliteWordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWordRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not match what this repository queries.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_word_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UniquenessCheck for SqliteWordRepository<'_> {
    type Error = RepoError;

    fn name_exists(
        &self,
        name: &str,
        scope: UniquenessScope,
        exclude: Option<WordId>,
    ) -> RepoResult<bool> {
        let include_deleted = matches!(scope, UniquenessScope::Global);
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM words
                WHERE name = ?1
                  AND (?2 = 1 OR deleted_at IS NULL)
                  AND (?3 IS NULL OR uuid <> ?3)
            );",
            params![
                name,
                bool_to_int(include_deleted),
                exclude.map(|id| id.to_string()),
            ],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl WordRepository for SqliteWordRepository<'_> {
    fn create_word(&self, entry: &WordEntry) -> RepoResult<WordId> {
        entry.check_invariants()?;

        self.conn
            .execute(
                "INSERT INTO words (
                    uuid,
                    name,
                    characters,
                    proper_noun,
                    deleted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    entry.id().to_string(),
                    entry.name(),
                    entry.characters(),
                    bool_to_int(entry.proper_noun()),
                    entry.deleted_at(),
                ],
            )
            .map_err(|err| map_write_error(err, entry.name()))?;

        Ok(entry.id())
    }

    fn update_word(&self, entry: &WordEntry) -> RepoResult<()> {
        entry.check_invariants()?;

        let changed = self
            .conn
            .execute(
                "UPDATE words
                 SET
                    name = ?1,
                    characters = ?2,
                    proper_noun = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?4;",
                params![
                    entry.name(),
                    entry.characters(),
                    bool_to_int(entry.proper_noun()),
                    entry.id().to_string(),
                ],
            )
            .map_err(|err| map_write_error(err, entry.name()))?;

        if changed == 0 {
            return Err(RepoError::NotFound(entry.id()));
        }

        Ok(())
    }

    fn get_word(&self, id: WordId, include_deleted: bool) -> RepoResult<Option<WordEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{WORD_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR deleted_at IS NULL);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_word_row(row)?));
        }

        Ok(None)
    }

    fn find_by_name(&self, name: &str, include_deleted: bool) -> RepoResult<Vec<WordEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{WORD_SELECT_SQL}
             WHERE name = ?1
               AND (?2 = 1 OR deleted_at IS NULL)
             ORDER BY deleted_at IS NOT NULL, created_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query(params![name, bool_to_int(include_deleted)])?;
        let mut words = Vec::new();
        while let Some(row) = rows.next()? {
            words.push(parse_word_row(row)?);
        }

        Ok(words)
    }

    fn list_words(&self, query: &WordListQuery) -> RepoResult<Vec<WordEntry>> {
        let mut sql = format!("{WORD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND deleted_at IS NULL");
        }

        sql.push_str(" ORDER BY name ASC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut words = Vec::new();

        while let Some(row) = rows.next()? {
            words.push(parse_word_row(row)?);
        }

        Ok(words)
    }

    fn soft_delete_word(&self, id: WordId) -> RepoResult<()> {
        // Only the marker changes; repeated deletes keep the first timestamp.
        let changed = self.conn.execute(
            "UPDATE words
             SET deleted_at = COALESCE(deleted_at, strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn restore_word(&self, id: WordId) -> RepoResult<()> {
        let entry = self.get_word(id, true)?.ok_or(RepoError::NotFound(id))?;
        if entry.is_active() {
            return Ok(());
        }

        self.conn
            .execute(
                "UPDATE words SET deleted_at = NULL WHERE uuid = ?1;",
                [id.to_string()],
            )
            .map_err(|err| map_write_error(err, entry.name()))?;

        Ok(())
    }
}

fn parse_word_row(row: &Row<'_>) -> RepoResult<WordEntry> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in words.uuid"))
    })?;

    let proper_noun = match row.get::<_, i64>("proper_noun")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid proper_noun value `{other}` in words.proper_noun"
            )));
        }
    };

    let record = WordRecord {
        uuid,
        name: row.get("name")?,
        characters: Some(row.get("characters")?),
        proper_noun: Some(proper_noun),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    };
    let entry = WordEntry::try_from(record)
        .map_err(|err| RepoError::InvalidData(format!("word {uuid_text}: {err}")))?;
    entry
        .check_invariants()
        .map_err(|errors| RepoError::InvalidData(format!("word {uuid_text}: {errors}")))?;
    Ok(entry)
}

fn map_write_error(err: rusqlite::Error, name: &str) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::DuplicateName(name.to_string())
    } else {
        err.into()
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn ensure_word_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "words")? {
        return Err(RepoError::MissingRequiredTable("words"));
    }

    for column in REQUIRED_WORD_COLUMNS {
        if !table_has_column(conn, "words", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "words",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
