// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use quotedesk_app::{
    Client, DEFAULT_NUMBER_PREFIX, FeedEvent, LineItem, Quote, QuoteFeed, QuoteFormInput,
    QuoteId, QuoteStatus, QuoteStore, StatusError, Subscription, compute_totals, format_date,
    format_quote_number,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

pub const APP_NAME: &str = "quotedesk";

const NUMBER_COUNTER: &str = "quote_number";
const MAX_PREFIX_LEN: usize = 8;

const QUOTE_COLUMNS: &str = "
  id, number, client_name, client_company, client_email, items,
  valid_until, status, created_at, updated_at
";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "quotes",
        &[
            "id",
            "sequence",
            "number",
            "client_name",
            "client_company",
            "client_email",
            "items",
            "valid_until",
            "subtotal",
            "tax",
            "total",
            "status",
            "created_at",
            "updated_at",
        ],
    ),
    ("counters", &["name", "value"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_quotes_sequence",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_quotes_sequence ON quotes (sequence);",
    },
    RequiredIndex {
        name: "idx_quotes_created_at",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_quotes_created_at ON quotes (created_at);",
    },
    RequiredIndex {
        name: "idx_quotes_status",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_quotes_status ON quotes (status);",
    },
];

/// Line item as persisted inside the `items` JSON column. `total` is written
/// for readers of the raw document and ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredItem {
    description: String,
    quantity: f64,
    price: f64,
    #[serde(default)]
    total: f64,
}

impl From<&LineItem> for StoredItem {
    fn from(item: &LineItem) -> Self {
        Self {
            description: item.description.clone(),
            quantity: item.quantity,
            price: item.price,
            total: item.total(),
        }
    }
}

impl From<StoredItem> for LineItem {
    fn from(item: StoredItem) -> Self {
        Self {
            description: item.description,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

pub struct Store {
    conn: Connection,
    feed: QuoteFeed,
    number_prefix: String,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self::with_connection(conn))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            feed: QuoteFeed::new(),
            number_prefix: DEFAULT_NUMBER_PREFIX.to_owned(),
        }
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    pub fn set_number_prefix(&mut self, prefix: &str) -> Result<()> {
        validate_number_prefix(prefix)?;
        self.number_prefix = prefix.to_owned();
        Ok(())
    }

    pub fn number_prefix(&self) -> &str {
        &self.number_prefix
    }

    pub fn create_quote(&self, input: &QuoteFormInput) -> Result<QuoteId> {
        input.validate()?;
        let items_json = encode_items(&input.items)?;
        let totals = input.totals();
        let now = now_timestamp()?;

        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin quote insert")?;
        let sequence: i64 = tx
            .query_row(
                "
                INSERT INTO counters (name, value) VALUES (?, 1)
                ON CONFLICT(name) DO UPDATE SET value = value + 1
                RETURNING value
                ",
                params![NUMBER_COUNTER],
                |row| row.get(0),
            )
            .context("allocate quote number")?;
        let number = format_quote_number(&self.number_prefix, sequence);

        tx.execute(
            "
            INSERT INTO quotes (
              sequence, number, client_name, client_company, client_email,
              items, valid_until, subtotal, tax, total, status,
              created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                sequence,
                number,
                input.client.name,
                input.client.company,
                input.client.email,
                items_json,
                format_date(input.valid_until),
                totals.subtotal,
                totals.tax,
                totals.total,
                QuoteStatus::Pending.as_str(),
                now,
                now,
            ],
        )
        .context("insert quote")?;
        let id = QuoteId::new(tx.last_insert_rowid());
        tx.commit().context("commit quote insert")?;

        tracing::debug!(quote_id = id.get(), %number, "created quote");
        self.publish_snapshot();
        Ok(id)
    }

    pub fn replace_quote(&self, id: QuoteId, input: &QuoteFormInput) -> Result<()> {
        input.validate()?;
        let items_json = encode_items(&input.items)?;
        let totals = input.totals();
        let now = now_timestamp()?;

        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE quotes
                SET
                  client_name = ?,
                  client_company = ?,
                  client_email = ?,
                  items = ?,
                  valid_until = ?,
                  subtotal = ?,
                  tax = ?,
                  total = ?,
                  updated_at = ?
                WHERE id = ?
                ",
                params![
                    input.client.name,
                    input.client.company,
                    input.client.email,
                    items_json,
                    format_date(input.valid_until),
                    totals.subtotal,
                    totals.tax,
                    totals.total,
                    now,
                    id.get(),
                ],
            )
            .context("update quote")?;
        if rows_affected == 0 {
            bail!("quote {id} not found -- it may have been deleted; refresh and retry");
        }

        tracing::debug!(quote_id = id.get(), "replaced quote");
        self.publish_snapshot();
        Ok(())
    }

    pub fn update_status(&self, id: QuoteId, status: QuoteStatus) -> Result<()> {
        let now = now_timestamp()?;
        let rows_affected = self
            .conn
            .execute(
                "UPDATE quotes SET status = ?, updated_at = ? WHERE id = ?",
                params![status.as_str(), now, id.get()],
            )
            .context("update quote status")?;
        if rows_affected == 0 {
            bail!("quote {id} not found -- it may have been deleted; refresh and retry");
        }

        tracing::debug!(quote_id = id.get(), status = status.as_str(), "updated quote status");
        self.publish_snapshot();
        Ok(())
    }

    pub fn delete_quote(&self, id: QuoteId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM quotes WHERE id = ?", params![id.get()])
            .context("delete quote")?;
        if rows_affected == 0 {
            bail!("quote {id} not found -- it may already be deleted");
        }

        tracing::debug!(quote_id = id.get(), "deleted quote");
        self.publish_snapshot();
        Ok(())
    }

    pub fn get_quote(&self, id: QuoteId) -> Result<Quote> {
        self.conn
            .query_row(
                &format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?"),
                params![id.get()],
                quote_from_row,
            )
            .optional()
            .context("query quote")?
            .ok_or_else(|| anyhow!("quote {id} not found"))
    }

    pub fn list_quotes(&self) -> Result<Vec<Quote>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {QUOTE_COLUMNS} FROM quotes ORDER BY created_at DESC, id DESC"
            ))
            .context("prepare quotes query")?;
        let rows = stmt.query_map([], quote_from_row).context("query quotes")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect quotes")
    }

    pub fn subscribe(&self) -> Subscription {
        self.feed.subscribe_with(self.current_feed_event())
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn publish_snapshot(&self) {
        let event = self.current_feed_event();
        let delivered = self.feed.publish(event);
        tracing::trace!(subscribers = delivered, "published quote snapshot");
    }

    fn current_feed_event(&self) -> FeedEvent {
        match self.list_quotes() {
            Ok(quotes) => FeedEvent::Snapshot(quotes),
            Err(error) => {
                tracing::warn!(error = %format!("{error:#}"), "quote feed failed");
                FeedEvent::Failed(format!("{error:#}"))
            }
        }
    }
}

impl QuoteStore for Store {
    fn create_quote(&self, input: &QuoteFormInput) -> Result<QuoteId> {
        Store::create_quote(self, input)
    }

    fn replace_quote(&self, id: QuoteId, input: &QuoteFormInput) -> Result<()> {
        Store::replace_quote(self, id, input)
    }

    fn update_status(&self, id: QuoteId, status: QuoteStatus) -> Result<()> {
        Store::update_status(self, id, status)
    }

    fn delete_quote(&self, id: QuoteId) -> Result<()> {
        Store::delete_quote(self, id)
    }

    fn list_quotes(&self) -> Result<Vec<Quote>> {
        Store::list_quotes(self)
    }

    fn subscribe(&self) -> Subscription {
        Store::subscribe(self)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("QUOTEDESK_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set QUOTEDESK_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("quotedesk.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

pub fn validate_number_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN {
        bail!("quote number prefix must be 1-{MAX_PREFIX_LEN} characters, got {prefix:?}");
    }
    if !prefix.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        bail!("quote number prefix {prefix:?} must be ASCII letters and digits only");
    }
    Ok(())
}

fn quote_from_row(row: &Row<'_>) -> rusqlite::Result<Quote> {
    let items_raw: String = row.get(5)?;
    let valid_until_raw: String = row.get(6)?;
    let status_raw: String = row.get(7)?;
    let created_at_raw: String = row.get(8)?;
    let updated_at_raw: String = row.get(9)?;

    let items = decode_items(&items_raw).map_err(to_sql_error)?;
    let status = QuoteStatus::parse(&status_raw)
        .ok_or_else(|| to_sql_error(StatusError::InvalidState(status_raw.clone()).into()))?;

    Ok(Quote {
        id: QuoteId::new(row.get(0)?),
        number: row.get(1)?,
        client: Client {
            name: row.get(2)?,
            company: row.get(3)?,
            email: row.get(4)?,
        },
        totals: compute_totals(&items),
        items,
        valid_until: parse_date(&valid_until_raw).map_err(to_sql_error)?,
        status,
        created_at: parse_datetime(&created_at_raw).map_err(to_sql_error)?,
        updated_at: parse_datetime(&updated_at_raw).map_err(to_sql_error)?,
    })
}

fn encode_items(items: &[LineItem]) -> Result<String> {
    let stored = items.iter().map(StoredItem::from).collect::<Vec<_>>();
    serde_json::to_string(&stored).context("encode line items")
}

fn decode_items(raw: &str) -> Result<Vec<LineItem>> {
    let stored: Vec<StoredItem> =
        serde_json::from_str(raw).with_context(|| format!("decode line items {raw:?}"))?;
    Ok(stored.into_iter().map(LineItem::from).collect())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point [storage].db_path at a quotedesk database"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; the database was not created by quotedesk",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!("database is missing required indexes: {}", missing.join(", "));
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

// Fixed-width fraction keeps created_at ordering correct as plain text.
fn now_timestamp() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
        ))
        .context("format current timestamp")
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(value);
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    bail!("unsupported datetime format {raw:?}")
}

fn parse_date(raw: &str) -> Result<Date> {
    Date::parse(raw, &format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("unsupported date format {raw:?}"))
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}
