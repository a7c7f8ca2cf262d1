//! SQLite-backed ShareIt store.
//!
//! Uses `rusqlite` with the `bundled` feature so no system SQLite
//! library is required.  All async trait methods are thin wrappers
//! around synchronous rusqlite calls executed under a `Mutex`.
//! Timestamps are stored as TEXT through rusqlite's chrono support, which
//! writes one fixed format, so range comparisons in SQL are lexical and
//! still chronological.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

use super::repository::{ShareItStore, StoreFuture};
use crate::errors::{ShareItError, ShareItResult};
use crate::model::booking::{
    ensure_can_decide, BookingRecord, BookingScope, BookingState, BookingStatus, NewBooking,
};
use crate::model::comment::{CommentRecord, NewComment};
use crate::model::item::{ItemPatch, ItemRecord, NewItem};
use crate::model::request::{ItemRequestRecord, NewItemRequest};
use crate::model::user::{NewUser, UserPatch, UserRecord};
use crate::model::{booking_not_found, item_not_found, request_not_found, user_not_found};

/// Current schema version. Bumped when migrations are added.
const SCHEMA_VERSION: i64 = 1;

const USER_COLUMNS: &str = "id, name, email";
const ITEM_COLUMNS: &str = "id, name, description, available, owner_id, request_id";
const BOOKING_COLUMNS: &str = "b.id, b.start_at, b.end_at, b.item_id, b.booker_id, b.status";
const REQUEST_COLUMNS: &str = "id, description, requestor_id, created";

/// Store backed by a single SQLite database file.
pub struct SqliteStore {
    /// The database connection, guarded by a mutex for Send + Sync.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialize the schema.
    ///
    /// Passing `":memory:"` creates an in-memory database (useful for tests).
    pub fn new(path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.apply_pragmas()?;
        store.init_db()?;
        Ok(store)
    }

    fn conn(&self) -> ShareItResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ShareItError::Internal(anyhow::anyhow!("store mutex poisoned")))
    }

    /// Apply SQLite pragmas. Foreign keys drive the delete cascades.
    fn apply_pragmas(&self) -> anyhow::Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )?;
        Ok(())
    }

    /// Create the required tables and indexes if they do not already exist.
    /// Idempotent, so it runs on every startup.
    fn init_db(&self) -> anyhow::Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_version (
                version    INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
                id     INTEGER PRIMARY KEY AUTOINCREMENT,
                name   TEXT NOT NULL,
                email  TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS item_requests (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                description   TEXT NOT NULL,
                requestor_id  INTEGER NOT NULL,
                created       TEXT NOT NULL,

                FOREIGN KEY (requestor_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_requests_requestor
                ON item_requests(requestor_id, created);

            CREATE TABLE IF NOT EXISTS items (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                name         TEXT NOT NULL,
                description  TEXT NOT NULL,
                available    INTEGER NOT NULL,
                owner_id     INTEGER NOT NULL,
                request_id   INTEGER,

                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (request_id) REFERENCES item_requests(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_owner
                ON items(owner_id);
            CREATE INDEX IF NOT EXISTS idx_items_request
                ON items(request_id);

            CREATE TABLE IF NOT EXISTS bookings (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                start_at   TEXT NOT NULL,
                end_at     TEXT NOT NULL,
                item_id    INTEGER NOT NULL,
                booker_id  INTEGER NOT NULL,
                status     TEXT NOT NULL DEFAULT 'WAITING',

                CHECK (start_at < end_at),
                FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE,
                FOREIGN KEY (booker_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_bookings_booker
                ON bookings(booker_id, start_at);
            CREATE INDEX IF NOT EXISTS idx_bookings_item
                ON bookings(item_id, start_at);

            CREATE TABLE IF NOT EXISTS comments (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                text        TEXT NOT NULL,
                item_id     INTEGER NOT NULL,
                author_id   INTEGER NOT NULL,
                created_at  TEXT NOT NULL,

                FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE,
                FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_comments_item
                ON comments(item_id);
            ",
        )?;

        let existing: Option<i64> = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .optional()?
            .flatten();

        if existing.map_or(true, |version| version < SCHEMA_VERSION) {
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                params![SCHEMA_VERSION, crate::model::now()],
            )?;
        }

        Ok(())
    }
}

// ── Row mapping ────────────────────────────────────────────────────

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
    })
}

fn map_item_row(row: &Row<'_>) -> rusqlite::Result<ItemRecord> {
    Ok(ItemRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        available: row.get(3)?,
        owner_id: row.get(4)?,
        request_id: row.get(5)?,
    })
}

fn map_booking_row(row: &Row<'_>) -> rusqlite::Result<BookingRecord> {
    let status: String = row.get(5)?;
    let status = status
        .parse::<BookingStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, e.into()))?;
    Ok(BookingRecord {
        id: row.get(0)?,
        start: row.get(1)?,
        end: row.get(2)?,
        item_id: row.get(3)?,
        booker_id: row.get(4)?,
        status,
    })
}

fn map_request_row(row: &Row<'_>) -> rusqlite::Result<ItemRequestRecord> {
    Ok(ItemRequestRecord {
        id: row.get(0)?,
        description: row.get(1)?,
        requestor_id: row.get(2)?,
        created: row.get(3)?,
    })
}

fn map_comment_row(row: &Row<'_>) -> rusqlite::Result<CommentRecord> {
    Ok(CommentRecord {
        id: row.get(0)?,
        text: row.get(1)?,
        item_id: row.get(2)?,
        author_id: row.get(3)?,
        author_name: row.get(4)?,
        created_at: row.get(5)?,
    })
}

// ── Shared lookups (usable inside a transaction) ───────────────────

fn query_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<UserRecord>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        map_user_row,
    )
    .optional()
}

fn query_item(conn: &Connection, id: i64) -> rusqlite::Result<Option<ItemRecord>> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
        params![id],
        map_item_row,
    )
    .optional()
}

fn query_booking(conn: &Connection, id: i64) -> rusqlite::Result<Option<BookingRecord>> {
    conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = ?1"),
        params![id],
        map_booking_row,
    )
    .optional()
}

fn query_request(conn: &Connection, id: i64) -> rusqlite::Result<Option<ItemRequestRecord>> {
    conn.query_row(
        &format!("SELECT {REQUEST_COLUMNS} FROM item_requests WHERE id = ?1"),
        params![id],
        map_request_row,
    )
    .optional()
}

/// Whether `email` belongs to a user other than `except`.
fn email_taken(conn: &Connection, email: &str, except: Option<i64>) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1 AND id != ?2",
        params![email, except.unwrap_or(0)],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn completed_booking_exists(
    conn: &Connection,
    booker_id: i64,
    item_id: i64,
    now: NaiveDateTime,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
             SELECT 1 FROM bookings
             WHERE booker_id = ?1 AND item_id = ?2 AND end_at < ?3
         )",
        params![booker_id, item_id, now],
        |row| row.get(0),
    )
}

fn collect_items(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> rusqlite::Result<Vec<ItemRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_item_row)?;
    rows.collect()
}

fn collect_requests(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> rusqlite::Result<Vec<ItemRequestRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_request_row)?;
    rows.collect()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn email_conflict(email: &str) -> ShareItError {
    ShareItError::AlreadyExists(format!("User with email {email} already exists"))
}

/// WHERE fragment and its extra parameter for a booking state filter.
/// The scope id is always `?1`; the extra parameter, if any, is `?2`.
fn state_filter(
    state: BookingState,
    now: NaiveDateTime,
) -> (&'static str, Option<Box<dyn ToSql>>) {
    match state {
        BookingState::All => ("", None),
        BookingState::Current => (
            " AND b.start_at <= ?2 AND b.end_at >= ?2",
            Some(Box::new(now)),
        ),
        BookingState::Past => (" AND b.end_at < ?2", Some(Box::new(now))),
        BookingState::Future => (" AND b.start_at > ?2", Some(Box::new(now))),
        BookingState::Waiting => (
            " AND b.status = ?2",
            Some(Box::new(BookingStatus::Waiting.as_str())),
        ),
        BookingState::Rejected => (
            " AND b.status = ?2",
            Some(Box::new(BookingStatus::Rejected.as_str())),
        ),
    }
}

// ── ShareItStore implementation ────────────────────────────────────

impl ShareItStore for SqliteStore {
    // ── Users ───────────────────────────────────────────────────────

    fn create_user(&self, user: NewUser) -> StoreFuture<'_, UserRecord> {
        Box::pin(async move {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            if email_taken(&tx, &user.email, None)? {
                return Err(email_conflict(&user.email));
            }
            match tx.execute(
                "INSERT INTO users (name, email) VALUES (?1, ?2)",
                params![user.name, user.email],
            ) {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => return Err(email_conflict(&user.email)),
                Err(e) => return Err(e.into()),
            }
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(UserRecord {
                id,
                name: user.name,
                email: user.email,
            })
        })
    }

    fn update_user(&self, id: i64, patch: UserPatch) -> StoreFuture<'_, UserRecord> {
        Box::pin(async move {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            let mut user = query_user(&tx, id)?.ok_or_else(|| user_not_found(id))?;
            if let Some(email) = &patch.email {
                if email_taken(&tx, email, Some(id))? {
                    return Err(email_conflict(email));
                }
            }
            patch.apply(&mut user);
            tx.execute(
                "UPDATE users SET name = ?1, email = ?2 WHERE id = ?3",
                params![user.name, user.email, user.id],
            )?;
            tx.commit()?;
            Ok(user)
        })
    }

    fn get_user(&self, id: i64) -> StoreFuture<'_, Option<UserRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            Ok(query_user(&conn, id)?)
        })
    }

    fn delete_user(&self, id: i64) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let conn = self.conn()?;
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
    }

    // ── Items ───────────────────────────────────────────────────────

    fn create_item(&self, item: NewItem) -> StoreFuture<'_, ItemRecord> {
        Box::pin(async move {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            if query_user(&tx, item.owner_id)?.is_none() {
                return Err(user_not_found(item.owner_id));
            }
            if let Some(request_id) = item.request_id {
                if query_request(&tx, request_id)?.is_none() {
                    return Err(request_not_found(request_id));
                }
            }
            tx.execute(
                "INSERT INTO items (name, description, available, owner_id, request_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item.name,
                    item.description,
                    item.available,
                    item.owner_id,
                    item.request_id,
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(ItemRecord {
                id,
                name: item.name,
                description: item.description,
                available: item.available,
                owner_id: item.owner_id,
                request_id: item.request_id,
            })
        })
    }

    fn update_item(
        &self,
        user_id: i64,
        item_id: i64,
        patch: ItemPatch,
    ) -> StoreFuture<'_, ItemRecord> {
        Box::pin(async move {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            if query_user(&tx, user_id)?.is_none() {
                return Err(user_not_found(user_id));
            }
            let mut item = query_item(&tx, item_id)?.ok_or_else(|| item_not_found(item_id))?;
            if item.owner_id != user_id {
                return Err(ShareItError::Wrong(format!(
                    "User with id {user_id} is not the owner of item {item_id}"
                )));
            }
            patch.apply(&mut item);
            tx.execute(
                "UPDATE items SET name = ?1, description = ?2, available = ?3 WHERE id = ?4",
                params![item.name, item.description, item.available, item.id],
            )?;
            tx.commit()?;
            Ok(item)
        })
    }

    fn get_item(&self, id: i64) -> StoreFuture<'_, Option<ItemRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            Ok(query_item(&conn, id)?)
        })
    }

    fn list_items_by_owner(&self, owner_id: i64) -> StoreFuture<'_, Vec<ItemRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            Ok(collect_items(
                &conn,
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = ?1 ORDER BY id"),
                &[&owner_id],
            )?)
        })
    }

    fn list_available_items(&self) -> StoreFuture<'_, Vec<ItemRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            Ok(collect_items(
                &conn,
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE available = 1 ORDER BY id"),
                &[],
            )?)
        })
    }

    fn list_items_for_request(&self, request_id: i64) -> StoreFuture<'_, Vec<ItemRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            Ok(collect_items(
                &conn,
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE request_id = ?1 ORDER BY id"),
                &[&request_id],
            )?)
        })
    }

    // ── Bookings ────────────────────────────────────────────────────

    fn create_booking(&self, booking: NewBooking) -> StoreFuture<'_, BookingRecord> {
        Box::pin(async move {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            if query_user(&tx, booking.booker_id)?.is_none() {
                return Err(user_not_found(booking.booker_id));
            }
            let item = query_item(&tx, booking.item_id)?
                .ok_or_else(|| item_not_found(booking.item_id))?;
            if !item.available {
                return Err(ShareItError::NotAvailable(format!(
                    "Item {} is not available for booking",
                    item.id
                )));
            }
            tx.execute(
                "INSERT INTO bookings (start_at, end_at, item_id, booker_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    booking.start,
                    booking.end,
                    booking.item_id,
                    booking.booker_id,
                    BookingStatus::Waiting.as_str(),
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(BookingRecord {
                id,
                start: booking.start,
                end: booking.end,
                item_id: booking.item_id,
                booker_id: booking.booker_id,
                status: BookingStatus::Waiting,
            })
        })
    }

    fn decide_booking(
        &self,
        user_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> StoreFuture<'_, BookingRecord> {
        Box::pin(async move {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            let mut booking =
                query_booking(&tx, booking_id)?.ok_or_else(|| booking_not_found(booking_id))?;
            let item = query_item(&tx, booking.item_id)?
                .ok_or_else(|| item_not_found(booking.item_id))?;
            ensure_can_decide(&booking, item.owner_id, user_id)?;
            booking.status = BookingStatus::decided(approved);
            tx.execute(
                "UPDATE bookings SET status = ?1 WHERE id = ?2",
                params![booking.status.as_str(), booking.id],
            )?;
            tx.commit()?;
            Ok(booking)
        })
    }

    fn get_booking(&self, id: i64) -> StoreFuture<'_, Option<BookingRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            Ok(query_booking(&conn, id)?)
        })
    }

    fn list_bookings(
        &self,
        scope: BookingScope,
        state: BookingState,
        now: NaiveDateTime,
    ) -> StoreFuture<'_, Vec<BookingRecord>> {
        Box::pin(async move {
            let (base, scope_id) = match scope {
                BookingScope::Booker(id) => (
                    format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.booker_id = ?1"),
                    id,
                ),
                BookingScope::Owner(id) => (
                    format!(
                        "SELECT {BOOKING_COLUMNS} FROM bookings b
                         JOIN items i ON i.id = b.item_id
                         WHERE i.owner_id = ?1"
                    ),
                    id,
                ),
            };
            let (filter, extra) = state_filter(state, now);
            let sql = format!("{base}{filter} ORDER BY b.start_at DESC, b.id DESC");

            let mut values: Vec<&dyn ToSql> = vec![&scope_id];
            if let Some(extra) = &extra {
                values.push(extra.as_ref());
            }

            let conn = self.conn()?;
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(values.as_slice(), map_booking_row)?;
            let bookings = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(bookings)
        })
    }

    fn last_booking(
        &self,
        item_id: i64,
        now: NaiveDateTime,
    ) -> StoreFuture<'_, Option<BookingRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            let booking = conn
                .query_row(
                    &format!(
                        "SELECT {BOOKING_COLUMNS} FROM bookings b
                         WHERE b.item_id = ?1 AND b.end_at < ?2
                         ORDER BY b.end_at DESC LIMIT 1"
                    ),
                    params![item_id, now],
                    map_booking_row,
                )
                .optional()?;
            Ok(booking)
        })
    }

    fn next_booking(
        &self,
        item_id: i64,
        now: NaiveDateTime,
    ) -> StoreFuture<'_, Option<BookingRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            let booking = conn
                .query_row(
                    &format!(
                        "SELECT {BOOKING_COLUMNS} FROM bookings b
                         WHERE b.item_id = ?1 AND b.start_at > ?2
                         ORDER BY b.start_at ASC LIMIT 1"
                    ),
                    params![item_id, now],
                    map_booking_row,
                )
                .optional()?;
            Ok(booking)
        })
    }

    fn has_completed_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: NaiveDateTime,
    ) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let conn = self.conn()?;
            Ok(completed_booking_exists(&conn, booker_id, item_id, now)?)
        })
    }

    // ── Item requests ───────────────────────────────────────────────

    fn create_request(&self, request: NewItemRequest) -> StoreFuture<'_, ItemRequestRecord> {
        Box::pin(async move {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            if query_user(&tx, request.requestor_id)?.is_none() {
                return Err(user_not_found(request.requestor_id));
            }
            tx.execute(
                "INSERT INTO item_requests (description, requestor_id, created)
                 VALUES (?1, ?2, ?3)",
                params![request.description, request.requestor_id, request.created],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(ItemRequestRecord {
                id,
                description: request.description,
                requestor_id: request.requestor_id,
                created: request.created,
            })
        })
    }

    fn get_request(&self, id: i64) -> StoreFuture<'_, Option<ItemRequestRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            Ok(query_request(&conn, id)?)
        })
    }

    fn list_requests_by_requestor(
        &self,
        requestor_id: i64,
    ) -> StoreFuture<'_, Vec<ItemRequestRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            Ok(collect_requests(
                &conn,
                &format!(
                    "SELECT {REQUEST_COLUMNS} FROM item_requests
                     WHERE requestor_id = ?1 ORDER BY created DESC, id DESC"
                ),
                &[&requestor_id],
            )?)
        })
    }

    fn list_requests_by_others(&self, user_id: i64) -> StoreFuture<'_, Vec<ItemRequestRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            Ok(collect_requests(
                &conn,
                &format!(
                    "SELECT {REQUEST_COLUMNS} FROM item_requests
                     WHERE requestor_id != ?1 ORDER BY created DESC, id DESC"
                ),
                &[&user_id],
            )?)
        })
    }

    // ── Comments ────────────────────────────────────────────────────

    fn create_comment(
        &self,
        comment: NewComment,
        now: NaiveDateTime,
    ) -> StoreFuture<'_, CommentRecord> {
        Box::pin(async move {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            let author =
                query_user(&tx, comment.author_id)?.ok_or_else(|| user_not_found(comment.author_id))?;
            if query_item(&tx, comment.item_id)?.is_none() {
                return Err(item_not_found(comment.item_id));
            }
            if !completed_booking_exists(&tx, comment.author_id, comment.item_id, now)? {
                return Err(ShareItError::Wrong(format!(
                    "User with id {} has not rented item {}",
                    comment.author_id, comment.item_id
                )));
            }
            tx.execute(
                "INSERT INTO comments (text, item_id, author_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![comment.text, comment.item_id, comment.author_id, now],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(CommentRecord {
                id,
                text: comment.text,
                item_id: comment.item_id,
                author_id: comment.author_id,
                author_name: author.name,
                created_at: now,
            })
        })
    }

    fn list_comments(&self, item_id: i64) -> StoreFuture<'_, Vec<CommentRecord>> {
        Box::pin(async move {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(
                "SELECT c.id, c.text, c.item_id, c.author_id, u.name, c.created_at
                 FROM comments c JOIN users u ON u.id = c.author_id
                 WHERE c.item_id = ?1
                 ORDER BY c.created_at, c.id",
            )?;
            let rows = stmt.query_map(params![item_id], map_comment_row)?;
            let comments = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(comments)
        })
    }
}
