//! SQLite-backed favourites store.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use thiserror::Error;

use crate::{DeviceLocation, FavouritePlace, PlaceId};

use super::{FavouritesStore, FavouritesStoreError, FavouritesSubscription, SnapshotFeed};

/// Version recorded in `favourites_schema_version` by this build.
pub const SCHEMA_VERSION: i64 = 1;

/// Conventional file name of the favourites database inside a data directory.
pub const DATABASE_FILE: &str = "pois_database.sqlite";

const SELECT_ALL: &str = "SELECT id, name, vicinity, latitude, longitude, photo_url
    FROM favourite_places ORDER BY rowid";

/// Error raised when opening or initialising the favourites database.
#[derive(Debug, Error)]
pub enum SqliteFavouritesStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A schema step failed.
    #[error("failed to execute schema step '{step}': {source}")]
    Schema {
        /// Description of the failing step.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database was created by an incompatible build.
    #[error("unsupported favourites schema version {found}; supported version is {supported}")]
    UnsupportedSchemaVersion {
        /// Version present in the database.
        found: i64,
        /// Version this build understands.
        supported: i64,
    },
}

/// Favourites store persisted in a single SQLite table.
///
/// All statements run on Tokio's blocking pool against one connection. The
/// snapshot for observers is read and published while the connection lock
/// is still held, so subscribers see commits in the order they happened.
pub struct SqliteFavouritesStore {
    connection: Arc<Mutex<Connection>>,
    feed: SnapshotFeed,
    path: Option<PathBuf>,
}

impl fmt::Debug for SqliteFavouritesStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteFavouritesStore")
            .field("path", &self.path)
            .field("subscribers", &self.feed.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl SqliteFavouritesStore {
    /// Open (or create) the favourites database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteFavouritesStoreError> {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteFavouritesStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_connection(connection, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, SqliteFavouritesStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| {
            SqliteFavouritesStoreError::OpenDatabase {
                path: PathBuf::from(":memory:"),
                source,
            }
        })?;
        Self::from_connection(connection, None)
    }

    /// Location of the database file, or `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn from_connection(
        mut connection: Connection,
        path: Option<PathBuf>,
    ) -> Result<Self, SqliteFavouritesStoreError> {
        initialise_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            feed: SnapshotFeed::default(),
            path,
        })
    }

    async fn with_connection<T, F>(
        &self,
        operation: &'static str,
        work: F,
    ) -> Result<T, FavouritesStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &SnapshotFeed) -> rusqlite::Result<T> + Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        let feed = self.feed.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let guard = connection.lock().unwrap_or_else(PoisonError::into_inner);
            work(&*guard, &feed)
        })
        .await
        .map_err(|_| FavouritesStoreError::WorkerStopped { operation })?;
        outcome.map_err(|source| FavouritesStoreError::Storage {
            operation,
            message: source.to_string(),
        })
    }
}

#[async_trait]
impl FavouritesStore for SqliteFavouritesStore {
    async fn insert(&self, place: &FavouritePlace) -> Result<(), FavouritesStoreError> {
        let place = place.clone();
        self.with_connection("insert", move |connection, feed| {
            let transaction = connection.unchecked_transaction()?;
            transaction.execute(
                "INSERT OR REPLACE INTO favourite_places
                    (id, name, vicinity, latitude, longitude, photo_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    place.id.as_str(),
                    place.name,
                    place.vicinity,
                    place.location.latitude,
                    place.location.longitude,
                    place.photo_url,
                ],
            )?;
            commit_and_publish(transaction, feed)
        })
        .await
    }

    async fn delete(&self, place: &FavouritePlace) -> Result<(), FavouritesStoreError> {
        let id = place.id.clone();
        self.with_connection("delete", move |connection, feed| {
            let transaction = connection.unchecked_transaction()?;
            transaction.execute(
                "DELETE FROM favourite_places WHERE id = ?1",
                params![id.as_str()],
            )?;
            commit_and_publish(transaction, feed)
        })
        .await
    }

    async fn get_by_id(&self, id: &PlaceId) -> Result<Option<FavouritePlace>, FavouritesStoreError> {
        let id = id.clone();
        self.with_connection("look up", move |connection, _| {
            connection
                .query_row(
                    "SELECT id, name, vicinity, latitude, longitude, photo_url
                     FROM favourite_places WHERE id = ?1",
                    params![id.as_str()],
                    row_to_place,
                )
                .optional()
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<FavouritePlace>, FavouritesStoreError> {
        self.with_connection("list", |connection, _| read_all(connection))
            .await
    }

    async fn observe_all(&self) -> Result<FavouritesSubscription, FavouritesStoreError> {
        self.with_connection("observe", |connection, feed| {
            read_all(connection).map(|current| feed.subscribe(current))
        })
        .await
    }
}

/// Read the table inside `transaction`, commit, then publish the snapshot.
///
/// A failed read rolls the write back, so an `Err` never hides a commit.
fn commit_and_publish(transaction: Transaction<'_>, feed: &SnapshotFeed) -> rusqlite::Result<()> {
    let snapshot = read_all(&transaction)?;
    transaction.commit()?;
    feed.publish(&snapshot);
    Ok(())
}

fn read_all(connection: &Connection) -> rusqlite::Result<Vec<FavouritePlace>> {
    let mut statement = connection.prepare_cached(SELECT_ALL)?;
    let rows = statement.query_map([], row_to_place)?;
    rows.collect()
}

fn row_to_place(row: &Row<'_>) -> rusqlite::Result<FavouritePlace> {
    let id: String = row.get(0)?;
    Ok(FavouritePlace {
        id: PlaceId::new(id),
        name: row.get(1)?,
        vicinity: row.get(2)?,
        location: DeviceLocation::new(row.get(3)?, row.get(4)?),
        photo_url: row.get(5)?,
    })
}

fn initialise_schema(connection: &mut Connection) -> Result<(), SqliteFavouritesStoreError> {
    let transaction =
        connection
            .transaction()
            .map_err(|source| SqliteFavouritesStoreError::Schema {
                step: "begin schema transaction",
                source,
            })?;

    run_schema_step(
        &transaction,
        "create favourite_places",
        "CREATE TABLE IF NOT EXISTS favourite_places (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            vicinity TEXT NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            photo_url TEXT
        )",
    )?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SqliteFavouritesStoreError::Schema {
            step: "commit schema transaction",
            source,
        })
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), SqliteFavouritesStoreError> {
    run_schema_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS favourites_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0)
        )",
    )?;

    let existing: Option<i64> = transaction
        .query_row(
            "SELECT version FROM favourites_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| SqliteFavouritesStoreError::Schema {
            step: "read schema version",
            source,
        })?;

    match existing {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(SqliteFavouritesStoreError::UnsupportedSchemaVersion {
            found,
            supported: SCHEMA_VERSION,
        }),
        None => transaction
            .execute(
                "INSERT INTO favourites_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| SqliteFavouritesStoreError::Schema {
                step: "record schema version",
                source,
            }),
    }
}

fn run_schema_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SqliteFavouritesStoreError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SqliteFavouritesStoreError::Schema { step, source })
}
