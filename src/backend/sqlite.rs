use crate::backend::{DatabaseBackend, ItemBackend, OrderBackend};
use crate::error::StoreError;
use crate::tracing_shim::debug;
use crate::{EntityId, Item, Location, Order};
use rusqlite::{params, Connection, OptionalExtension as _, Transaction};
use std::sync::{Mutex, MutexGuard};
use tonic::async_trait;

/// A SQLite backend.
///
/// Items and orders are kept in separate tables of the same database, so one `Sqlite` value can
/// back both handlers (wrap it in an `Arc`). A single connection is shared by all callers and
/// serializes every operation.
#[derive(Debug)]
pub struct Sqlite {
    location: Location,
    connection: Mutex<Connection>,
}

impl DatabaseBackend for Sqlite {
    type Error = rusqlite::Error;

    fn at_location(location: Location) -> Result<Self, Self::Error> {
        let connection = match location.path() {
            Some(path) => Connection::open(path),
            None => Connection::open_in_memory(),
        }?;
        initialize(&connection)?;
        debug!(%location, "opened sqlite database");
        Ok(Self {
            location,
            connection: Mutex::new(connection),
        })
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

/// Create the tables if they do not exist yet.
fn initialize(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT
        );
        CREATE TABLE IF NOT EXISTS order_items (
            order_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            item_id INTEGER NOT NULL,
            description TEXT NOT NULL,
            PRIMARY KEY (order_id, position)
        );",
    )
}

impl Sqlite {
    fn connect(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::Internal("sqlite connection poisoned".to_owned()))
    }
}

/// Map a row of `(id, description)` to an item.
fn item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        description: row.get(1)?,
    })
}

#[async_trait]
impl ItemBackend for Sqlite {
    async fn create(&self, item: Item) -> Result<Item, StoreError> {
        let db = self.connect()?;
        let item = db.query_row(
            "INSERT INTO items (description) VALUES (?1) RETURNING id, description",
            [&item.description],
            item_from_row,
        )?;
        Ok(item)
    }

    async fn get(&self, id: EntityId) -> Result<Item, StoreError> {
        let db = self.connect()?;
        db.query_row(
            "SELECT id, description FROM items WHERE id = ?1",
            [id],
            item_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found::<Item>(id))
    }

    async fn update(&self, id: EntityId, item: Item) -> Result<Item, StoreError> {
        let db = self.connect()?;
        db.query_row(
            "UPDATE items SET description = ?2 WHERE id = ?1 RETURNING id, description",
            params![id, item.description],
            item_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found::<Item>(id))
    }

    async fn delete(&self, id: EntityId) -> Result<Item, StoreError> {
        let db = self.connect()?;
        db.query_row(
            "DELETE FROM items WHERE id = ?1 RETURNING id, description",
            [id],
            item_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found::<Item>(id))
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let db = self.connect()?;
        let mut statement = db.prepare("SELECT id, description FROM items")?;
        let items = statement
            .query_map([], item_from_row)?
            .collect::<Result<_, _>>()?;
        Ok(items)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let db = self.connect()?;
        let count = db.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Whether an order with the given id exists.
fn order_exists(tx: &Transaction<'_>, id: EntityId) -> rusqlite::Result<bool> {
    tx.query_row("SELECT 1 FROM orders WHERE id = ?1", [id], |_| Ok(()))
        .optional()
        .map(|row| row.is_some())
}

/// The items of an order, in the sequence they were stored.
fn order_items(db: &Connection, id: EntityId) -> rusqlite::Result<Vec<Item>> {
    let mut statement = db.prepare_cached(
        "SELECT item_id, description FROM order_items WHERE order_id = ?1 ORDER BY position",
    )?;
    let items = statement.query_map([id], item_from_row)?.collect();
    items
}

/// Store the items of an order, replacing whatever was stored before.
fn write_order_items(tx: &Transaction<'_>, id: EntityId, items: &[Item]) -> rusqlite::Result<()> {
    let _rows = tx.execute("DELETE FROM order_items WHERE order_id = ?1", [id])?;
    let mut statement = tx.prepare_cached(
        "INSERT INTO order_items (order_id, position, item_id, description)
        VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, item) in (0_i64..).zip(items) {
        let _rows = statement.execute(params![id, position, item.id, item.description])?;
    }
    Ok(())
}

#[async_trait]
impl OrderBackend for Sqlite {
    async fn create(&self, order: Order) -> Result<Order, StoreError> {
        let mut db = self.connect()?;
        let tx = db.transaction()?;
        let id = tx.query_row("INSERT INTO orders DEFAULT VALUES RETURNING id", [], |row| {
            row.get(0)
        })?;
        write_order_items(&tx, id, &order.items)?;
        tx.commit()?;
        Ok(Order { id, ..order })
    }

    async fn get(&self, id: EntityId) -> Result<Order, StoreError> {
        let mut db = self.connect()?;
        let tx = db.transaction()?;
        if !order_exists(&tx, id)? {
            return Err(StoreError::not_found::<Order>(id));
        }
        let items = order_items(&tx, id)?;
        tx.commit()?;
        Ok(Order { id, items })
    }

    async fn update(&self, id: EntityId, order: Order) -> Result<Order, StoreError> {
        let mut db = self.connect()?;
        let tx = db.transaction()?;
        if !order_exists(&tx, id)? {
            return Err(StoreError::not_found::<Order>(id));
        }
        write_order_items(&tx, id, &order.items)?;
        tx.commit()?;
        Ok(Order { id, ..order })
    }

    async fn delete(&self, id: EntityId) -> Result<Order, StoreError> {
        let mut db = self.connect()?;
        let tx = db.transaction()?;
        if !order_exists(&tx, id)? {
            return Err(StoreError::not_found::<Order>(id));
        }
        let items = order_items(&tx, id)?;
        let _rows = tx.execute("DELETE FROM order_items WHERE order_id = ?1", [id])?;
        let _rows = tx.execute("DELETE FROM orders WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(Order { id, items })
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let mut db = self.connect()?;
        let tx = db.transaction()?;
        let ids = {
            let mut statement = tx.prepare("SELECT id FROM orders")?;
            let ids = statement
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<EntityId>, _>>()?;
            ids
        };
        let orders = ids
            .into_iter()
            .map(|id| {
                Ok(Order {
                    id,
                    items: order_items(&tx, id)?,
                })
            })
            .collect::<rusqlite::Result<_>>()?;
        tx.commit()?;
        Ok(orders)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let db = self.connect()?;
        let count = db.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
        Ok(count)
    }
}
