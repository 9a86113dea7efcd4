//! Order storage: the delivery board.

use rusqlite::Row;
use tracing::debug;
use uuid::Uuid;

use crate::model::{Order, OrderKind, OrderStatus};

use super::{
    Result, Storage, StorageError, Table, insert_error, parse_id, parse_label, parse_timestamp,
};

const COLUMNS: &str = "id, user_id, kind, item, location, destination, delivery_fee, status, \
                       accepted_by, created_at";

/// Narrows [`Storage::list_orders`]. Every set field must hold.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Hide orders in this status (the board hides `Completed`).
    pub exclude_status: Option<OrderStatus>,
    pub kind: Option<OrderKind>,
    /// Orders this member posted or accepted.
    pub participant: Option<String>,
}

impl Storage {
    /// Inserts a new order.
    pub fn insert_order(&self, order: &Order) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO orders ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                rusqlite::params![
                    order.id.to_string(),
                    &order.user,
                    order.kind.as_str(),
                    &order.item,
                    &order.location,
                    order.destination.as_deref(),
                    order.delivery_fee,
                    order.status.as_str(),
                    order.accepted_by.as_deref(),
                    order.created_at.to_string(),
                ],
            )
            .map_err(|e| insert_error("order", order.id, e))?;
        debug!(id = %order.id, location = %order.location, "inserted order");
        Ok(())
    }

    /// Overwrites an existing order, matched by id, provided its stored status
    /// is still `expected`.
    ///
    /// Two members accepting the same order race on the status check: the
    /// second write finds the order no longer `Open` and fails with
    /// [`StorageError::Conflict`].
    pub fn update_order(&self, order: &Order, expected: OrderStatus) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE orders
             SET user_id = ?1, kind = ?2, item = ?3, location = ?4, destination = ?5,
                 delivery_fee = ?6, status = ?7, accepted_by = ?8, created_at = ?9
             WHERE id = ?10 AND status = ?11",
            rusqlite::params![
                &order.user,
                order.kind.as_str(),
                &order.item,
                &order.location,
                order.destination.as_deref(),
                order.delivery_fee,
                order.status.as_str(),
                order.accepted_by.as_deref(),
                order.created_at.to_string(),
                order.id.to_string(),
                expected.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(self.stale_write(Table::Orders, order.id));
        }
        debug!(id = %order.id, status = %order.status, "updated order");
        Ok(())
    }

    /// Loads a single order.
    pub fn load_order(&self, id: Uuid) -> Result<Order> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?1"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return read_order(row);
        }
        Err(StorageError::NotFound {
            kind: "order",
            id: id.to_string(),
        })
    }

    /// Lists orders matching `filter`, newest first.
    pub fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM orders
             WHERE (?1 IS NULL OR status = ?1)
               AND (?2 IS NULL OR status != ?2)
               AND (?3 IS NULL OR kind = ?3)
               AND (?4 IS NULL OR user_id = ?4 OR accepted_by = ?4)"
        ))?;
        let mut rows = stmt.query(rusqlite::params![
            filter.status.map(OrderStatus::as_str),
            filter.exclude_status.map(OrderStatus::as_str),
            filter.kind.map(OrderKind::as_str),
            filter.participant.as_deref(),
        ])?;
        let mut orders = Vec::new();
        while let Some(row) = rows.next()? {
            orders.push(read_order(row)?);
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

fn read_order(row: &Row<'_>) -> Result<Order> {
    let id: String = row.get(0)?;
    let kind: String = row.get(2)?;
    let status: String = row.get(7)?;
    let created_at: String = row.get(9)?;

    Ok(Order {
        id: parse_id(&id)?,
        user: row.get(1)?,
        kind: parse_label(&kind)?,
        item: row.get(3)?,
        location: row.get(4)?,
        destination: row.get(5)?,
        delivery_fee: row.get(6)?,
        status: parse_label(&status)?,
        accepted_by: row.get(8)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use tempfile::TempDir;

    use crate::storage::tests::{sample_order, test_storage};

    #[test]
    fn insert_and_load_order() {
        let (_dir, storage) = test_storage();
        let mut order = sample_order("asha@campus.edu", "Dominos");
        order.destination = None;

        storage.insert_order(&order).unwrap();
        let loaded = storage.load_order(order.id).unwrap();

        assert_eq!(loaded, order);
    }

    #[test]
    fn insert_duplicate_order_fails() {
        let (_dir, storage) = test_storage();
        let order = sample_order("asha@campus.edu", "Dominos");

        storage.insert_order(&order).unwrap();
        let err = storage.insert_order(&order).unwrap_err();

        assert!(matches!(err, StorageError::AlreadyExists { kind: "order", .. }));
    }

    #[test]
    fn update_order_lifecycle() {
        let (_dir, storage) = test_storage();
        let mut order = sample_order("asha@campus.edu", "Campus Store");
        storage.insert_order(&order).unwrap();

        order.accept("ravi@campus.edu").unwrap();
        storage.update_order(&order, OrderStatus::Open).unwrap();
        let loaded = storage.load_order(order.id).unwrap();
        assert_eq!(loaded.status, OrderStatus::InProgress);
        assert_eq!(loaded.accepted_by.as_deref(), Some("ravi@campus.edu"));

        order.complete("asha@campus.edu").unwrap();
        storage.update_order(&order, OrderStatus::InProgress).unwrap();
        let loaded = storage.load_order(order.id).unwrap();
        assert_eq!(loaded.status, OrderStatus::Completed);
    }

    #[test]
    fn update_nonexistent_order_fails() {
        let (_dir, storage) = test_storage();
        let order = sample_order("asha@campus.edu", "Dominos");
        let err = storage.update_order(&order, OrderStatus::Open).unwrap_err();

        assert!(matches!(err, StorageError::NotFound { kind: "order", .. }));
    }

    #[test]
    fn second_concurrent_accept_conflicts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quad.sqlite");
        let first = Storage::open(&path).unwrap();
        let second = Storage::open(&path).unwrap();

        let order = sample_order("asha@campus.edu", "City Mall");
        first.insert_order(&order).unwrap();

        let mut ravi_view = first.load_order(order.id).unwrap();
        let mut meera_view = second.load_order(order.id).unwrap();
        ravi_view.accept("ravi@campus.edu").unwrap();
        meera_view.accept("meera@campus.edu").unwrap();

        first.update_order(&ravi_view, OrderStatus::Open).unwrap();
        let err = second
            .update_order(&meera_view, OrderStatus::Open)
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Conflict { kind: "order", id } if id == order.id
        ));

        let stored = second.load_order(order.id).unwrap();
        assert_eq!(stored.status, OrderStatus::InProgress);
        assert_eq!(stored.accepted_by.as_deref(), Some("ravi@campus.edu"));
    }

    #[test]
    fn stale_complete_conflicts() {
        let (_dir, storage) = test_storage();
        let mut order = sample_order("asha@campus.edu", "Dominos");
        storage.insert_order(&order).unwrap();

        // Still Open in the store, so an InProgress expectation is stale.
        order.accept("ravi@campus.edu").unwrap();
        order.complete("asha@campus.edu").unwrap();
        let err = storage
            .update_order(&order, OrderStatus::InProgress)
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict { .. }));
        assert_eq!(
            storage.load_order(order.id).unwrap().status,
            OrderStatus::Open
        );
    }

    #[test]
    fn board_hides_completed() {
        let (_dir, storage) = test_storage();

        let open = sample_order("asha@campus.edu", "City Mall");
        let mut done = sample_order("asha@campus.edu", "Dominos");
        done.status = OrderStatus::Completed;
        storage.insert_order(&open).unwrap();
        storage.insert_order(&done).unwrap();

        let filter = OrderFilter {
            exclude_status: Some(OrderStatus::Completed),
            ..OrderFilter::default()
        };
        let orders = storage.list_orders(&filter).unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, open.id);
    }

    #[test]
    fn filter_by_kind() {
        let (_dir, storage) = test_storage();

        let request = sample_order("asha@campus.edu", "City Mall");
        let mut run = sample_order("ravi@campus.edu", "Burger King");
        run.kind = OrderKind::Trip;
        storage.insert_order(&request).unwrap();
        storage.insert_order(&run).unwrap();

        let filter = OrderFilter {
            kind: Some(OrderKind::Trip),
            ..OrderFilter::default()
        };
        let orders = storage.list_orders(&filter).unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, run.id);
    }

    #[test]
    fn participant_covers_poster_and_carrier() {
        let (_dir, storage) = test_storage();

        let mine = sample_order("asha@campus.edu", "City Mall");
        let mut carried = sample_order("ravi@campus.edu", "Dominos");
        carried.accept("asha@campus.edu").unwrap();
        carried.complete("ravi@campus.edu").unwrap();
        let unrelated = sample_order("meera@campus.edu", "Medical Store");
        storage.insert_order(&mine).unwrap();
        storage.insert_order(&carried).unwrap();
        storage.insert_order(&unrelated).unwrap();

        let filter = OrderFilter {
            participant: Some("asha@campus.edu".into()),
            ..OrderFilter::default()
        };
        assert_eq!(storage.list_orders(&filter).unwrap().len(), 2);

        let filter = OrderFilter {
            participant: Some("asha@campus.edu".into()),
            status: Some(OrderStatus::Completed),
            ..OrderFilter::default()
        };
        let orders = storage.list_orders(&filter).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, carried.id);
    }

    #[test]
    fn list_orders_newest_first() {
        let (_dir, storage) = test_storage();

        let mut first = sample_order("asha@campus.edu", "City Mall");
        first.created_at = Timestamp::new(1_000_000_000, 0).unwrap();
        let mut second = sample_order("asha@campus.edu", "Dominos");
        second.created_at = Timestamp::new(2_000_000_000, 0).unwrap();

        storage.insert_order(&first).unwrap();
        storage.insert_order(&second).unwrap();

        let orders = storage.list_orders(&OrderFilter::default()).unwrap();
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[1].id, first.id);
    }
}
