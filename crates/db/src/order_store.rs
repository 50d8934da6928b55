use crate::Error;
use chrono::{DateTime, Duration, Utc};
use kv::{Bucket, Json};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Minting,
    Completed,
    Failed,
    Expired,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Expired)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Minting => "minting",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Expired => "expired",
        };
        f.write_str(name)
    }
}

/// NFT details captured at order creation, minted later by the worker.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrderNft {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub royalty_basis_points: u16,
    /// Gateway URL of the pinned media, set once the file is uploaded.
    pub ipfs_url: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub nft: OrderNft,
    /// Wallet expected to pay for the order, also listed as the NFT creator.
    pub creator: String,
    pub amount_lamports: u64,
    pub status: OrderStatus,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
    pub qr_payload: Option<String>,
    pub payment_signature: Option<String>,
    pub mint_address: Option<String>,
    pub error: Option<String>,
}

impl Order {
    pub fn new(nft: OrderNft, creator: String, amount_lamports: u64, ttl: Duration) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::now_v7(),
            nft,
            creator,
            amount_lamports,
            status: OrderStatus::Pending,
            created_at,
            expires_at: created_at + ttl,
            qr_payload: None,
            payment_signature: None,
            mint_address: None,
            error: None,
        }
    }

    /// Unpaid and half-paid orders run out, the rest keep their status.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Paid) && now >= self.expires_at
    }
}

fn order_key(id: &Uuid) -> &[u8] {
    id.as_bytes()
}

fn apply_expiry(order: &mut Order, now: DateTime<Utc>) {
    if order.is_expired(now) {
        order.status = OrderStatus::Expired;
    }
}

#[derive(Serialize, Debug, Default, Clone, Copy)]
pub struct SweepStats {
    pub expired: usize,
    pub removed: usize,
}

#[derive(Clone)]
pub struct OrderStore {
    db: kv::Store,
}

impl OrderStore {
    pub fn new<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        tracing::info!("opening sled storage: {}", path.as_ref().display());
        let db = kv::Store::new(kv::Config::new(path)).map_err(Error::local("open"))?;
        Ok(Self { db })
    }

    fn bucket(&self) -> crate::Result<Bucket<'_, &[u8], Json<Order>>> {
        self.db
            .bucket(Some("orders"))
            .map_err(Error::local("open orders bucket"))
    }

    pub fn put(&self, order: &Order) -> crate::Result<()> {
        self.bucket()?
            .set(&order_key(&order.id), &Json(order.clone()))
            .map_err(Error::local("set order"))?;
        Ok(())
    }

    /// Read one order. An order past its deadline comes back `Expired`, and
    /// the expiry is written through so later reads agree.
    pub fn get(&self, id: &Uuid) -> crate::Result<Option<Order>> {
        let now = Utc::now();
        self.bucket()?
            .transaction::<_, kv::Error, _>(|tx| {
                let key = order_key(id);
                let Some(Json(mut order)) = tx.get(&key)? else {
                    return Ok(None);
                };
                if order.is_expired(now) {
                    apply_expiry(&mut order, now);
                    tx.set(&key, &Json(order.clone()))?;
                }
                Ok(Some(order))
            })
            .map_err(Error::local("get order"))
    }

    pub fn delete(&self, id: &Uuid) -> crate::Result<()> {
        self.bucket()?
            .remove(&order_key(id))
            .map_err(Error::local("remove order"))?;
        Ok(())
    }

    /// Check-and-set a status change. The whole read-check-mutate-write runs
    /// inside one sled transaction so two racing callers cannot both move the
    /// same order. Expiry is applied first; terminal orders never move again.
    pub fn transition(
        &self,
        id: &Uuid,
        from: OrderStatus,
        to: OrderStatus,
        mutate: impl Fn(&mut Order),
    ) -> crate::Result<Order> {
        enum Outcome {
            Done(Order),
            Conflict(OrderStatus),
            Missing,
        }

        let now = Utc::now();
        let outcome = self
            .bucket()?
            .transaction::<_, kv::Error, _>(|tx| {
                let key = order_key(id);
                let Some(Json(mut order)) = tx.get(&key)? else {
                    return Ok(Outcome::Missing);
                };
                if order.is_expired(now) {
                    apply_expiry(&mut order, now);
                    tx.set(&key, &Json(order.clone()))?;
                    return Ok(Outcome::Conflict(order.status));
                }
                if order.status != from || order.status.is_terminal() {
                    return Ok(Outcome::Conflict(order.status));
                }
                order.status = to;
                mutate(&mut order);
                tx.set(&key, &Json(order.clone()))?;
                Ok(Outcome::Done(order))
            })
            .map_err(Error::local("transition order"))?;

        match outcome {
            Outcome::Done(order) => Ok(order),
            Outcome::Conflict(actual) => Err(Error::StatusConflict {
                expected: from,
                actual,
            }),
            Outcome::Missing => Err(Error::not_found("order", id)),
        }
    }

    /// Orders that have run past their deadline without completing.
    pub fn list_expired(&self, now: DateTime<Utc>) -> crate::Result<Vec<Order>> {
        let bucket = self.bucket()?;
        let mut expired = Vec::new();
        for item in bucket.iter() {
            let item = item.map_err(Error::local("iterate orders"))?;
            let Json(order) = item
                .value::<Json<Order>>()
                .map_err(Error::local("decode order"))?;
            let overdue = now >= order.expires_at
                && matches!(
                    order.status,
                    OrderStatus::Pending | OrderStatus::Paid | OrderStatus::Expired
                );
            if overdue {
                expired.push(order);
            }
        }
        Ok(expired)
    }

    /// Periodic cleanup. Overdue unpaid orders and old expired records are
    /// deleted; overdue paid orders are only marked expired since money
    /// changed hands. Completed and failed orders are kept as an audit trail.
    pub fn sweep(&self, now: DateTime<Utc>) -> crate::Result<SweepStats> {
        enum Outcome {
            Removed,
            Expired,
            Kept,
        }

        let candidates = self.list_expired(now)?;
        let bucket = self.bucket()?;
        let mut stats = SweepStats::default();
        for order in &candidates {
            let outcome = bucket
                .transaction::<_, kv::Error, _>(|tx| {
                    let key = order_key(&order.id);
                    let Some(Json(mut current)) = tx.get(&key)? else {
                        return Ok(Outcome::Kept);
                    };
                    if now < current.expires_at {
                        return Ok(Outcome::Kept);
                    }
                    match current.status {
                        OrderStatus::Pending | OrderStatus::Expired => {
                            tx.remove(&key)?;
                            Ok(Outcome::Removed)
                        }
                        OrderStatus::Paid => {
                            current.status = OrderStatus::Expired;
                            tx.set(&key, &Json(current.clone()))?;
                            Ok(Outcome::Expired)
                        }
                        _ => Ok(Outcome::Kept),
                    }
                })
                .map_err(Error::local("sweep order"))?;
            match outcome {
                Outcome::Removed => stats.removed += 1,
                Outcome::Expired => stats.expired += 1,
                Outcome::Kept => {}
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nft() -> OrderNft {
        OrderNft {
            name: "Clip #1".to_owned(),
            symbol: "CLIP".to_owned(),
            description: "first clip".to_owned(),
            royalty_basis_points: 500,
            ipfs_url: None,
            content_type: None,
        }
    }

    fn order(ttl: Duration) -> Order {
        Order::new(nft(), "creator-wallet".to_owned(), 50_000_000, ttl)
    }

    fn store() -> (tempfile::TempDir, OrderStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::new(dir.path().join("orders")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_order_lifecycle() {
        let (_dir, store) = store();
        let order = order(Duration::minutes(10));
        let id = order.id;
        store.put(&order).unwrap();

        let paid = store
            .transition(&id, OrderStatus::Pending, OrderStatus::Paid, |o| {
                o.payment_signature = Some("sig".to_owned());
            })
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);

        store
            .transition(&id, OrderStatus::Paid, OrderStatus::Minting, |_| {})
            .unwrap();
        let done = store
            .transition(&id, OrderStatus::Minting, OrderStatus::Completed, |o| {
                o.mint_address = Some("mint".to_owned());
            })
            .unwrap();
        assert_eq!(done.status, OrderStatus::Completed);

        let read = store.get(&id).unwrap().unwrap();
        assert_eq!(read.status, OrderStatus::Completed);
        assert_eq!(read.payment_signature.as_deref(), Some("sig"));
        assert_eq!(read.mint_address.as_deref(), Some("mint"));
    }

    #[test]
    fn test_transition_requires_expected_status() {
        let (_dir, store) = store();
        let order = order(Duration::minutes(10));
        let id = order.id;
        store.put(&order).unwrap();

        let err = store
            .transition(&id, OrderStatus::Paid, OrderStatus::Minting, |_| {})
            .unwrap_err();
        assert!(matches!(
            err,
            Error::StatusConflict {
                expected: OrderStatus::Paid,
                actual: OrderStatus::Pending,
            }
        ));
        // nothing changed
        assert_eq!(
            store.get(&id).unwrap().unwrap().status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn test_terminal_orders_do_not_move() {
        let (_dir, store) = store();
        let mut order = order(Duration::minutes(10));
        order.status = OrderStatus::Completed;
        let id = order.id;
        store.put(&order).unwrap();

        let err = store
            .transition(&id, OrderStatus::Completed, OrderStatus::Failed, |_| {})
            .unwrap_err();
        assert!(matches!(err, Error::StatusConflict { .. }));
    }

    #[test]
    fn test_missing_order() {
        let (_dir, store) = store();
        assert!(store.get(&Uuid::now_v7()).unwrap().is_none());
        let err = store
            .transition(&Uuid::now_v7(), OrderStatus::Pending, OrderStatus::Paid, |_| {})
            .unwrap_err();
        assert!(matches!(err, Error::ResourceNotFound { .. }));
    }

    #[test]
    fn test_overdue_order_expires_on_read() {
        let (_dir, store) = store();
        let order = order(Duration::minutes(-1));
        let id = order.id;
        store.put(&order).unwrap();

        assert_eq!(
            store.get(&id).unwrap().unwrap().status,
            OrderStatus::Expired
        );
        // written through, not just reported
        assert_eq!(
            store.get(&id).unwrap().unwrap().status,
            OrderStatus::Expired
        );
    }

    #[test]
    fn test_overdue_order_refuses_payment() {
        let (_dir, store) = store();
        let order = order(Duration::minutes(-1));
        let id = order.id;
        store.put(&order).unwrap();

        let err = store
            .transition(&id, OrderStatus::Pending, OrderStatus::Paid, |_| {})
            .unwrap_err();
        assert!(matches!(
            err,
            Error::StatusConflict {
                actual: OrderStatus::Expired,
                ..
            }
        ));
    }

    #[test]
    fn test_sweep() {
        let (_dir, store) = store();
        let now = Utc::now();

        let overdue_pending = order(Duration::minutes(-1));
        let mut overdue_paid = order(Duration::minutes(-1));
        overdue_paid.status = OrderStatus::Paid;
        let fresh = order(Duration::minutes(10));
        let mut overdue_completed = order(Duration::minutes(-1));
        overdue_completed.status = OrderStatus::Completed;
        for o in [&overdue_pending, &overdue_paid, &fresh, &overdue_completed] {
            store.put(o).unwrap();
        }

        let stats = store.sweep(now).unwrap();
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.expired, 1);

        assert!(store.get(&overdue_pending.id).unwrap().is_none());
        assert_eq!(
            store.get(&overdue_paid.id).unwrap().unwrap().status,
            OrderStatus::Expired
        );
        assert_eq!(
            store.get(&fresh.id).unwrap().unwrap().status,
            OrderStatus::Pending
        );
        assert_eq!(
            store.get(&overdue_completed.id).unwrap().unwrap().status,
            OrderStatus::Completed
        );

        // the paid-then-expired record goes away on the following sweep
        let stats = store.sweep(now).unwrap();
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.expired, 0);
        assert!(store.get(&overdue_paid.id).unwrap().is_none());
    }

    #[test]
    fn test_list_expired() {
        let (_dir, store) = store();
        let now = Utc::now();

        let overdue = order(Duration::minutes(-1));
        let fresh = order(Duration::minutes(10));
        store.put(&overdue).unwrap();
        store.put(&fresh).unwrap();

        let expired = store.list_expired(now).unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, overdue.id);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = store();
        let order = order(Duration::minutes(10));
        let id = order.id;
        store.put(&order).unwrap();
        store.delete(&id).unwrap();
        assert!(store.get(&id).unwrap().is_none());
    }
}
