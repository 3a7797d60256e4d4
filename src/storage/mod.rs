pub mod json_backend;
pub mod memory;

use std::sync::MutexGuard;

use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    domain::{DailyOrder, DateRange, Record},
    errors::StoreError,
};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Held by services across a check-then-write sequence.
pub type WriteGuard<'a> = MutexGuard<'a, ()>;

/// Abstraction over document stores that keep entities in named JSON collections.
pub trait DocumentStore: Send + Sync {
    /// Returns every document in `collection`; unknown collections are empty.
    fn load(&self, collection: &str) -> Result<Vec<Value>>;

    /// Applies `apply` to the documents of `collection` and persists the result.
    /// Implementations hold their write lock for the whole cycle and skip the
    /// write when `apply` leaves the documents unchanged.
    fn modify(
        &self,
        collection: &str,
        apply: &mut dyn FnMut(&mut Vec<Value>) -> Result<()>,
    ) -> Result<()>;

    /// Serializes service operations that validate against stored records
    /// before writing. Distinct from the lock `modify` takes, so `load` and
    /// `modify` stay usable while the guard is held.
    fn exclusive(&self) -> Result<WriteGuard<'_>>;
}

/// Typed record access layered over any [`DocumentStore`].
pub trait StoreExt {
    fn all<T: Record>(&self) -> Result<Vec<T>>;
    fn find<T: Record>(&self, id: Uuid) -> Result<Option<T>>;
    fn insert<T: Record>(&self, record: &T) -> Result<()>;
    fn replace<T: Record>(&self, record: &T) -> Result<()>;
    fn delete<T: Record>(&self, id: Uuid) -> Result<bool>;
    fn orders_between(&self, range: &DateRange) -> Result<Vec<DailyOrder>>;
    fn orders_on(&self, date: NaiveDate) -> Result<Vec<DailyOrder>>;
}

impl<S: DocumentStore + ?Sized> StoreExt for S {
    fn all<T: Record>(&self) -> Result<Vec<T>> {
        self.load(T::COLLECTION)?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .collect()
    }

    fn find<T: Record>(&self, id: Uuid) -> Result<Option<T>> {
        self.load(T::COLLECTION)?
            .into_iter()
            .find(|doc| document_id(doc) == Some(id))
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .transpose()
    }

    fn insert<T: Record>(&self, record: &T) -> Result<()> {
        let id = record.id();
        let value = serde_json::to_value(record)?;
        self.modify(T::COLLECTION, &mut |docs| {
            if docs.iter().any(|doc| document_id(doc) == Some(id)) {
                return Err(StoreError::Duplicate {
                    collection: T::COLLECTION,
                    id,
                });
            }
            docs.push(value.clone());
            Ok(())
        })?;
        tracing::debug!(collection = T::COLLECTION, %id, "inserted record");
        Ok(())
    }

    fn replace<T: Record>(&self, record: &T) -> Result<()> {
        let id = record.id();
        let value = serde_json::to_value(record)?;
        self.modify(T::COLLECTION, &mut |docs| {
            let slot = docs
                .iter_mut()
                .find(|doc| document_id(doc) == Some(id))
                .ok_or(StoreError::Missing {
                    collection: T::COLLECTION,
                    id,
                })?;
            *slot = value.clone();
            Ok(())
        })?;
        tracing::debug!(collection = T::COLLECTION, %id, "replaced record");
        Ok(())
    }

    fn delete<T: Record>(&self, id: Uuid) -> Result<bool> {
        let mut removed = false;
        self.modify(T::COLLECTION, &mut |docs| {
            let before = docs.len();
            docs.retain(|doc| document_id(doc) != Some(id));
            removed = docs.len() != before;
            Ok(())
        })?;
        if removed {
            tracing::debug!(collection = T::COLLECTION, %id, "deleted record");
        }
        Ok(removed)
    }

    fn orders_between(&self, range: &DateRange) -> Result<Vec<DailyOrder>> {
        let mut orders: Vec<DailyOrder> = self
            .all::<DailyOrder>()?
            .into_iter()
            .filter(|order| range.contains(order.date))
            .collect();
        orders.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(orders)
    }

    fn orders_on(&self, date: NaiveDate) -> Result<Vec<DailyOrder>> {
        self.orders_between(&DateRange::single(date))
    }
}

fn document_id(doc: &Value) -> Option<Uuid> {
    doc.get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStore;
