use uuid::Uuid;

use crate::core::calculation::NameBook;
use crate::domain::{
    Company, Customer, DailyOrder, Displayable, Driver, FoodCategory, Invoice, NamedEntity,
    Payment, Record,
};
use crate::storage::{DocumentStore, StoreExt};

use super::{ServiceError, ServiceResult};

/// Named directory entities managed through [`EntityService`].
pub trait ManagedEntity: Record + NamedEntity + Displayable {
    /// Human-readable kind used in messages and logs.
    const LABEL: &'static str;

    fn name_mut(&mut self) -> &mut String;

    /// Copies id and creation time from the stored version during an edit.
    fn retain_identity(&mut self, stored: &Self);

    /// Entity-specific problems beyond name validation.
    fn check(&self, _store: &dyn DocumentStore) -> ServiceResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// Explains why the entity cannot be removed, if anything references it.
    fn blockers(id: Uuid, store: &dyn DocumentStore) -> ServiceResult<Option<String>>;
}

pub struct EntityService;

impl EntityService {
    pub fn add<T: ManagedEntity>(store: &dyn DocumentStore, mut entity: T) -> ServiceResult<T> {
        let _guard = store.exclusive()?;
        Self::normalize_name(&mut entity);
        let mut problems = Self::validate_name(store, None, &entity)?;
        problems.extend(entity.check(store)?);
        ServiceError::check(problems)?;
        store.insert(&entity)?;
        tracing::info!(kind = T::LABEL, id = %entity.id(), "added {}", entity.display_label());
        Ok(entity)
    }

    pub fn edit<T: ManagedEntity>(
        store: &dyn DocumentStore,
        id: Uuid,
        mut changes: T,
    ) -> ServiceResult<T> {
        let _guard = store.exclusive()?;
        let stored = Self::get::<T>(store, id)?;
        changes.retain_identity(&stored);
        Self::normalize_name(&mut changes);
        let mut problems = Self::validate_name(store, Some(id), &changes)?;
        problems.extend(changes.check(store)?);
        ServiceError::check(problems)?;
        store.replace(&changes)?;
        tracing::info!(kind = T::LABEL, %id, "updated {}", changes.display_label());
        Ok(changes)
    }

    pub fn remove<T: ManagedEntity>(store: &dyn DocumentStore, id: Uuid) -> ServiceResult<()> {
        let _guard = store.exclusive()?;
        let stored = Self::get::<T>(store, id)?;
        if let Some(reason) = T::blockers(id, store)? {
            return Err(ServiceError::Conflict(format!(
                "{} `{}` cannot be removed: {}",
                T::LABEL,
                stored.name(),
                reason
            )));
        }
        store.delete::<T>(id)?;
        tracing::info!(kind = T::LABEL, %id, "removed {}", stored.display_label());
        Ok(())
    }

    pub fn get<T: ManagedEntity>(store: &dyn DocumentStore, id: Uuid) -> ServiceResult<T> {
        store
            .find::<T>(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("{} {} not found", T::LABEL, id)))
    }

    /// Lists entities ordered by name, case-insensitively.
    pub fn list<T: ManagedEntity>(store: &dyn DocumentStore) -> ServiceResult<Vec<T>> {
        let mut entities = store.all::<T>()?;
        entities.sort_by_key(|entity| entity.name().to_lowercase());
        Ok(entities)
    }

    pub fn names<T: ManagedEntity>(store: &dyn DocumentStore) -> ServiceResult<NameBook> {
        Ok(store
            .all::<T>()?
            .into_iter()
            .map(|entity| (entity.id(), entity.name().to_string()))
            .collect())
    }

    fn normalize_name<T: ManagedEntity>(entity: &mut T) {
        let trimmed = entity.name().trim().to_string();
        *entity.name_mut() = trimmed;
    }

    fn validate_name<T: ManagedEntity>(
        store: &dyn DocumentStore,
        exclude: Option<Uuid>,
        candidate: &T,
    ) -> ServiceResult<Vec<String>> {
        if candidate.name().is_empty() {
            return Ok(vec![format!("{} name is required", T::LABEL)]);
        }
        let normalized = candidate.name().to_lowercase();
        let duplicate = store.all::<T>()?.iter().any(|existing| {
            existing.name().trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| existing.id() != id)
        });
        if duplicate {
            Ok(vec![format!(
                "{} `{}` already exists",
                T::LABEL,
                candidate.name()
            )])
        } else {
            Ok(Vec::new())
        }
    }
}

impl ManagedEntity for Driver {
    const LABEL: &'static str = "Driver";

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }

    fn retain_identity(&mut self, stored: &Self) {
        self.id = stored.id;
        self.created_at = stored.created_at;
    }

    fn blockers(id: Uuid, store: &dyn DocumentStore) -> ServiceResult<Option<String>> {
        if store
            .all::<DailyOrder>()?
            .iter()
            .any(|order| order.driver_id == id)
        {
            return Ok(Some("driver has recorded orders".into()));
        }
        if store
            .all::<Customer>()?
            .iter()
            .any(|customer| customer.driver_id == Some(id))
        {
            return Ok(Some("driver is assigned to customers".into()));
        }
        Ok(None)
    }
}

impl ManagedEntity for Company {
    const LABEL: &'static str = "Company";

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }

    fn retain_identity(&mut self, stored: &Self) {
        self.id = stored.id;
        self.created_at = stored.created_at;
    }

    fn blockers(id: Uuid, store: &dyn DocumentStore) -> ServiceResult<Option<String>> {
        let linked = store
            .all::<Customer>()?
            .iter()
            .any(|customer| customer.company_id == Some(id));
        Ok(linked.then(|| "company has customers".to_string()))
    }
}

impl ManagedEntity for Customer {
    const LABEL: &'static str = "Customer";

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }

    fn retain_identity(&mut self, stored: &Self) {
        self.id = stored.id;
        self.created_at = stored.created_at;
    }

    fn check(&self, store: &dyn DocumentStore) -> ServiceResult<Vec<String>> {
        let mut problems = Vec::new();
        if let Some(company_id) = self.company_id {
            if store.find::<Company>(company_id)?.is_none() {
                problems.push(format!("linked company {company_id} does not exist"));
            }
        }
        if let Some(driver_id) = self.driver_id {
            if store.find::<Driver>(driver_id)?.is_none() {
                problems.push(format!("assigned driver {driver_id} does not exist"));
            }
        }
        Ok(problems)
    }

    fn blockers(id: Uuid, store: &dyn DocumentStore) -> ServiceResult<Option<String>> {
        if store
            .all::<DailyOrder>()?
            .iter()
            .any(|order| order.items_for(id).next().is_some())
        {
            return Ok(Some("customer has order items".into()));
        }
        if store
            .all::<Invoice>()?
            .iter()
            .any(|invoice| invoice.customer_id == id)
        {
            return Ok(Some("customer has invoices".into()));
        }
        if store
            .all::<Payment>()?
            .iter()
            .any(|payment| payment.customer_id == id)
        {
            return Ok(Some("customer has payments".into()));
        }
        Ok(None)
    }
}

impl ManagedEntity for FoodCategory {
    const LABEL: &'static str = "Food category";

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }

    fn retain_identity(&mut self, stored: &Self) {
        self.id = stored.id;
        self.created_at = stored.created_at;
    }

    fn check(&self, _store: &dyn DocumentStore) -> ServiceResult<Vec<String>> {
        if !self.price_per_meal.is_finite() || self.price_per_meal < 0.0 {
            Ok(vec![format!(
                "price per meal must be zero or positive (got {})",
                self.price_per_meal
            )])
        } else {
            Ok(Vec::new())
        }
    }

    fn blockers(id: Uuid, store: &dyn DocumentStore) -> ServiceResult<Option<String>> {
        let used = store
            .all::<DailyOrder>()?
            .iter()
            .any(|order| order.items.iter().any(|item| item.category_id == id));
        Ok(used.then(|| "category is used by orders".to_string()))
    }
}
