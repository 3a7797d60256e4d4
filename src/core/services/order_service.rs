use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::bag_format;
use crate::domain::{
    Customer, DailyOrder, DateRange, Driver, FoodCategory, OrderDraft, OrderItem,
};
use crate::storage::{DocumentStore, StoreExt};

use super::{ServiceError, ServiceResult};

pub struct OrderService;

impl OrderService {
    pub fn create(store: &dyn DocumentStore, draft: OrderDraft) -> ServiceResult<DailyOrder> {
        let _guard = store.exclusive()?;
        let order = Self::build(store, draft)?;
        store.insert(&order)?;
        tracing::info!(
            id = %order.id,
            date = %order.date,
            items = order.items.len(),
            "recorded order with {}",
            order.counts()
        );
        Ok(order)
    }

    pub fn update(
        store: &dyn DocumentStore,
        id: Uuid,
        draft: OrderDraft,
    ) -> ServiceResult<DailyOrder> {
        let _guard = store.exclusive()?;
        let stored = Self::get(store, id)?;
        let mut order = Self::build(store, draft)?;
        order.id = stored.id;
        order.created_at = stored.created_at;
        store.replace(&order)?;
        tracing::info!(%id, date = %order.date, "updated order");
        Ok(order)
    }

    pub fn remove(store: &dyn DocumentStore, id: Uuid) -> ServiceResult<()> {
        let _guard = store.exclusive()?;
        if !store.delete::<DailyOrder>(id)? {
            return Err(ServiceError::NotFound(format!("Order {id} not found")));
        }
        tracing::info!(%id, "removed order");
        Ok(())
    }

    pub fn get(store: &dyn DocumentStore, id: Uuid) -> ServiceResult<DailyOrder> {
        store
            .find::<DailyOrder>(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))
    }

    pub fn list_on(store: &dyn DocumentStore, date: NaiveDate) -> ServiceResult<Vec<DailyOrder>> {
        Ok(store.orders_on(date)?)
    }

    pub fn list_between(
        store: &dyn DocumentStore,
        range: DateRange,
    ) -> ServiceResult<Vec<DailyOrder>> {
        Ok(store.orders_between(&range)?)
    }

    /// Validates a draft and derives counts and prices for each item.
    ///
    /// Every problem is collected so callers can report them together.
    fn build(store: &dyn DocumentStore, draft: OrderDraft) -> ServiceResult<DailyOrder> {
        let mut problems = Vec::new();
        if store.find::<Driver>(draft.driver_id)?.is_none() {
            problems.push(format!("driver {} does not exist", draft.driver_id));
        }
        if draft.items.is_empty() {
            problems.push("an order needs at least one item".to_string());
        }

        let customers: HashMap<Uuid, Customer> = store
            .all::<Customer>()?
            .into_iter()
            .map(|customer| (customer.id, customer))
            .collect();
        let categories: HashMap<Uuid, FoodCategory> = store
            .all::<FoodCategory>()?
            .into_iter()
            .map(|category| (category.id, category))
            .collect();

        let mut items = Vec::with_capacity(draft.items.len());
        for (idx, item) in draft.items.into_iter().enumerate() {
            let position = idx + 1;
            if !customers.contains_key(&item.customer_id) {
                problems.push(format!(
                    "item {position}: customer {} does not exist",
                    item.customer_id
                ));
            }
            let category = categories.get(&item.category_id);
            if category.is_none() {
                problems.push(format!(
                    "item {position}: food category {} does not exist",
                    item.category_id
                ));
            }
            let counts = match bag_format::parse(&item.bag_format) {
                Ok(counts) => counts,
                Err(err) => {
                    problems.push(format!("item {position}: {err}"));
                    continue;
                }
            };
            if let Some(category) = category {
                items.push(OrderItem::new(
                    item.customer_id,
                    item.category_id,
                    item.bag_format.trim(),
                    counts,
                    category.price_per_meal,
                ));
            }
        }

        ServiceError::check(problems)?;
        let mut order = DailyOrder::new(draft.date, draft.driver_id, items);
        order.notes = draft.notes;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::EntityService;
    use crate::domain::OrderItemDraft;
    use crate::storage::MemoryStore;

    fn seeded() -> (MemoryStore, Driver, Customer, FoodCategory) {
        let store = MemoryStore::new();
        let driver = EntityService::add(&store, Driver::new("Ravi")).unwrap();
        let customer = EntityService::add(&store, Customer::new("Acme")).unwrap();
        let category = EntityService::add(&store, FoodCategory::new("Lunch", 40.0)).unwrap();
        (store, driver, customer, category)
    }

    fn draft(driver: Uuid, customer: Uuid, category: Uuid, bag: &str) -> OrderDraft {
        OrderDraft {
            date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            driver_id: driver,
            items: vec![OrderItemDraft {
                customer_id: customer,
                category_id: category,
                bag_format: bag.into(),
            }],
            notes: None,
        }
    }

    #[test]
    fn create_derives_counts_and_amount() {
        let (store, driver, customer, category) = seeded();
        let order =
            OrderService::create(&store, draft(driver.id, customer.id, category.id, "5,5+7"))
                .unwrap();
        let item = &order.items[0];
        assert_eq!((item.non_veg_count, item.veg_count, item.total_count), (10, 7, 17));
        assert_eq!(item.unit_price, 40.0);
        assert_eq!(item.amount, 680.0);
        assert_eq!(OrderService::get(&store, order.id).unwrap(), order);
    }

    #[test]
    fn create_collects_every_problem() {
        let (store, _driver, _customer, category) = seeded();
        let err = OrderService::create(
            &store,
            draft(Uuid::new_v4(), Uuid::new_v4(), category.id, "5,,1"),
        )
        .unwrap_err();
        match err {
            ServiceError::Validation(problems) => {
                assert_eq!(problems.len(), 3, "{problems:?}");
                assert!(problems[0].contains("driver"));
                assert!(problems[1].contains("customer"));
                assert!(problems[2].contains("empty non-veg count"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.all::<DailyOrder>().unwrap().is_empty());
    }

    #[test]
    fn empty_orders_are_rejected() {
        let (store, driver, _, _) = seeded();
        let mut empty = draft(driver.id, Uuid::nil(), Uuid::nil(), "1");
        empty.items.clear();
        let err = OrderService::create(&store, empty).unwrap_err();
        assert!(err.to_string().contains("at least one item"));
    }

    #[test]
    fn update_reprices_and_keeps_identity() {
        let (store, driver, customer, category) = seeded();
        let order =
            OrderService::create(&store, draft(driver.id, customer.id, category.id, "2")).unwrap();
        let updated =
            OrderService::update(&store, order.id, draft(driver.id, customer.id, category.id, "2+2"))
                .unwrap();
        assert_eq!(updated.id, order.id);
        assert_eq!(updated.created_at, order.created_at);
        assert_eq!(updated.counts().total, 4);
        assert_eq!(store.all::<DailyOrder>().unwrap().len(), 1);
    }

    #[test]
    fn remove_unknown_order_is_not_found() {
        let store = MemoryStore::new();
        let err = OrderService::remove(&store, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
