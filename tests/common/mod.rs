#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use catering_core::{
    core::services::{EntityService, OrderService},
    domain::{
        Company, Customer, DailyOrder, Driver, FoodCategory, OrderDraft, OrderItemDraft,
    },
    http::{router, AppState, ReportDefaults},
    storage::{json_backend::JsonStorage, DocumentStore},
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a JSON store rooted in a unique temporary directory.
pub fn temp_store(retention: usize) -> JsonStorage {
    let temp = TempDir::new().expect("create temp dir");
    let root = temp.path().join("data");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    JsonStorage::new(root, Some(retention)).expect("create json storage backend")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Directory entities most tests start from.
pub struct Seed {
    pub ravi: Driver,
    pub meena: Driver,
    pub acme: Company,
    /// Assigned to Ravi and linked to Acme.
    pub office: Customer,
    /// No assigned driver.
    pub clinic: Customer,
    pub lunch: FoodCategory,
    pub dinner: FoodCategory,
}

pub fn seed(store: &dyn DocumentStore) -> Seed {
    let ravi = EntityService::add(store, Driver::new("Ravi")).expect("add driver");
    let meena = EntityService::add(store, Driver::new("Meena")).expect("add driver");
    let acme = EntityService::add(store, Company::new("Acme Corp")).expect("add company");
    let office = EntityService::add(
        store,
        Customer::new("Acme Office")
            .with_driver(ravi.id)
            .with_company(acme.id),
    )
    .expect("add customer");
    let clinic = EntityService::add(store, Customer::new("City Clinic")).expect("add customer");
    let lunch = EntityService::add(store, FoodCategory::new("Lunch", 40.0)).expect("add category");
    let dinner =
        EntityService::add(store, FoodCategory::new("Dinner", 55.0)).expect("add category");
    Seed {
        ravi,
        meena,
        acme,
        office,
        clinic,
        lunch,
        dinner,
    }
}

pub fn item(customer: &Customer, category: &FoodCategory, bag: &str) -> OrderItemDraft {
    OrderItemDraft {
        customer_id: customer.id,
        category_id: category.id,
        bag_format: bag.into(),
    }
}

pub fn place_order(
    store: &dyn DocumentStore,
    on: NaiveDate,
    driver: &Driver,
    items: Vec<OrderItemDraft>,
) -> DailyOrder {
    OrderService::create(
        store,
        OrderDraft {
            date: on,
            driver_id: driver.id,
            items,
            notes: None,
        },
    )
    .expect("create order")
}

/// Router over a fresh store, returned with the store for seeding.
pub fn test_app(store: Arc<dyn DocumentStore>) -> axum::Router {
    router(AppState::new(store, ReportDefaults::default()))
}

pub fn missing_id() -> Uuid {
    Uuid::new_v4()
}
