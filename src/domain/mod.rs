pub mod category;
pub mod common;
pub mod company;
pub mod customer;
pub mod driver;
pub mod invoice;
pub mod order;
pub mod payment;
pub mod report;

pub use category::FoodCategory;
pub use common::{
    round_currency, DateRange, Displayable, Identifiable, InvalidDateRange, MealCounts,
    NamedEntity, Record,
};
pub use company::Company;
pub use customer::Customer;
pub use driver::Driver;
pub use invoice::{Invoice, InvoiceStatus};
pub use order::{DailyOrder, OrderDraft, OrderItem, OrderItemDraft};
pub use payment::{Payment, PaymentMethod};
pub use report::{
    CategoryLine, CustomerStatement, DailyTotals, DriverTotals, MonthlyCalculation,
    ProfitAnalysis, RangeTotals,
};
