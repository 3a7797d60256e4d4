pub mod calculation_service;
pub mod entity_service;
pub mod invoice_service;
pub mod order_service;
pub mod payment_service;

pub use calculation_service::CalculationService;
pub use entity_service::{EntityService, ManagedEntity};
pub use invoice_service::InvoiceService;
pub use order_service::OrderService;
pub use payment_service::PaymentService;

use crate::errors::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![message.into()])
    }

    /// Fails with every collected problem, or succeeds when there are none.
    pub fn check(problems: Vec<String>) -> ServiceResult<()> {
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(problems))
        }
    }
}
