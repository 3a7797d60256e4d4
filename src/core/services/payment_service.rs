use uuid::Uuid;

use crate::domain::{round_currency, Customer, CustomerStatement, Payment};
use crate::storage::{DocumentStore, StoreExt};

use super::{EntityService, InvoiceService, ServiceError, ServiceResult};

const OVERPAYMENT_TOLERANCE: f64 = 0.005;

pub struct PaymentService;

impl PaymentService {
    /// Records a payment and, when it targets an invoice, refreshes that invoice.
    pub fn record(store: &dyn DocumentStore, payment: Payment) -> ServiceResult<Payment> {
        let _guard = store.exclusive()?;
        let mut problems = Vec::new();
        if !payment.amount.is_finite() || payment.amount <= 0.0 {
            problems.push(format!(
                "payment amount must be positive (got {})",
                payment.amount
            ));
        }
        if store.find::<Customer>(payment.customer_id)?.is_none() {
            problems.push(format!("customer {} does not exist", payment.customer_id));
        }
        if let Some(invoice_id) = payment.invoice_id {
            match InvoiceService::get(store, invoice_id) {
                Ok(invoice) => {
                    if invoice.customer_id != payment.customer_id {
                        problems.push(format!(
                            "invoice {} belongs to another customer",
                            invoice.number
                        ));
                    } else if payment.amount > invoice.balance_due() + OVERPAYMENT_TOLERANCE {
                        problems.push(format!(
                            "payment of {:.2} exceeds the {:.2} due on invoice {}",
                            payment.amount,
                            invoice.balance_due(),
                            invoice.number
                        ));
                    }
                }
                Err(ServiceError::NotFound(message)) => problems.push(message),
                Err(other) => return Err(other),
            }
        }
        ServiceError::check(problems)?;

        store.insert(&payment)?;
        tracing::info!(
            id = %payment.id,
            customer = %payment.customer_id,
            amount = payment.amount,
            "recorded payment"
        );
        if let Some(invoice_id) = payment.invoice_id {
            InvoiceService::refresh_payments(store, invoice_id)?;
        }
        Ok(payment)
    }

    pub fn remove(store: &dyn DocumentStore, id: Uuid) -> ServiceResult<()> {
        let _guard = store.exclusive()?;
        let payment = store
            .find::<Payment>(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {id} not found")))?;
        store.delete::<Payment>(id)?;
        tracing::info!(%id, "removed payment");
        if let Some(invoice_id) = payment.invoice_id {
            InvoiceService::refresh_payments(store, invoice_id)?;
        }
        Ok(())
    }

    /// Lists payments by date, optionally for one customer.
    pub fn list(store: &dyn DocumentStore, customer: Option<Uuid>) -> ServiceResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = store
            .all::<Payment>()?
            .into_iter()
            .filter(|payment| customer.map_or(true, |id| payment.customer_id == id))
            .collect();
        payments.sort_by(|a, b| {
            a.paid_on
                .cmp(&b.paid_on)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(payments)
    }

    pub fn statement(
        store: &dyn DocumentStore,
        customer_id: Uuid,
    ) -> ServiceResult<CustomerStatement> {
        let customer = EntityService::get::<Customer>(store, customer_id)?;
        let invoices = InvoiceService::list(store, Some(customer_id))?;
        let payments = Self::list(store, Some(customer_id))?;
        let invoiced = round_currency(invoices.iter().map(|invoice| invoice.grand_total).sum());
        let paid = round_currency(payments.iter().map(|payment| payment.amount).sum());
        Ok(CustomerStatement {
            customer_id,
            customer_name: customer.name,
            invoiced,
            paid,
            outstanding: round_currency(invoiced - paid),
            invoices,
            payments,
        })
    }
}
