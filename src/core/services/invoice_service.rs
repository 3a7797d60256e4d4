use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{DateRange, Invoice, InvoiceStatus, Payment};
use crate::storage::{DocumentStore, StoreExt};

use super::{CalculationService, ServiceError, ServiceResult};

const NUMBER_PREFIX: &str = "INV";

pub struct InvoiceService;

impl InvoiceService {
    /// Issues an invoice from the customer's monthly calculation over `period`.
    ///
    /// Periods may not overlap an existing invoice for the same customer.
    pub fn generate(
        store: &dyn DocumentStore,
        customer_id: Uuid,
        period: DateRange,
        tax_rate: f64,
        issued_on: NaiveDate,
    ) -> ServiceResult<Invoice> {
        let _guard = store.exclusive()?;
        let bill = CalculationService::customer_monthly(store, customer_id, period, tax_rate)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no orders for customer {customer_id} between {} and {}",
                    period.start, period.end
                ))
            })?;

        let existing = store.all::<Invoice>()?;
        if let Some(overlapping) = existing
            .iter()
            .find(|invoice| invoice.customer_id == customer_id && invoice.period.overlaps(&period))
        {
            return Err(ServiceError::Conflict(format!(
                "invoice {} already covers {} for this customer",
                overlapping.number, overlapping.period
            )));
        }

        let invoice = Invoice {
            id: Uuid::new_v4(),
            number: next_number(&existing, issued_on),
            customer_id,
            driver_id: bill.driver_id,
            period,
            lines: bill.lines,
            counts: bill.counts,
            subtotal: bill.subtotal,
            tax_rate: bill.tax_rate,
            tax: bill.tax,
            grand_total: bill.grand_total,
            amount_paid: 0.0,
            status: InvoiceStatus::Unpaid,
            issued_on,
            created_at: Utc::now(),
        };
        store.insert(&invoice)?;
        tracing::info!(
            number = %invoice.number,
            customer = %customer_id,
            grand_total = invoice.grand_total,
            "generated invoice"
        );
        Ok(invoice)
    }

    pub fn get(store: &dyn DocumentStore, id: Uuid) -> ServiceResult<Invoice> {
        store
            .find::<Invoice>(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {id} not found")))
    }

    /// Lists invoices by issue date, optionally for one customer.
    pub fn list(store: &dyn DocumentStore, customer: Option<Uuid>) -> ServiceResult<Vec<Invoice>> {
        let mut invoices: Vec<Invoice> = store
            .all::<Invoice>()?
            .into_iter()
            .filter(|invoice| customer.map_or(true, |id| invoice.customer_id == id))
            .collect();
        invoices.sort_by(|a, b| {
            a.issued_on
                .cmp(&b.issued_on)
                .then_with(|| a.number.cmp(&b.number))
        });
        Ok(invoices)
    }

    pub fn remove(store: &dyn DocumentStore, id: Uuid) -> ServiceResult<()> {
        let _guard = store.exclusive()?;
        let invoice = Self::get(store, id)?;
        if store
            .all::<Payment>()?
            .iter()
            .any(|payment| payment.invoice_id == Some(id))
        {
            return Err(ServiceError::Conflict(format!(
                "invoice {} has payments and cannot be removed",
                invoice.number
            )));
        }
        store.delete::<Invoice>(id)?;
        tracing::info!(number = %invoice.number, "removed invoice");
        Ok(())
    }

    /// Recomputes `amount_paid` and status from the payments linked to the invoice.
    pub(crate) fn refresh_payments(store: &dyn DocumentStore, id: Uuid) -> ServiceResult<Invoice> {
        let mut invoice = Self::get(store, id)?;
        let paid: f64 = store
            .all::<Payment>()?
            .iter()
            .filter(|payment| payment.invoice_id == Some(id))
            .map(|payment| payment.amount)
            .sum();
        let previous = invoice.status;
        invoice.apply_payments(paid);
        store.replace(&invoice)?;
        if invoice.status != previous {
            tracing::info!(number = %invoice.number, status = %invoice.status, "invoice status changed");
        }
        Ok(invoice)
    }
}

/// Next sequential number for the issue month, e.g. `INV-202403-0007`.
fn next_number(existing: &[Invoice], issued_on: NaiveDate) -> String {
    let prefix = format!("{}-{}-", NUMBER_PREFIX, issued_on.format("%Y%m"));
    let last = existing
        .iter()
        .filter_map(|invoice| invoice.number.strip_prefix(&prefix))
        .filter_map(|sequence| sequence.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:04}", prefix, last + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MealCounts;

    fn invoice_numbered(number: &str) -> Invoice {
        let day = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        Invoice {
            id: Uuid::new_v4(),
            number: number.into(),
            customer_id: Uuid::new_v4(),
            driver_id: None,
            period: DateRange::month_of(day),
            lines: Vec::new(),
            counts: MealCounts::zero(),
            subtotal: 0.0,
            tax_rate: 0.0,
            tax: 0.0,
            grand_total: 0.0,
            amount_paid: 0.0,
            status: InvoiceStatus::Unpaid,
            issued_on: day,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn numbers_are_sequential_per_month() {
        let march = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let april = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert_eq!(next_number(&[], march), "INV-202403-0001");
        let existing = vec![
            invoice_numbered("INV-202403-0001"),
            invoice_numbered("INV-202403-0009"),
            invoice_numbered("INV-202402-0042"),
        ];
        assert_eq!(next_number(&existing, march), "INV-202403-0010");
        assert_eq!(next_number(&existing, april), "INV-202404-0001");
    }
}
