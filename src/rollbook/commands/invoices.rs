use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Collection, Document, Invoice, InvoiceStatus};
use crate::store::DataStore;
use serde_json::Value;
use uuid::Uuid;

use super::helpers::find_record;

/// Invoice status is free to move in any direction; only the booking side has a lifecycle.
pub fn set_status<S: DataStore>(store: &mut S, id: &Uuid, status: InvoiceStatus) -> Result<CmdResult> {
    let invoice = find_record::<Invoice, S>(store, id)?;
    if invoice.status == status {
        return Ok(CmdResult::default().with_message(CmdMessage::info(format!(
            "Invoice {} is already {}",
            invoice.invoice_number, status
        ))));
    }

    let mut patch = Document::new();
    patch.insert("status".into(), Value::String(status.as_str().into()));
    store.update(Collection::Invoices, id, patch)?;

    Ok(CmdResult::default()
        .with_affected(*id)
        .with_message(CmdMessage::success(format!(
            "Invoice {} is now {}",
            invoice.invoice_number, status
        ))))
}

pub fn delete<S: DataStore>(store: &mut S, id: &Uuid) -> Result<CmdResult> {
    let invoice = find_record::<Invoice, S>(store, id)?;
    store.delete(Collection::Invoices, id)?;
    Ok(CmdResult::default()
        .with_affected(*id)
        .with_message(CmdMessage::success(format!(
            "Invoice removed: {}",
            invoice.invoice_number
        ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::{invoice, StoreFixture};

    #[test]
    fn status_moves_freely() {
        let mut fixture = StoreFixture::new().with(invoice("INV-1", "40", InvoiceStatus::Pending));
        let id = fixture.ids[0];

        set_status(&mut fixture.store, &id, InvoiceStatus::Overdue).unwrap();
        set_status(&mut fixture.store, &id, InvoiceStatus::Paid).unwrap();

        let stored = find_record::<Invoice, _>(&fixture.store, &id).unwrap();
        assert_eq!(stored.status, InvoiceStatus::Paid);
        assert_eq!(stored.items.len(), 1);
    }

    #[test]
    fn unchanged_status_writes_nothing() {
        let mut fixture = StoreFixture::new().with(invoice("INV-1", "40", InvoiceStatus::Paid));
        let id = fixture.ids[0];
        assert!(set_status(&mut fixture.store, &id, InvoiceStatus::Paid)
            .unwrap()
            .is_noop());
    }

    #[test]
    fn delete_removes_invoice() {
        let mut fixture = StoreFixture::new().with(invoice("INV-1", "40", InvoiceStatus::Paid));
        let id = fixture.ids[0];
        delete(&mut fixture.store, &id).unwrap();
        assert!(fixture.store.is_empty(Collection::Invoices));
    }
}
