use crate::billing::{check_transition, invoice_for, BookingDraft};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{RollbookError, Result};
use crate::model::{to_document, Booking, BookingStatus, Collection, Document, Record, Student};
use crate::report::format_amount;
use crate::store::DataStore;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::helpers::find_record;

/// Saves the booking form. With an id the stored booking is overwritten,
/// otherwise a new one is created.
///
/// An edit never touches the stored status; that is [`update_status`]'s job.
pub fn save<S: DataStore>(
    store: &mut S,
    students: &[Record<Student>],
    id: Option<Uuid>,
    draft: &BookingDraft,
) -> Result<CmdResult> {
    let Some(booking) = draft.finalize(students) else {
        return Ok(CmdResult::default()
            .with_message(CmdMessage::info("A booking needs a customer name; nothing saved")));
    };

    let mut doc = to_document(&booking)?;
    let (id, verb) = match id {
        Some(id) => {
            doc.remove("status");
            store.update(Collection::Bookings, &id, doc)?;
            (id, "updated")
        }
        None => (store.create(Collection::Bookings, doc)?, "added"),
    };

    let mut result = CmdResult::default().with_affected(id);
    result.add_message(CmdMessage::success(format!(
        "Booking {}: {} on {}, {} h, total {}",
        verb,
        booking.student_name,
        booking.date,
        format_amount(booking.hours),
        format_amount(booking.total_amount)
    )));
    if booking.student_id.is_none() {
        result.add_message(CmdMessage::info(format!(
            "{} is not on the roster; saved as a guest booking",
            booking.student_name
        )));
    }
    Ok(result)
}

/// Moves a booking along its lifecycle, issuing an invoice when it becomes paid.
pub fn update_status<S: DataStore>(
    store: &mut S,
    id: &Uuid,
    status: BookingStatus,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let booking = find_record::<Booking, S>(store, id)?;
    if !check_transition(booking.status, status)? {
        return Ok(CmdResult::default().with_message(CmdMessage::info(format!(
            "Booking is already {}",
            status
        ))));
    }

    let mut patch = Document::new();
    patch.insert("status".into(), Value::String(status.as_str().into()));
    store.update(Collection::Bookings, id, patch)?;
    tracing::debug!(booking = %id, %status, "booking status changed");

    let mut result = CmdResult::default()
        .with_affected(*id)
        .with_message(CmdMessage::success(format!(
            "Booking for {} is now {}",
            booking.student_name, status
        )));

    if status == BookingStatus::Paid {
        let invoice = invoice_for(&booking, now);
        let written = to_document(&invoice).and_then(|doc| store.create(Collection::Invoices, doc));
        match written {
            Ok(invoice_id) => {
                result.affected_ids.push(invoice_id);
                result.add_message(CmdMessage::success(format!(
                    "Invoice {} issued for {}",
                    invoice.invoice_number,
                    format_amount(invoice.amount)
                )));
                result.invoices.push(invoice);
            }
            Err(e) => {
                tracing::warn!(
                    booking = %id,
                    invoice = %invoice.invoice_number,
                    error = %e,
                    "booking marked paid but invoice write failed"
                );
                return Err(RollbookError::InvoiceNotRecorded {
                    booking_id: *id,
                    invoice_number: invoice.invoice_number,
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(result)
}

pub fn delete<S: DataStore>(store: &mut S, id: &Uuid) -> Result<CmdResult> {
    let booking = find_record::<Booking, S>(store, id)?;
    store.delete(Collection::Bookings, id)?;
    Ok(CmdResult::default()
        .with_affected(*id)
        .with_message(CmdMessage::success(format!(
            "Booking removed: {} on {}",
            booking.student_name, booking.date
        ))))
}
