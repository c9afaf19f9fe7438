//! # Booking Lifecycle
//!
//! A booking's hours and total are never taken from the caller: they are
//! recomputed from the start/end times and the hourly rate every time the booking
//! is saved. Missing or backwards times are an incomplete form, not an error, and
//! produce zero hours.
//!
//! ```text
//!            ┌──────► paid       (emits one invoice)
//!  pending ──┤
//!            └──────► cancelled
//! ```
//!
//! `paid` and `cancelled` are terminal. Nothing moves a booking on its own.
//!
//! When a booking lands on `paid`, [`invoice_for`] freezes a copy of it into an
//! invoice. The invoice keeps no link back to the booking, and later edits to the
//! booking do not reach it.

use crate::error::{RollbookError, Result};
use crate::model::{Booking, BookingStatus, Invoice, InvoiceStatus, LineItem, Record, Student};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

const SECONDS_PER_HOUR: i64 = 3600;

/// Parses a time-of-day as entered in the form (`HH:MM`, seconds optional).
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .ok()
}

/// Elapsed hours between two times of day, rounded to two places.
///
/// Returns zero when either time is missing or `end` is not after `start`.
pub fn compute_hours(start: &str, end: &str) -> Decimal {
    let (Some(start), Some(end)) = (parse_time(start), parse_time(end)) else {
        return Decimal::ZERO;
    };
    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn compute_total(hours: Decimal, rate: Decimal) -> Decimal {
    hours * rate
}

/// Exact, case-insensitive name match against the roster.
pub fn resolve_student<'a>(
    students: &'a [Record<Student>],
    name: &str,
) -> Option<&'a Record<Student>> {
    let wanted = name.trim().to_lowercase();
    students
        .iter()
        .find(|s| s.name.trim().to_lowercase() == wanted)
}

/// Validates a status change. `Ok(false)` means the booking is already there.
pub fn check_transition(from: BookingStatus, to: BookingStatus) -> Result<bool> {
    match (from, to) {
        (a, b) if a == b => Ok(false),
        (from, to) if from.is_terminal() => Err(RollbookError::InvalidTransition { from, to }),
        _ => Ok(true),
    }
}

/// The add/edit booking form before it is turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    /// Free text. Linked to a student only if it matches one exactly.
    pub customer_name: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub rate_per_hour: Decimal,
}

impl BookingDraft {
    pub fn new(date: NaiveDate, rate_per_hour: Decimal) -> Self {
        Self {
            customer_name: String::new(),
            date,
            start_time: String::new(),
            end_time: String::new(),
            rate_per_hour,
        }
    }

    /// Prefills the form from a stored booking.
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            customer_name: booking.student_name.clone(),
            date: booking.date,
            start_time: booking.start_time.clone(),
            end_time: booking.end_time.clone(),
            rate_per_hour: booking.rate_per_hour,
        }
    }

    pub fn hours(&self) -> Decimal {
        compute_hours(&self.start_time, &self.end_time)
    }

    pub fn total(&self) -> Decimal {
        compute_total(self.hours(), self.rate_per_hour)
    }

    /// Builds the record to persist, or `None` while the customer name is blank.
    ///
    /// The form never carries a status: new bookings start pending and later
    /// moves go through [`check_transition`].
    pub fn finalize(&self, students: &[Record<Student>]) -> Option<Booking> {
        let name = self.customer_name.trim();
        if name.is_empty() {
            return None;
        }
        let hours = self.hours();
        Some(Booking {
            student_id: resolve_student(students, name).map(|s| s.id),
            student_name: name.to_string(),
            date: self.date,
            start_time: self.start_time.trim().to_string(),
            end_time: self.end_time.trim().to_string(),
            hours,
            rate_per_hour: self.rate_per_hour,
            total_amount: compute_total(hours, self.rate_per_hour),
            status: BookingStatus::Pending,
        })
    }
}

/// Invoice numbers come from the wall clock in milliseconds.
///
/// Two invoices generated within the same millisecond get the same number.
pub fn invoice_number(now: DateTime<Utc>) -> String {
    format!("INV-{}", now.timestamp_millis())
}

pub fn describe_booking(booking: &Booking) -> String {
    format!(
        "Turf booking on {} ({} - {})",
        booking.date, booking.start_time, booking.end_time
    )
}

/// Freezes a paid booking into an invoice issued at `now`.
pub fn invoice_for(booking: &Booking, now: DateTime<Utc>) -> Invoice {
    Invoice {
        invoice_number: invoice_number(now),
        student_name: booking.student_name.clone(),
        date: now.date_naive(),
        amount: booking.total_amount,
        status: InvoiceStatus::Paid,
        items: vec![LineItem {
            description: describe_booking(booking),
            hours: booking.hours,
            rate: booking.rate_per_hour,
        }],
    }
}

/// Suggestions for the customer field: students whose name contains `input`.
pub fn suggest_students<'a>(
    students: &'a [Record<Student>],
    input: &str,
    limit: usize,
) -> Vec<&'a Record<Student>> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Vec::new();
    }
    students
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&input))
        .take(limit)
        .collect()
}
