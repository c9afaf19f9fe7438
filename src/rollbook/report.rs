//! Aggregate figures for the dashboard and list headers.
//!
//! All reducers run over the full current collections on every call. Sums are
//! accumulated as exact decimals; rounding to two places happens only in
//! [`format_amount`].

use crate::attendance::{derive_day, DaySummary};
use crate::model::{
    AttendanceRecord, Booking, BookingStatus, Invoice, InvoiceStatus, Record, Student,
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingTotals {
    /// Sum over paid bookings.
    pub revenue: Decimal,
    /// Sum over pending bookings.
    pub pending: Decimal,
    /// Hours across every booking, whatever its status.
    pub hours: Decimal,
}

pub fn booking_totals(bookings: &[Record<Booking>]) -> BookingTotals {
    bookings
        .iter()
        .fold(BookingTotals::default(), |mut totals, booking| {
            match booking.status {
                BookingStatus::Paid => totals.revenue += booking.total_amount,
                BookingStatus::Pending => totals.pending += booking.total_amount,
                BookingStatus::Cancelled => {}
            }
            totals.hours += booking.hours;
            totals
        })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub paid: Decimal,
    pub pending: Decimal,
    pub overdue: Decimal,
}

impl InvoiceTotals {
    pub fn get(&self, status: InvoiceStatus) -> Decimal {
        match status {
            InvoiceStatus::Paid => self.paid,
            InvoiceStatus::Pending => self.pending,
            InvoiceStatus::Overdue => self.overdue,
        }
    }
}

pub fn invoice_totals(invoices: &[Record<Invoice>]) -> InvoiceTotals {
    let mut totals = InvoiceTotals::default();
    for invoice in invoices {
        let slot = match invoice.status {
            InvoiceStatus::Paid => &mut totals.paid,
            InvoiceStatus::Pending => &mut totals.pending,
            InvoiceStatus::Overdue => &mut totals.overdue,
        };
        *slot += invoice.amount;
    }
    totals
}

/// Students registered in the same calendar month as `today`.
pub fn monthly_registrations(students: &[Record<Student>], today: NaiveDate) -> usize {
    students
        .iter()
        .filter(|s| {
            s.registration_date.year() == today.year()
                && s.registration_date.month() == today.month()
        })
        .count()
}

/// Two decimal places, half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Everything the dashboard shows, computed from one set of snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub students: usize,
    pub registered_this_month: usize,
    pub today: DaySummary,
    pub bookings: BookingTotals,
    pub invoices: InvoiceTotals,
}

pub fn dashboard(
    students: &[Record<Student>],
    attendance: &[Record<AttendanceRecord>],
    bookings: &[Record<Booking>],
    invoices: &[Record<Invoice>],
    today: NaiveDate,
) -> Dashboard {
    Dashboard {
        students: students.len(),
        registered_this_month: monthly_registrations(students, today),
        today: derive_day(attendance, today),
        bookings: booking_totals(bookings),
        invoices: invoice_totals(invoices),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::{booking, day, dec, invoice, student};
    use uuid::Uuid;

    fn records<T>(items: Vec<T>) -> Vec<Record<T>> {
        items
            .into_iter()
            .map(|item| Record::new(Uuid::new_v4(), item))
            .collect()
    }

    #[test]
    fn revenue_and_pending_by_status() {
        let bookings = records(vec![
            booking("A", "2", "50", BookingStatus::Paid),
            booking("B", "1", "50", BookingStatus::Paid),
            booking("C", "1", "30", BookingStatus::Pending),
        ]);
        let totals = booking_totals(&bookings);

        assert_eq!(format_amount(totals.revenue), "150.00");
        assert_eq!(format_amount(totals.pending), "30.00");
        assert_eq!(format_amount(totals.hours), "4.00");
    }

    #[test]
    fn cancelled_bookings_count_toward_hours_only() {
        let bookings = records(vec![booking("A", "1.5", "40", BookingStatus::Cancelled)]);
        let totals = booking_totals(&bookings);

        assert_eq!(totals.revenue, Decimal::ZERO);
        assert_eq!(totals.pending, Decimal::ZERO);
        assert_eq!(totals.hours, dec("1.5"));
    }

    #[test]
    fn accumulation_does_not_round_early() {
        // Three thirds of a unit: rounding each term first would give 0.99.
        let mut items = Vec::new();
        for _ in 0..3 {
            let mut b = booking("A", "1", "1", BookingStatus::Paid);
            b.total_amount = Decimal::ONE / dec("3");
            items.push(b);
        }
        let totals = booking_totals(&records(items));
        assert_eq!(format_amount(totals.revenue), "1.00");
    }

    #[test]
    fn invoice_totals_group_by_status() {
        let invoices = records(vec![
            invoice("INV-1", "100", InvoiceStatus::Paid),
            invoice("INV-2", "25.5", InvoiceStatus::Paid),
            invoice("INV-3", "40", InvoiceStatus::Pending),
            invoice("INV-4", "12", InvoiceStatus::Overdue),
        ]);
        let totals = invoice_totals(&invoices);

        assert_eq!(totals.get(InvoiceStatus::Paid), dec("125.5"));
        assert_eq!(totals.get(InvoiceStatus::Pending), dec("40"));
        assert_eq!(totals.get(InvoiceStatus::Overdue), dec("12"));
    }

    #[test]
    fn formats_two_places() {
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_amount(dec("7")), "7.00");
        assert_eq!(format_amount(dec("2.345")), "2.35");
        assert_eq!(format_amount(dec("1234.5")), "1234.50");
    }

    #[test]
    fn registrations_in_the_current_month() {
        let mut a = student("A");
        a.registration_date = day(2024, 3, 1);
        let mut b = student("B");
        b.registration_date = day(2024, 3, 31);
        let mut c = student("C");
        c.registration_date = day(2023, 3, 15);

        let students = records(vec![a, b, c]);
        assert_eq!(monthly_registrations(&students, day(2024, 3, 20)), 2);
        assert_eq!(monthly_registrations(&students, day(2024, 4, 1)), 0);
    }

    #[test]
    fn dashboard_combines_collections() {
        let students = records(vec![student("A")]);
        let bookings = records(vec![booking("A", "1", "50", BookingStatus::Paid)]);
        let board = dashboard(&students, &[], &bookings, &[], day(2024, 1, 20));

        assert_eq!(board.students, 1);
        assert_eq!(board.registered_this_month, 1);
        assert_eq!(board.today.marked(), 0);
        assert_eq!(board.bookings.revenue, dec("50"));
        assert_eq!(board.invoices, InvoiceTotals::default());
    }
}
