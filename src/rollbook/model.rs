//! Record shapes persisted in the four collections.
//!
//! Every record is a flat JSON document with camelCase keys. The store assigns the
//! `id` on create; [`Record`] pairs that id with the typed payload.
//!
//! Student names are copied onto attendance, booking and invoice records when they
//! are written. Renaming a student later does not touch those copies.

use crate::error::{RollbookError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use uuid::Uuid;

/// A flat key-value document as held by the store.
pub type Document = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Students,
    Attendance,
    Bookings,
    Invoices,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Students,
        Collection::Attendance,
        Collection::Bookings,
        Collection::Invoices,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Students => "students",
            Collection::Attendance => "attendance",
            Collection::Bookings => "bookings",
            Collection::Invoices => "invoices",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Collection::Students => "student",
            Collection::Attendance => "attendance",
            Collection::Bookings => "booking",
            Collection::Invoices => "invoice",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A record type that lives in one of the store's collections.
pub trait Entity: Serialize + DeserializeOwned + Clone + 'static {
    const COLLECTION: Collection;
}

/// A stored record: the store-assigned id plus the typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T> {
    pub fn new(id: Uuid, data: T) -> Self {
        Self { id, data }
    }

    /// First eight characters of the id, used when listing.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T: Entity> Record<T> {
    pub fn from_document(doc: Document) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
    }
}

/// Serializes a record payload (or a partial patch) into a store document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(RollbookError::Store(format!(
            "expected a document, got {}",
            other
        ))),
    }
}

// --- Students ---

/// Cohort a student trains with. The set of labels is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Batch {
    #[default]
    #[serde(rename = "Dev 4to5pm below 6 yrs")]
    DevUnder6,
    #[serde(rename = "Dev 5to6pm below 8 yrs")]
    DevUnder8,
    #[serde(rename = "Dev 6to7pm below 10 yrs")]
    DevUnder10,
    #[serde(rename = "Dev 7to8pm Above 12 yrs")]
    DevOver12,
    #[serde(rename = "Beginner 4to5pm below 6 yrs")]
    BeginnerUnder6,
    #[serde(rename = "Beginner 5to6pm below 8 yrs")]
    BeginnerUnder8,
    #[serde(rename = "Beginner 6to7pm below 10 yrs")]
    BeginnerUnder10,
    #[serde(rename = "Beginner 7to8pm Above 12 yrs")]
    BeginnerOver12,
}

impl Batch {
    pub const ALL: [Batch; 8] = [
        Batch::DevUnder6,
        Batch::DevUnder8,
        Batch::DevUnder10,
        Batch::DevOver12,
        Batch::BeginnerUnder6,
        Batch::BeginnerUnder8,
        Batch::BeginnerUnder10,
        Batch::BeginnerOver12,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Batch::DevUnder6 => "Dev 4to5pm below 6 yrs",
            Batch::DevUnder8 => "Dev 5to6pm below 8 yrs",
            Batch::DevUnder10 => "Dev 6to7pm below 10 yrs",
            Batch::DevOver12 => "Dev 7to8pm Above 12 yrs",
            Batch::BeginnerUnder6 => "Beginner 4to5pm below 6 yrs",
            Batch::BeginnerUnder8 => "Beginner 5to6pm below 8 yrs",
            Batch::BeginnerUnder10 => "Beginner 6to7pm below 10 yrs",
            Batch::BeginnerOver12 => "Beginner 7to8pm Above 12 yrs",
        }
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Batch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Batch::ALL
            .iter()
            .find(|b| b.label().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| format!("Unknown batch: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub batch: Batch,
    pub registration_date: NaiveDate,
}

impl Entity for Student {
    const COLLECTION: Collection = Collection::Students;
}

// --- Attendance ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            _ => Err(format!("Unknown attendance status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: Uuid,
    pub student_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for AttendanceRecord {
    const COLLECTION: Collection = Collection::Attendance;
}

// --- Bookings ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Paid => "paid",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Paid | BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "paid" => Ok(BookingStatus::Paid),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Unknown booking status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unset when the customer name matched no known student.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub student_id: Option<Uuid>,
    pub student_name: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub hours: Decimal,
    pub rate_per_hour: Decimal,
    pub total_amount: Decimal,
    pub status: BookingStatus,
}

impl Entity for Booking {
    const COLLECTION: Collection = Collection::Bookings;
}

/// Older documents carry `"studentId": ""` for unlinked bookings.
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

// --- Invoices ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Pending,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(InvoiceStatus::Paid),
            "pending" => Ok(InvoiceStatus::Pending),
            "overdue" => Ok(InvoiceStatus::Overdue),
            _ => Err(format!("Unknown invoice status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub hours: Decimal,
    pub rate: Decimal,
}

impl LineItem {
    pub fn amount(&self) -> Decimal {
        self.hours * self.rate
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_number: String,
    pub student_name: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub items: Vec<LineItem>,
}

impl Invoice {
    /// Whether the invoice carries everything a printout needs.
    pub fn is_printable(&self) -> bool {
        !self.invoice_number.is_empty() && !self.items.is_empty()
    }
}

impl Entity for Invoice {
    const COLLECTION: Collection = Collection::Invoices;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample_booking() -> Booking {
        Booking {
            student_id: None,
            student_name: "Walk-in".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            start_time: "09:00".into(),
            end_time: "10:30".into(),
            hours: dec("1.5"),
            rate_per_hour: dec("50"),
            total_amount: dec("75"),
            status: BookingStatus::Pending,
        }
    }

    #[test]
    fn record_flattens_payload_next_to_id() {
        let record = Record::new(Uuid::new_v4(), sample_booking());
        let doc = to_document(&record).unwrap();

        assert!(doc.contains_key("id"));
        assert_eq!(doc["studentName"], "Walk-in");
        assert_eq!(doc["ratePerHour"], serde_json::json!(50.0));
        assert!(doc["studentId"].is_null());

        let back = Record::<Booking>::from_document(doc).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn empty_student_id_reads_as_unlinked() {
        let mut doc = to_document(&sample_booking()).unwrap();
        doc.insert("id".into(), serde_json::json!(Uuid::new_v4()));
        doc.insert("studentId".into(), serde_json::json!(""));

        let record = Record::<Booking>::from_document(doc).unwrap();
        assert_eq!(record.student_id, None);
    }

    #[test]
    fn batch_uses_display_labels() {
        let json = serde_json::to_string(&Batch::BeginnerOver12).unwrap();
        assert_eq!(json, "\"Beginner 7to8pm Above 12 yrs\"");
        assert_eq!(
            "dev 5to6pm below 8 yrs".parse::<Batch>().unwrap(),
            Batch::DevUnder8
        );
        assert!("Advanced".parse::<Batch>().is_err());
    }

    #[test]
    fn statuses_parse_case_insensitively() {
        assert_eq!("PAID".parse::<BookingStatus>().unwrap(), BookingStatus::Paid);
        assert_eq!(
            "Late".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Late
        );
        assert_eq!(
            "overdue".parse::<InvoiceStatus>().unwrap(),
            InvoiceStatus::Overdue
        );
    }

    #[test]
    fn invoice_without_items_is_not_printable() {
        let invoice = Invoice {
            invoice_number: "INV-1".into(),
            student_name: "A".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount: Decimal::ZERO,
            status: InvoiceStatus::Paid,
            items: vec![],
        };
        assert!(!invoice.is_printable());
    }
}
