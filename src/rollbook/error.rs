use crate::model::{BookingStatus, Collection};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RollbookError {
    #[error("No {} record with id {id}", .collection.singular())]
    NotFound { collection: Collection, id: Uuid },

    #[error("{collection} data unavailable: {reason}")]
    Unavailable {
        collection: Collection,
        reason: String,
    },

    #[error("Cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// The booking was marked paid but its invoice was never written.
    #[error(
        "Booking {booking_id} is marked paid but invoice {invoice_number} was not recorded: {source}"
    )]
    InvoiceNotRecorded {
        booking_id: Uuid,
        invoice_number: String,
        #[source]
        source: Box<RollbookError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, RollbookError>;
