use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rollbook::model::{AttendanceStatus, Batch, BookingStatus, InvoiceStatus};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "rollbook", bin_name = "rollbook", version = get_version())]
#[command(about = "Student roster, attendance, turf bookings and invoices", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to $ROLLBOOK_HOME, then the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the student roster
    #[command(alias = "s")]
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Daily attendance
    #[command(alias = "a")]
    Attendance {
        #[command(subcommand)]
        action: AttendanceAction,
    },

    /// Turf bookings
    #[command(alias = "b")]
    Booking {
        #[command(subcommand)]
        action: BookingAction,
    },

    /// Invoices issued for paid bookings
    #[command(alias = "i")]
    Invoice {
        #[command(subcommand)]
        action: InvoiceAction,
    },

    /// Dashboard totals
    Report {
        /// Day to report on (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (page-size, default-rate, currency)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Initialize the data directory
    Init,
}

/// Search and paging flags shared by every list.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only show records containing this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page to show
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (defaults to the page-size setting)
    #[arg(long)]
    pub per_page: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum StudentAction {
    /// List students
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Register a student
    Add {
        name: String,

        #[arg(long, default_value = "")]
        address: String,

        #[arg(long, default_value = "")]
        phone: String,

        /// Batch label, e.g. "Dev 4to5pm below 6 yrs"
        #[arg(long)]
        batch: Option<Batch>,

        /// Registration date (defaults to today)
        #[arg(long)]
        registered: Option<NaiveDate>,
    },

    /// Change a student's details
    #[command(alias = "e")]
    Edit {
        /// Student id or id prefix
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        batch: Option<Batch>,

        #[arg(long)]
        registered: Option<NaiveDate>,
    },

    /// Remove a student
    #[command(alias = "delete")]
    Rm {
        /// Student id or id prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AttendanceAction {
    /// Show the roster with each student's mark for a day
    Show {
        /// Day to show (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Mark a student present, absent or late
    Mark {
        /// Student id or id prefix
        student: String,

        /// present, absent or late
        status: AttendanceStatus,

        /// Day to mark (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BookingAction {
    /// List bookings
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Book the turf
    Add {
        /// Customer name; linked to a student when it matches one exactly
        customer: String,

        /// Start time, HH:MM
        #[arg(long)]
        start: String,

        /// End time, HH:MM
        #[arg(long)]
        end: String,

        /// Day of the booking (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Hourly rate (defaults to the default-rate setting)
        #[arg(long)]
        rate: Option<Decimal>,
    },

    /// Change a booking's details
    #[command(alias = "e")]
    Edit {
        /// Booking id or id prefix
        id: String,

        #[arg(long)]
        customer: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        rate: Option<Decimal>,
    },

    /// Mark a booking paid or cancelled
    Status {
        /// Booking id or id prefix
        id: String,

        /// pending, paid or cancelled
        status: BookingStatus,
    },

    /// Remove a booking
    #[command(alias = "delete")]
    Rm {
        /// Booking id or id prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Revenue, pending amount and hours
    Summary,
}

#[derive(Subcommand, Debug)]
pub enum InvoiceAction {
    /// List invoices
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Print an invoice
    Show {
        /// Invoice id or id prefix
        id: String,
    },

    /// Set an invoice's status
    Status {
        /// Invoice id or id prefix
        id: String,

        /// paid, pending or overdue
        status: InvoiceStatus,
    },

    /// Remove an invoice
    #[command(alias = "delete")]
    Rm {
        /// Invoice id or id prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Totals by status
    Summary,
}
