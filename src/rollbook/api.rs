//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the derived
//! views. It is the single entry point for every rollbook operation, whatever UI
//! sits on top.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** mutations to the matching command function
//! - **Normalizes inputs** (id prefixes to full ids, "now" to a timestamp)
//! - **Serves reads** from the [`Roster`], which follows the store's live feed
//!
//! It does no printing and no formatting beyond what the commands return.
//!
//! ## Reads and Writes
//!
//! Writes go through a [`LiveStore`], which pushes fresh snapshots to the roster
//! after each successful write. Reads never touch the store directly: lists,
//! day summaries and totals are recomputed from the roster's latest snapshots.
//! A collection whose feed failed answers with
//! [`RollbookError::Unavailable`](crate::error::RollbookError::Unavailable), never
//! with an empty list.
//!
//! ## Generic Over DataStore
//!
//! `RollbookApi<S: DataStore>` is generic over the storage backend:
//! - Production: `RollbookApi<FileStore>`
//! - Testing: `RollbookApi<InMemoryStore>`

use crate::attendance::{derive_day, DaySummary};
use crate::billing::{self, resolve_student, BookingDraft};
use crate::commands;
use crate::commands::helpers::resolve_id;
use crate::commands::students::StudentPatch;
use crate::config::RollbookConfig;
use crate::error::Result;
use crate::model::{
    AttendanceRecord, AttendanceStatus, Booking, BookingStatus, Entity, Invoice, InvoiceStatus,
    Record, Student,
};
use crate::report::{self, BookingTotals, Dashboard, InvoiceTotals};
use crate::state::Roster;
use crate::store::live::LiveStore;
use crate::store::DataStore;
use crate::view::{roster_fields, Editor, ListState, Page};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

/// The main API facade for rollbook operations.
pub struct RollbookApi<S: DataStore> {
    store: LiveStore<S>,
    roster: Roster,
    paths: commands::RollbookPaths,
}

impl<S: DataStore> RollbookApi<S> {
    pub fn new(store: S, paths: commands::RollbookPaths) -> Self {
        let store = LiveStore::new(store);
        let roster = Roster::attach(&store);
        Self {
            store,
            roster,
            paths,
        }
    }

    // --- Students ---

    pub fn add_student(&mut self, student: Student) -> Result<commands::CmdResult> {
        commands::students::add(&mut self.store, student)
    }

    pub fn update_student(&mut self, id: &Uuid, patch: StudentPatch) -> Result<commands::CmdResult> {
        commands::students::update(&mut self.store, id, patch)
    }

    pub fn delete_student(&mut self, id: &Uuid) -> Result<commands::CmdResult> {
        commands::students::delete(&mut self.store, id)
    }

    pub fn students(&self, list: &ListState) -> Result<Page<Record<Student>>> {
        Ok(owned(list.view(&self.roster.students()?)))
    }

    // --- Attendance ---

    pub fn mark_attendance(
        &mut self,
        student_id: &Uuid,
        date: NaiveDate,
        status: AttendanceStatus,
        notes: Option<String>,
    ) -> Result<commands::CmdResult> {
        let student = self.find::<Student>(student_id)?;
        commands::attendance::mark(
            &mut self.store,
            student.id,
            &student.name,
            date,
            status,
            notes,
        )
    }

    /// The attendance screen: one page of the roster (searched by name and
    /// batch) alongside that day's marks.
    pub fn attendance_sheet(
        &self,
        list: &ListState,
        date: NaiveDate,
    ) -> Result<(Page<Record<Student>>, DaySummary)> {
        let students = self.roster.students()?;
        let page = owned(list.view_by(&students, roster_fields));
        Ok((page, self.day_summary(date)?))
    }

    pub fn day_summary(&self, date: NaiveDate) -> Result<DaySummary> {
        Ok(derive_day(&self.roster.attendance()?, date))
    }

    pub fn attendance_records(&self, list: &ListState) -> Result<Page<Record<AttendanceRecord>>> {
        Ok(owned(list.view(&self.roster.attendance()?)))
    }

    // --- Bookings ---

    /// A blank booking form prefilled with the configured rate.
    pub fn new_booking_draft(&self, date: NaiveDate) -> Result<BookingDraft> {
        Ok(BookingDraft::new(date, self.settings()?.default_rate))
    }

    pub fn save_booking(&mut self, id: Option<Uuid>, draft: &BookingDraft) -> Result<commands::CmdResult> {
        let students = self.roster.students()?;
        commands::bookings::save(&mut self.store, &students, id, draft)
    }

    /// Saves whatever the booking form holds: an edit updates, an add creates.
    pub fn submit_booking(&mut self, form: &Editor<BookingDraft>) -> Result<commands::CmdResult> {
        match form {
            Editor::Closed => Ok(commands::CmdResult::default()
                .with_message(commands::CmdMessage::info("No booking form is open"))),
            Editor::Adding(draft) => self.save_booking(None, draft),
            Editor::Editing(id, draft) => self.save_booking(Some(*id), draft),
        }
    }

    /// Roster names containing `input`, for a customer name that matched nobody.
    pub fn suggest_students(&self, input: &str, limit: usize) -> Result<Vec<Record<Student>>> {
        let students = self.roster.students()?;
        if resolve_student(&students, input).is_some() {
            return Ok(Vec::new());
        }
        Ok(billing::suggest_students(&students, input, limit)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn set_booking_status(&mut self, id: &Uuid, status: BookingStatus) -> Result<commands::CmdResult> {
        commands::bookings::update_status(&mut self.store, id, status, Utc::now())
    }

    pub fn delete_booking(&mut self, id: &Uuid) -> Result<commands::CmdResult> {
        commands::bookings::delete(&mut self.store, id)
    }

    pub fn bookings(&self, list: &ListState) -> Result<Page<Record<Booking>>> {
        Ok(owned(list.view(&self.roster.bookings()?)))
    }

    pub fn booking_totals(&self) -> Result<BookingTotals> {
        Ok(report::booking_totals(&self.roster.bookings()?))
    }

    // --- Invoices ---

    pub fn set_invoice_status(&mut self, id: &Uuid, status: InvoiceStatus) -> Result<commands::CmdResult> {
        commands::invoices::set_status(&mut self.store, id, status)
    }

    pub fn delete_invoice(&mut self, id: &Uuid) -> Result<commands::CmdResult> {
        commands::invoices::delete(&mut self.store, id)
    }

    pub fn invoices(&self, list: &ListState) -> Result<Page<Record<Invoice>>> {
        Ok(owned(list.view(&self.roster.invoices()?)))
    }

    pub fn invoice_totals(&self) -> Result<InvoiceTotals> {
        Ok(report::invoice_totals(&self.roster.invoices()?))
    }

    // --- Reporting ---

    pub fn dashboard(&self, today: NaiveDate) -> Result<Dashboard> {
        Ok(report::dashboard(
            &self.roster.students()?,
            &self.roster.attendance()?,
            &self.roster.bookings()?,
            &self.roster.invoices()?,
            today,
        ))
    }

    // --- Lookup ---

    /// Full id from a full id or unique prefix.
    pub fn resolve<T: Entity>(&self, input: &str) -> Result<Uuid> {
        resolve_id(&self.store.records::<T>()?, input)
    }

    pub fn find<T: Entity>(&self, id: &Uuid) -> Result<Record<T>> {
        commands::helpers::find_record::<T, _>(&self.store, id)
    }

    // --- Setup ---

    pub fn settings(&self) -> Result<RollbookConfig> {
        RollbookConfig::load(&self.paths.data_dir)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.paths, action)
    }

    pub fn init(&self) -> Result<commands::CmdResult> {
        commands::init::run(&self.paths)
    }

    pub fn paths(&self) -> &commands::RollbookPaths {
        &self.paths
    }

    /// Whether any collection's feed is currently failing.
    pub fn is_degraded(&self) -> bool {
        self.roster.is_degraded()
    }
}

fn owned<T: Clone>(page: Page<&Record<T>>) -> Page<Record<T>> {
    Page {
        items: page.items.into_iter().cloned().collect(),
        page: page.page,
        total_pages: page.total_pages,
        total_matches: page.total_matches,
    }
}

pub use crate::commands::config::ConfigAction;
pub use commands::{CmdMessage, CmdResult, MessageLevel, RollbookPaths};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RollbookError;
    use crate::model::Collection;
    use crate::store::memory::fixtures::{day, dec, student, StoreFixture};
    use crate::store::memory::InMemoryStore;

    fn api_with(store: InMemoryStore) -> (RollbookApi<InMemoryStore>, tempfile::TempDir) {
        let temp = tempfile::tempdir().unwrap();
        let paths = RollbookPaths {
            data_dir: temp.path().to_path_buf(),
        };
        (RollbookApi::new(store, paths), temp)
    }

    #[test]
    fn writes_show_up_in_list_views() {
        let (mut api, _temp) = api_with(InMemoryStore::new());
        for name in ["Alice", "Bob", "Dalia"] {
            api.add_student(student(name)).unwrap();
        }

        let mut list = ListState::with_page_size(2);
        let page = api.students(&list).unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 2);

        list.apply_search("bob");
        let page = api.students(&list).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Bob");
    }

    #[test]
    fn attendance_sheet_reflects_marks() {
        let fixture = StoreFixture::new().with_student("Alice").with_student("Bob");
        let alice = fixture.ids[0];
        let (mut api, _temp) = api_with(fixture.store);
        let today = day(2024, 3, 4);

        api.mark_attendance(&alice, today, AttendanceStatus::Present, None)
            .unwrap();
        let (page, summary) = api.attendance_sheet(&ListState::default(), today).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.status_of(&alice), Some(AttendanceStatus::Present));
    }

    #[test]
    fn marking_an_unknown_student_fails() {
        let (mut api, _temp) = api_with(InMemoryStore::new());
        assert!(matches!(
            api.mark_attendance(&Uuid::new_v4(), day(2024, 3, 4), AttendanceStatus::Late, None),
            Err(RollbookError::NotFound { .. })
        ));
    }

    #[test]
    fn paying_a_booking_moves_the_dashboard() {
        let fixture = StoreFixture::new().with_student("Alice");
        let (mut api, _temp) = api_with(fixture.store);

        let mut draft = api.new_booking_draft(day(2024, 5, 1)).unwrap();
        assert_eq!(draft.rate_per_hour, dec("50"));
        draft.customer_name = "Alice".into();
        draft.start_time = "09:00".into();
        draft.end_time = "11:00".into();
        let saved = api.save_booking(None, &draft).unwrap();
        let id = saved.affected_ids[0];

        assert_eq!(api.booking_totals().unwrap().pending, dec("100"));

        api.set_booking_status(&id, BookingStatus::Paid).unwrap();
        let board = api.dashboard(day(2024, 1, 20)).unwrap();
        assert_eq!(board.bookings.revenue, dec("100"));
        assert_eq!(board.bookings.pending, dec("0"));
        assert_eq!(board.invoices.paid, dec("100"));
        assert_eq!(api.invoices(&ListState::default()).unwrap().items.len(), 1);
    }

    #[test]
    fn booking_form_routes_by_target() {
        let (mut api, _temp) = api_with(StoreFixture::new().with_student("Alina").store);
        let mut form = Editor::default();
        assert!(api.submit_booking(&form).unwrap().is_noop());

        let mut draft = api.new_booking_draft(day(2024, 5, 1)).unwrap();
        draft.customer_name = "Ali".into();
        form.open_add(draft.clone());
        let id = api.submit_booking(&form).unwrap().affected_ids[0];

        draft.customer_name = "Alina".into();
        form.open_edit(id, draft);
        api.submit_booking(&form).unwrap();

        let bookings = api.bookings(&ListState::default()).unwrap();
        assert_eq!(bookings.items.len(), 1);
        assert!(bookings.items[0].student_id.is_some());
    }

    #[test]
    fn suggestions_only_for_unmatched_names() {
        let fixture = StoreFixture::new().with_student("Alina").with_student("Malik");
        let (api, _temp) = api_with(fixture.store);

        let names: Vec<_> = api
            .suggest_students("ali", 5)
            .unwrap()
            .into_iter()
            .map(|s| s.data.name)
            .collect();
        assert_eq!(names, vec!["Alina", "Malik"]);
        assert!(api.suggest_students("alina", 5).unwrap().is_empty());
    }

    #[test]
    fn unavailable_collection_is_an_error_not_an_empty_page() {
        let mut store = InMemoryStore::new();
        store.fail_reads(Collection::Bookings);
        let (api, _temp) = api_with(store);

        assert!(api.is_degraded());
        assert!(matches!(
            api.bookings(&ListState::default()),
            Err(RollbookError::Unavailable { .. })
        ));
        assert!(api.students(&ListState::default()).is_ok());
    }

    #[test]
    fn resolves_short_ids() {
        let fixture = StoreFixture::new().with_student("Alice");
        let id = fixture.ids[0];
        let (api, _temp) = api_with(fixture.store);

        let short = id.simple().to_string()[..6].to_string();
        assert_eq!(api.resolve::<Student>(&short).unwrap(), id);
        assert!(api.resolve::<Booking>(&short).is_err());
    }
}
