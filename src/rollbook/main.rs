use chrono::{Local, NaiveDate};
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use rollbook::api::{CmdMessage, ConfigAction, MessageLevel, RollbookApi, RollbookPaths};
use rollbook::billing::{parse_time, BookingDraft};
use rollbook::commands::students::StudentPatch;
use rollbook::config::{RollbookConfig, KEYS};
use rollbook::error::{RollbookError, Result};
use rollbook::model::{
    AttendanceStatus, Booking, BookingStatus, Invoice, InvoiceStatus, Record, Student,
};
use rollbook::report::format_amount;
use rollbook::store::fs::FileStore;
use rollbook::view::{Editor, ListState, Page};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{
    AttendanceAction, BookingAction, Cli, Commands, InvoiceAction, ListArgs, StudentAction,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: RollbookApi<FileStore>,
    config: RollbookConfig,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Commands::Student { action } => handle_student(&mut ctx, action),
        Commands::Attendance { action } => handle_attendance(&mut ctx, action),
        Commands::Booking { action } => handle_booking(&mut ctx, action),
        Commands::Invoice { action } => handle_invoice(&mut ctx, action),
        Commands::Report { date } => handle_report(&ctx, date),
        Commands::Config { key, value } => handle_config(&ctx, key, value),
        Commands::Init => handle_init(&ctx),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    if let Some(dir) = std::env::var_os("ROLLBOOK_HOME") {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "rollbook", "rollbook")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| RollbookError::Api("Could not determine data directory".into()))
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = data_dir(cli)?;
    let config = RollbookConfig::load(&data_dir)?;
    tracing::debug!(dir = %data_dir.display(), "using data directory");

    let store = FileStore::new(data_dir.clone());
    let api = RollbookApi::new(store, RollbookPaths { data_dir });
    Ok(AppContext { api, config })
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Fetches the requested page of a list. A page outside `1..=total` is
/// reported and the first page is shown instead.
fn fetch_page<R>(
    ctx: &AppContext,
    args: &ListArgs,
    fetch: impl Fn(&ListState) -> Result<R>,
    total_pages: impl Fn(&R) -> usize,
) -> Result<R> {
    let mut state = ListState::with_page_size(args.per_page.unwrap_or(ctx.config.page_size));
    if let Some(term) = &args.search {
        state.apply_search(term.trim());
    }

    let first = fetch(&state)?;
    if args.page == state.page {
        return Ok(first);
    }
    let total = total_pages(&first);
    if !state.apply_page(args.page, total) {
        print_messages(&[CmdMessage::warning(format!(
            "page {} is out of range (1..={}); showing page 1",
            args.page, total
        ))]);
        return Ok(first);
    }
    fetch(&state)
}

fn list_page<T>(
    ctx: &AppContext,
    args: &ListArgs,
    fetch: impl Fn(&ListState) -> Result<Page<T>>,
) -> Result<Page<T>> {
    fetch_page(ctx, args, fetch, |page: &Page<T>| page.total_pages)
}

// --- Students ---

fn handle_student(ctx: &mut AppContext, action: StudentAction) -> Result<()> {
    match action {
        StudentAction::List { list } => {
            let page = list_page(ctx, &list, |state| ctx.api.students(state))?;
            print_students(&page);
            Ok(())
        }
        StudentAction::Add {
            name,
            address,
            phone,
            batch,
            registered,
        } => {
            let student = Student {
                name,
                address,
                phone,
                batch: batch.unwrap_or_default(),
                registration_date: registered.unwrap_or_else(today),
            };
            let result = ctx.api.add_student(student)?;
            print_messages(&result.messages);
            Ok(())
        }
        StudentAction::Edit {
            id,
            name,
            address,
            phone,
            batch,
            registered,
        } => {
            let id = ctx.api.resolve::<Student>(&id)?;
            let patch = StudentPatch {
                name,
                address,
                phone,
                batch,
                registration_date: registered,
            };
            let result = ctx.api.update_student(&id, patch)?;
            print_messages(&result.messages);
            Ok(())
        }
        StudentAction::Rm { id, yes } => {
            let id = ctx.api.resolve::<Student>(&id)?;
            let student = ctx.api.find::<Student>(&id)?;
            if !yes && !confirm(&format!("Remove student {}?", student.name))? {
                print_messages(&[CmdMessage::info("Nothing removed")]);
                return Ok(());
            }
            let result = ctx.api.delete_student(&id)?;
            print_messages(&result.messages);
            Ok(())
        }
    }
}

// --- Attendance ---

fn handle_attendance(ctx: &mut AppContext, action: AttendanceAction) -> Result<()> {
    match action {
        AttendanceAction::Show { date, list } => {
            let date = date.unwrap_or_else(today);
            let (page, summary) = fetch_page(
                ctx,
                &list,
                |state| ctx.api.attendance_sheet(state, date),
                |(page, _)| page.total_pages,
            )?;

            println!("{}", format!("Attendance for {}", date).bold());
            println!(
                "{}  {}  {}",
                format!("present {}", summary.present).green(),
                format!("late {}", summary.late).yellow(),
                format!("absent {}", summary.absent).red()
            );
            println!();

            if page.items.is_empty() {
                println!("No students found.");
            }
            for student in &page.items {
                let mark = match summary.status_of(&student.id) {
                    Some(AttendanceStatus::Present) => "present".green(),
                    Some(AttendanceStatus::Late) => "late".yellow(),
                    Some(AttendanceStatus::Absent) => "absent".red(),
                    None => "-".dimmed(),
                };
                println!(
                    "  {}  {}  {:<8}  {}",
                    student.short_id().dimmed(),
                    cell(&student.name, NAME_WIDTH),
                    mark,
                    student.batch.to_string().dimmed()
                );
            }
            print_page_footer(&page);
            Ok(())
        }
        AttendanceAction::Mark {
            student,
            status,
            date,
            notes,
        } => {
            let id = ctx.api.resolve::<Student>(&student)?;
            let date = date.unwrap_or_else(today);
            let result = ctx.api.mark_attendance(&id, date, status, notes)?;
            print_messages(&result.messages);
            Ok(())
        }
    }
}

// --- Bookings ---

fn handle_booking(ctx: &mut AppContext, action: BookingAction) -> Result<()> {
    match action {
        BookingAction::List { list } => {
            let page = list_page(ctx, &list, |state| ctx.api.bookings(state))?;
            print_bookings(&page, &ctx.config.currency);
            Ok(())
        }
        BookingAction::Add {
            customer,
            start,
            end,
            date,
            rate,
        } => {
            let mut draft = ctx.api.new_booking_draft(date.unwrap_or_else(today))?;
            draft.customer_name = customer;
            draft.start_time = start;
            draft.end_time = end;
            if let Some(rate) = rate {
                draft.rate_per_hour = rate;
            }
            let mut form = Editor::default();
            form.open_add(draft);
            submit_booking(ctx, &form)
        }
        BookingAction::Edit {
            id,
            customer,
            start,
            end,
            date,
            rate,
        } => {
            let id = ctx.api.resolve::<Booking>(&id)?;
            let booking = ctx.api.find::<Booking>(&id)?;
            let mut draft = BookingDraft::from_booking(&booking);
            if let Some(customer) = customer {
                draft.customer_name = customer;
            }
            if let Some(start) = start {
                draft.start_time = start;
            }
            if let Some(end) = end {
                draft.end_time = end;
            }
            if let Some(date) = date {
                draft.date = date;
            }
            if let Some(rate) = rate {
                draft.rate_per_hour = rate;
            }
            let mut form = Editor::default();
            form.open_edit(id, draft);
            submit_booking(ctx, &form)
        }
        BookingAction::Status { id, status } => {
            let id = ctx.api.resolve::<Booking>(&id)?;
            let result = ctx.api.set_booking_status(&id, status)?;
            print_messages(&result.messages);
            Ok(())
        }
        BookingAction::Rm { id, yes } => {
            let id = ctx.api.resolve::<Booking>(&id)?;
            let booking = ctx.api.find::<Booking>(&id)?;
            let prompt = format!(
                "Remove booking for {} on {}?",
                booking.student_name, booking.date
            );
            if !yes && !confirm(&prompt)? {
                print_messages(&[CmdMessage::info("Nothing removed")]);
                return Ok(());
            }
            let result = ctx.api.delete_booking(&id)?;
            print_messages(&result.messages);
            Ok(())
        }
        BookingAction::Summary => {
            let totals = ctx.api.booking_totals()?;
            let currency = &ctx.config.currency;
            println!("Revenue: {}", money(currency, totals.revenue).green());
            println!("Pending: {}", money(currency, totals.pending).yellow());
            println!("Hours:   {}", format_amount(totals.hours));
            Ok(())
        }
    }
}

fn submit_booking(ctx: &mut AppContext, form: &Editor<BookingDraft>) -> Result<()> {
    let result = ctx.api.submit_booking(form)?;
    print_messages(&result.messages);
    if result.is_noop() {
        return Ok(());
    }

    if let Editor::Adding(draft) | Editor::Editing(_, draft) = form {
        if let Some(problem) = time_problem(draft) {
            print_messages(&[CmdMessage::warning(format!(
                "{}; booking saved with 0 hours",
                problem
            ))]);
        }
        let similar = ctx.api.suggest_students(&draft.customer_name, SUGGESTIONS)?;
        if !similar.is_empty() {
            let names: Vec<&str> = similar.iter().map(|s| s.name.as_str()).collect();
            print_messages(&[CmdMessage::info(format!(
                "Students with similar names: {}",
                names.join(", ")
            ))]);
        }
    }
    Ok(())
}

/// Why a draft comes out at zero hours, if it does.
fn time_problem(draft: &BookingDraft) -> Option<String> {
    let unreadable = [("Start", &draft.start_time), ("End", &draft.end_time)]
        .into_iter()
        .find(|(_, time)| parse_time(time).is_none());
    if let Some((which, time)) = unreadable {
        return Some(format!("{} time {:?} is not a valid HH:MM time", which, time.trim()));
    }
    draft
        .hours()
        .is_zero()
        .then(|| "End time is not after start time".to_string())
}

// --- Invoices ---

fn handle_invoice(ctx: &mut AppContext, action: InvoiceAction) -> Result<()> {
    match action {
        InvoiceAction::List { list } => {
            let page = list_page(ctx, &list, |state| ctx.api.invoices(state))?;
            print_invoices(&page, &ctx.config.currency);
            Ok(())
        }
        InvoiceAction::Show { id } => {
            let id = ctx.api.resolve::<Invoice>(&id)?;
            let invoice = ctx.api.find::<Invoice>(&id)?;
            print_invoice(&invoice, &ctx.config.currency);
            Ok(())
        }
        InvoiceAction::Status { id, status } => {
            let id = ctx.api.resolve::<Invoice>(&id)?;
            let result = ctx.api.set_invoice_status(&id, status)?;
            print_messages(&result.messages);
            Ok(())
        }
        InvoiceAction::Rm { id, yes } => {
            let id = ctx.api.resolve::<Invoice>(&id)?;
            let invoice = ctx.api.find::<Invoice>(&id)?;
            if !yes && !confirm(&format!("Remove invoice {}?", invoice.invoice_number))? {
                print_messages(&[CmdMessage::info("Nothing removed")]);
                return Ok(());
            }
            let result = ctx.api.delete_invoice(&id)?;
            print_messages(&result.messages);
            Ok(())
        }
        InvoiceAction::Summary => {
            let totals = ctx.api.invoice_totals()?;
            let currency = &ctx.config.currency;
            println!("Paid:    {}", money(currency, totals.paid).green());
            println!("Pending: {}", money(currency, totals.pending).yellow());
            println!("Overdue: {}", money(currency, totals.overdue).red());
            Ok(())
        }
    }
}

// --- Report, config, init ---

fn handle_report(ctx: &AppContext, date: Option<NaiveDate>) -> Result<()> {
    let date = date.unwrap_or_else(today);
    let board = ctx.api.dashboard(date)?;
    let currency = &ctx.config.currency;

    println!("{}", format!("Rollbook report for {}", date).bold());
    println!();
    println!(
        "Students:        {} ({} registered this month)",
        board.students, board.registered_this_month
    );
    println!(
        "Attendance:      {} present, {} late, {} absent",
        board.today.present, board.today.late, board.today.absent
    );
    println!(
        "Revenue:         {}",
        money(currency, board.bookings.revenue).green()
    );
    println!(
        "Pending:         {}",
        money(currency, board.bookings.pending).yellow()
    );
    println!("Hours booked:    {}", format_amount(board.bookings.hours));
    println!(
        "Invoices:        {} paid, {} pending, {} overdue",
        money(currency, board.invoices.paid),
        money(currency, board.invoices.pending),
        money(currency, board.invoices.overdue)
    );
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let result = ctx.api.config(action)?;
    if let Some(config) = &result.config {
        for key in KEYS {
            if let Some(value) = config.get(key) {
                println!("{} = {}", key, value);
            }
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_init(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.init()?;
    print_messages(&result.messages);
    Ok(())
}

// --- Output ---

const NAME_WIDTH: usize = 24;
const SUGGESTIONS: usize = 5;
const WIDE_WIDTH: usize = 32;

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn money(currency: &str, amount: Decimal) -> String {
    format!("{}{}", currency, format_amount(amount))
}

fn print_page_footer<T>(page: &Page<T>) {
    if page.total_pages > 1 {
        println!(
            "{}",
            format!(
                "page {} of {} ({} matching)",
                page.page, page.total_pages, page.total_matches
            )
            .dimmed()
        );
    }
}

fn print_students(page: &Page<Record<Student>>) {
    if page.items.is_empty() {
        println!("No students found.");
    }
    for student in &page.items {
        println!(
            "  {}  {}  {}  {}  {}",
            student.short_id().dimmed(),
            cell(&student.name, NAME_WIDTH),
            cell(&student.phone, 12),
            student.registration_date,
            student.batch.to_string().dimmed()
        );
    }
    print_page_footer(page);
}

fn print_bookings(page: &Page<Record<Booking>>, currency: &str) {
    if page.items.is_empty() {
        println!("No bookings found.");
    }
    for booking in &page.items {
        let status = match booking.status {
            BookingStatus::Pending => booking.status.as_str().yellow(),
            BookingStatus::Paid => booking.status.as_str().green(),
            BookingStatus::Cancelled => booking.status.as_str().dimmed(),
        };
        let guest = if booking.student_id.is_none() { " (guest)" } else { "" };
        println!(
            "  {}  {}  {}  {}-{}  {:>6} h  {:>12}  {}",
            booking.short_id().dimmed(),
            booking.date,
            cell(&format!("{}{}", booking.student_name, guest), NAME_WIDTH),
            booking.start_time,
            booking.end_time,
            format_amount(booking.hours),
            money(currency, booking.total_amount),
            status
        );
    }
    print_page_footer(page);
}

fn print_invoices(page: &Page<Record<Invoice>>, currency: &str) {
    if page.items.is_empty() {
        println!("No invoices found.");
    }
    for invoice in &page.items {
        println!(
            "  {}  {}  {}  {}  {:>12}  {}",
            invoice.short_id().dimmed(),
            cell(&invoice.invoice_number, 18),
            invoice.date,
            cell(&invoice.student_name, NAME_WIDTH),
            money(currency, invoice.amount),
            invoice_status(invoice.status)
        );
    }
    print_page_footer(page);
}

fn invoice_status(status: InvoiceStatus) -> ColoredString {
    match status {
        InvoiceStatus::Paid => status.as_str().green(),
        InvoiceStatus::Pending => status.as_str().yellow(),
        InvoiceStatus::Overdue => status.as_str().red(),
    }
}

/// Plain text printout of one invoice.
fn print_invoice(invoice: &Invoice, currency: &str) {
    if !invoice.is_printable() {
        print_messages(&[CmdMessage::warning(
            "This invoice has no line items and cannot be printed",
        )]);
        return;
    }
    println!("{}", "INVOICE".bold());
    println!("Number:  {}", invoice.invoice_number);
    println!("Date:    {}", invoice.date);
    println!("Bill to: {}", invoice.student_name);
    println!("Status:  {}", invoice_status(invoice.status));
    println!();
    println!(
        "  {}  {:>8}  {:>12}  {:>12}",
        cell("Description", WIDE_WIDTH + 14),
        "Hours",
        "Rate",
        "Amount"
    );
    for item in &invoice.items {
        println!(
            "  {}  {:>8}  {:>12}  {:>12}",
            cell(&item.description, WIDE_WIDTH + 14),
            format_amount(item.hours),
            money(currency, item.rate),
            money(currency, item.amount())
        );
    }
    println!();
    println!("  Total: {}", money(currency, invoice.amount).bold());
}

/// Pads or truncates `s` to exactly `width` terminal columns.
fn cell(s: &str, width: usize) -> String {
    let truncated = truncate_to_width(s, width);
    let padding = width.saturating_sub(truncated.width());
    format!("{}{}", truncated, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}
