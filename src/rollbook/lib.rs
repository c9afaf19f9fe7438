//! # Rollbook Architecture
//!
//! Rollbook is a **UI-agnostic management core** for a small coaching academy: its
//! student roster, daily attendance, hourly turf bookings and the invoices those
//! bookings produce. It is a library that happens to have a CLI client.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands and derived views              │
//! │  - Reads come from the Roster (state.rs)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Mutations: save, status changes, attendance marks        │
//! │  - Pure logic lives beside it: view, attendance, billing,   │
//! │    report                                                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait over untyped documents                   │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! │  - LiveStore: push-based snapshots to subscribers           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! Nothing derived is ever stored. Day summaries, revenue, pending amounts and
//! list pages are recomputed from the latest collection snapshots on every read.
//! A write goes to the store first; the roster only changes once the store's
//! feed delivers the new snapshot.
//!
//! Names are copied onto attendance records, bookings and invoices when they are
//! created. Renaming a student later does not touch them.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code:
//! - Takes regular Rust function arguments
//! - Returns regular Rust types (`Result<CmdResult>`, `Page<T>`, `Dashboard`)
//! - **Never** writes to stdout/stderr (diagnostics go through `tracing`)
//! - **Never** calls `std::process::exit`
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Mutating operations, one module per collection
//! - [`view`]: Search and pagination for every list screen
//! - [`attendance`]: Per-day attendance summaries
//! - [`billing`]: Booking hours, totals, status lifecycle and invoice generation
//! - [`report`]: Revenue, pending and invoice totals
//! - [`state`]: Latest snapshot of each collection
//! - [`store`]: Storage abstraction, backends and the live feed
//! - [`model`]: Record types
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod attendance;
pub mod billing;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod state;
pub mod store;
pub mod view;
