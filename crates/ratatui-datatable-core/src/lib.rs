//! `ratatui-datatable-core` provides the data side and the widget of a selectable data table for
//! terminal UIs.
//!
//! Records coming from a host are untrusted: they may repeat identities or carry the wrong
//! fields. [`sanitize::Sanitizer`] reduces them to unique rows that match a
//! [`schema::ColumnSchema`], and [`selection::SelectionTracker`] keeps the user's row selection in
//! step with those rows.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you drive input + rendering from your app.
//! - No async runtime: everything runs on the main thread.
//! - Selection is reported, not acted on: register a callback with
//!   [`datatable::DataTableView::on_select`] and decide what to do with the rows.
//!
//! ## Getting started
//!
//! Most users should depend on the facade crate `ratatui-datatable`. Use this crate directly if
//! you only need the primitives.
//!
//! Useful entry points:
//! - [`sanitize::sanitize`]: dedup + schema check of a record slice.
//! - [`selection::SelectionTracker`]: selection state with a change callback.
//! - [`datatable::DataTableView`]: the table widget with search, filters, sorting, and paging.
//! - [`config::DataTableConfig`]: behaviour flags, parsable from partial JSON.
pub mod theme;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod render;
pub mod viewport;

pub mod input;
pub mod keymap;

pub mod record;
pub mod sanitize;
pub mod schema;
pub mod selection;

pub mod config;
pub mod datatable;
pub mod store;

pub use config::DataTableConfig;
pub use record::Record;
pub use record::RecordId;
pub use record::Row;
pub use record::Value;
pub use sanitize::KeyMatch;
pub use sanitize::Sanitizer;
pub use schema::Column;
pub use schema::ColumnSchema;
pub use selection::SelectionTracker;
