//! `ratatui-datatable` is a data table widget for ratatui with row selection, column dropdown
//! filters, search, sorting, and paging.
//!
//! The building blocks live in `ratatui-datatable-core` and are re-exported here. This crate adds
//! the [`help::HelpBar`] for listing key hints next to the table.
//!
//! ```no_run
//! use ratatui_datatable::ColumnSchema;
//! use ratatui_datatable::DataTableConfig;
//! use ratatui_datatable::Record;
//! use ratatui_datatable::datatable::DataTableView;
//!
//! let schema: ColumnSchema = [("id", "ID"), ("name", "Name")].into_iter().collect();
//! let mut table = DataTableView::new(schema, DataTableConfig::default());
//! table.set_records(Some(vec![Record::new().with("id", 1).with("name", "John Doe")]));
//! table.on_select(|rows| println!("{} selected", rows.len()));
//! ```
pub use ratatui_datatable_core::config;
pub use ratatui_datatable_core::datatable;
pub use ratatui_datatable_core::input;
pub use ratatui_datatable_core::keymap;
pub use ratatui_datatable_core::record;
pub use ratatui_datatable_core::render;
pub use ratatui_datatable_core::sanitize;
pub use ratatui_datatable_core::schema;
pub use ratatui_datatable_core::selection;
pub use ratatui_datatable_core::store;
pub use ratatui_datatable_core::theme;
pub use ratatui_datatable_core::viewport;

#[cfg(feature = "crossterm")]
pub use ratatui_datatable_core::crossterm_input;

pub use ratatui_datatable_core::Column;
pub use ratatui_datatable_core::ColumnSchema;
pub use ratatui_datatable_core::DataTableConfig;
pub use ratatui_datatable_core::KeyMatch;
pub use ratatui_datatable_core::Record;
pub use ratatui_datatable_core::RecordId;
pub use ratatui_datatable_core::Row;
pub use ratatui_datatable_core::Sanitizer;
pub use ratatui_datatable_core::SelectionTracker;
pub use ratatui_datatable_core::Value;

pub mod help;
