//! The interactive table: query engine, column filter dropdown, key bindings, and the widget.
pub mod bindings;
pub mod filter;
pub mod query;
pub mod view;

pub use bindings::DataTableBindings;
pub use bindings::TableCommand;
pub use query::PageInfo;
pub use query::SortDir;
pub use query::SortSpec;
pub use query::TableQuery;
pub use view::DataTableAction;
pub use view::DataTableCellContext;
pub use view::DataTableOptions;
pub use view::DataTableView;
