//! # Back-office Core
//!
//! Building blocks for e-commerce admin screens: a generic data grid engine,
//! client-side join resolution and a JSON document record store.
//!
//! ## Features
//!
//! - **Grid engine**: search, per-column filters, stable kind-aware sorting,
//!   pagination and id-keyed selection over any list of records
//! - **Joins**: denormalise foreign display fields (`customer_name`,
//!   `"Clothing > Shirts"`) and embed child collections
//! - **Record store**: `db.json`-style collections with atomic file
//!   persistence and a password-change operation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use backoffice_core::grid::{infer_columns, GridEngine, GridOptions};
//! use backoffice_core::join::{presets, resolve_joins, ForeignTables};
//! use backoffice_core::Database;
//!
//! let db = Database::open("db.json", false)?;
//! let orders = db.list("orders", &[])?;
//!
//! let mut tables = ForeignTables::new();
//! tables.insert("users".into(), db.list("users", &[])?);
//! let orders = resolve_joins(&orders, &[presets::order_customer()], &tables);
//!
//! let columns = infer_columns(&orders);
//! let mut grid = GridEngine::new(orders, columns, GridOptions::default())?;
//! grid.set_search_text("unknown customer");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod grid;
pub mod join;
pub mod record;
pub mod store;

pub use config::{
    BackofficeConfig, ClientConfig, ConfigError, GridConfig, LoggingConfig, ServerConfig,
    StoreConfig,
};
pub use error::{Error, Result};
pub use grid::{ColumnDescriptor, GridEngine, GridEvent, GridOptions, SortDirection, ValueKind};
pub use join::{EmbedSpec, JoinSpec};
pub use record::{Record, RecordId};
pub use store::Database;
