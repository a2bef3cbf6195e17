//! # Back-office Client
//!
//! Async access to the record store with client-side joins.
//!
//! ```rust,ignore
//! use backoffice_client::{FetchScope, HttpRecordStore, ResourceClient};
//!
//! let client = ResourceClient::new(HttpRecordStore::with_base_url("http://localhost:3001"));
//! let scope = FetchScope::new();
//!
//! // `customer_name` is resolved from `users.full_name`.
//! if let Some(orders) = scope.run(client.orders()).await? {
//!     println!("{} orders", orders.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod common;
pub mod http;
pub mod resource;
pub mod scope;
pub mod store;

pub use common::{create_http_client, handle_http_error};
pub use http::HttpRecordStore;
pub use resource::ResourceClient;
pub use scope::FetchScope;
pub use store::{Filters, RecordStore};
