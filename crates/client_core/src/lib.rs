//! Client-side data binding for list and detail screens backed by a REST API.
//!
//! [`ListController`] and [`DataController`] own the loading/error/data state a
//! screen renders, and guarantee that only the most recently issued request
//! can change it.

pub mod abort;
pub mod data_controller;
pub mod debounce;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod list_controller;

pub use abort::{abort_pair, AbortHandle, AbortSignal};
pub use data_controller::{DataController, DataState};
pub use error::{FetchError, GENERIC_ERROR_MESSAGE};
pub use fetcher::{DataFetcher, FnDataFetcher, FnListFetcher, ListFetcher};
pub use http::HttpListFetcher;
pub use list_controller::{ListController, ListControllerConfig, ListState};
