//! Project store and Gantt/calendar timeline engine.
//!
//! [`store::Store`] holds projects and their timeline entries and keeps each
//! project in step with its project-level entry. [`timeline`] turns a view
//! mode and anchor date into a window of days, and lays entries out over it
//! as grid cells or continuous bars. [`app::App`] ties the store to a
//! [`backend::Backend`] and the user's view state.

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod model;
pub mod sample;
pub mod stats;
pub mod store;
pub mod timeline;

pub use app::{App, Status, TimelineLayout};
pub use error::{Error, Result};
pub use store::Store;
