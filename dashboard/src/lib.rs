//! Trip dashboard core: session, role-gated navigation, record lists with
//! date search and paging, create/edit forms and CSV export.

pub mod backend;

pub use backend::{initialize_backend, DashboardContext, DashboardError};
