//! Service layer: one module per subsystem.
//!
//! Route handlers stay thin; everything that touches SQL lives here. The
//! registry is the single source of truth for which identifiers may appear
//! in dynamically-built statements.

pub mod accounts;
pub mod audit;
pub mod records;
pub mod registry;
pub mod schema;
