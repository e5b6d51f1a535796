//! Core types and the identity/authorization pipeline for the Quire notes
//! service.
//!
//! This crate has no HTTP or database dependencies. Storage
//! backends implement [`store::TenantStore`]; transports hand request metadata
//! to [`pipeline::Pipeline`], which extracts, resolves and authorizes an
//! identity before any tenant data is touched.

pub mod error;
pub mod extract;
pub mod gateway;
pub mod id;
pub mod note;
pub mod organization;
pub mod permission;
pub mod pipeline;
pub mod provision;
pub mod resolve;
pub mod store;
pub mod user;

#[cfg(test)]
mod testing;

pub use error::{Error, ErrorKind, Result};
pub use id::ObjectId;
