//! Infragram Core Types and Definitions
//!
//! This crate provides the backend-agnostic pieces of an Infragram diagram:
//!
//! - **Identifiers**: String-interned entity ids ([`identifier::Id`])
//! - **Colors**: CSS color parsing and hex output ([`color::Color`])
//! - **Geometry**: Points, sizes, bounds and insets ([`geometry`] module)
//! - **Kinds**: The closed set of component categories ([`kind::Kind`])
//! - **Schema**: The diagram intermediate representation ([`schema`] module)
//! - **Registry**: Kind → per-backend rendering attributes ([`registry`] module)

pub mod color;
pub mod error;
pub mod geometry;
pub mod identifier;
pub mod kind;
pub mod registry;
pub mod schema;
pub mod stroke;
