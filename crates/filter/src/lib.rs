//! Filter predicates over JSON documents.
//!
//! A [`Filter`] is built by the query layer and handed to a document store,
//! which either evaluates it in memory ([`eval::matches`]) or renders it into
//! its own query language.

pub mod ast;
pub mod eval;
pub mod path;

pub use ast::Filter;
pub use path::FieldPath;
