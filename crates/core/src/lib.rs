//! Domain core for the course catalog admin backend: schemas, the document
//! store contract with its backends, and the course/page services.

pub mod course;
pub mod document;
pub mod error;
pub mod mutation;
pub mod page;
pub mod params;
pub mod stats;
pub mod store;

pub use error::{CoreError, CoreResult};
