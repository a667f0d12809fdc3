pub mod model;
pub mod query;
pub mod service;

pub use model::{Page, PageType};
pub use query::PageQuery;
pub use service::PageService;
