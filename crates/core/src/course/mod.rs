pub mod model;
pub mod query;
pub mod service;

pub use model::CourseCard;
pub use query::CourseQuery;
pub use service::CourseService;
