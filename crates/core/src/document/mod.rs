pub mod id;
pub mod model;
pub mod status;
pub mod validate;
