pub mod query;
pub mod render;
pub mod types;
pub mod view;
