//! Input validation and normalization

pub mod normalize;
pub mod schema;

pub use normalize::normalize;
pub use schema::FieldSet;
