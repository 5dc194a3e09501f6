pub mod body;
pub mod summary;
