pub mod json;
pub mod key_value;
