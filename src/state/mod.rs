pub mod collection;
pub mod query_cache;
pub mod request_state;
pub mod response_state;
pub mod store;
pub mod workspace;
