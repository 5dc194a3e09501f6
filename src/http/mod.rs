pub mod builder;
pub mod client;
pub mod dispatcher;
pub mod headers;
pub mod normalize;
pub mod runner;
pub mod transport;
