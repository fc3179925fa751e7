//! Market data provider implementations

pub mod http;

pub use http::HttpProvider;
