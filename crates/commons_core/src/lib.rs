pub mod aggregate;
pub mod config;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod ingest;
pub mod matrix;
pub mod schema;
