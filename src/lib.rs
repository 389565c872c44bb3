//! HTTP service that stores uploaded images in an object store and their
//! metadata in a document database.

mod aws;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod metadata;
pub mod model;
pub mod routes;
pub mod server;
pub mod storage;
