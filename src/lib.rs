//! roster - student and course REST service over a document store

pub mod cli;
pub mod config;
pub mod http;
pub mod model;
pub mod schema;
pub mod service;
pub mod store;
