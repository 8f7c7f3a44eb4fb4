// Job catalog: CareerNet aggregation plus single-call reference-data proxies.

pub mod client;
pub mod fetcher;
pub mod handlers;
pub mod models;
pub mod qualification;

pub use client::CatalogError;
