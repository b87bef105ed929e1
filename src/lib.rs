pub mod api;
pub mod api_client;
pub mod config;
pub mod csv_store;
pub mod domain;
pub mod errors;
pub mod format;
pub mod infra;
pub mod logging;
pub mod usecases;
pub mod view;

#[cfg(test)]
mod tests;
