pub mod aggregate;
pub mod aws;
pub mod config;
pub mod error;
pub mod formatter;
pub mod guard;
pub mod models;
pub mod notify;
pub mod period;
pub mod report;

#[cfg(test)]
pub mod testing;
