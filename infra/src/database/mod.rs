//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management
//! - Verification code and student contact repositories

pub mod connection;
pub mod mysql;

pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlStudentContactRepository, MySqlVerificationCodeRepository};

#[cfg(test)]
mod tests;
