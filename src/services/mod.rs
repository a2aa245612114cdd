//! Business logic services

pub mod ledger;
pub mod spin;
