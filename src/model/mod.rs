pub mod employee;
pub mod ledger;
pub mod notification;
pub mod punch;
pub mod schedule;
pub mod shift;
pub mod side;
