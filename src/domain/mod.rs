pub mod balance;
pub mod errors;
pub mod metric;
pub mod ports;
