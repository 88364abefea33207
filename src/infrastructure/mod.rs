pub mod core;
pub mod observability;
pub mod sls;
pub mod ydapp;
