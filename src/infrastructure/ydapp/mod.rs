//! Client for the ydapp utility portal (`ydapp.bjut.edu.cn`).

pub mod client;

pub use client::YdappClient;
