//! Request handlers

pub mod health;
pub mod currency;
pub mod vehicle;
pub mod stages;
pub mod images;
pub mod catalog;
pub mod dashboard;
