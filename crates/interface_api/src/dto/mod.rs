//! Request and response bodies
//!
//! Stage inputs are accepted as the domain input types directly; the
//! requests here add request-level checks through `validator` before the
//! domain rules run.

pub mod currency;
pub mod vehicle;
pub mod catalog;
