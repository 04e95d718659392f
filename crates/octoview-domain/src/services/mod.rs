//! Domain services.

pub mod session;
