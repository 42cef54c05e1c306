//! # Domain Models
//!
//! Pure data shared by the kernel, the subapps and the applications.
//! Keep it lean: no I/O, networking, or heavy logic, just data and simple helpers.

pub mod command;
pub mod config;
pub mod constants;
pub mod module;
