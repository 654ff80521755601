//! # Features
//!
//! Feature modules built on top of the core bot plumbing.

pub mod reminders;
