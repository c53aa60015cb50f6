//! # Repository Implementations
//!
//! One repository per aggregate. Each is a thin, cloneable struct over the
//! shared pool; writes that need atomicity (rental upserts, notification
//! dedupe) run inside a single SQL statement or database transaction.

pub mod cart;
pub mod game;
pub mod notification;
pub mod profile;
pub mod subscription;
pub mod transaction;
