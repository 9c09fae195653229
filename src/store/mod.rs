//! Per-entity persistence. Every read here filters `is_deleted = FALSE`;
//! callers never re-check the flag. Functions take an executor so they can
//! run against the pool or inside a transaction.

pub mod answers;
pub mod attempts;
pub mod exams;
pub mod questions;
