//! Core types shared across dbsnap facilities
//!
//! This crate holds the canonical field keys and event names used by the
//! logging macros and the error facility, so every crate emits the same
//! structured shape.

pub mod schema;
