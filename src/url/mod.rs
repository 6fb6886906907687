//! URL handling module for Sumi-Mirror
//!
//! Turns the raw attribute values the link scan produces into absolute URLs.

mod resolve;

pub use resolve::{resolve, resolve_against};
