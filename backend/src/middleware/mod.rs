//! Request middleware.
//!
//! Purpose: cross-cutting request lifecycle concerns. Currently request
//! correlation through [`Trace`].

pub mod trace;

pub use trace::Trace;
