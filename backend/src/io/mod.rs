//! # IO Module
//!
//! Adapter layer between the desktop shell and the domain. The shell talks
//! JSON over a local HTTP connection; handlers translate requests into
//! controller calls and domain errors into status codes.

pub mod rest;

pub use rest::*;
