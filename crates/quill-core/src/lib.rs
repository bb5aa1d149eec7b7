//! # Quill Core
//!
//! The domain layer of the Quill blog API.
//! Posts, their validation rules, and the ports every storage backend implements.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
