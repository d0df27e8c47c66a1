//! Shared test helpers for `fieldarc-core` integration tests.
//!
//! These helpers provide reusable fixtures and lightweight mocks so that the
//! tracking tests can focus on behaviour instead of boilerplate.

pub mod feeds;
pub mod listeners;
