#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Shared test helpers used across unit and integration suites.
//! Layout: fixtures.rs (sample tracks and settings), mocks.rs (scripted gateways).

pub mod fixtures;
pub mod mocks;

pub use mocks::{FakeAccounts, FakeBackend, ReorderCall};
