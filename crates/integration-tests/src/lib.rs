//! Integration tests for Tiffinbox.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! sqlx migrate run --source crates/server/migrations
//!
//! # Start the server
//! cargo run -p tiffinbox-server
//!
//! # Run the ignored integration tests
//! cargo test -p tiffinbox-integration-tests -- --ignored
//! ```
//!
//! Tests live in `tests/` and are `#[ignore]`-gated: they need a running
//! server (`TIFFINBOX_BASE_URL`, default `http://localhost:8000`) and a
//! migrated database. Each test registers its own throwaway accounts with
//! random identifiers, so runs do not interfere with each other.
