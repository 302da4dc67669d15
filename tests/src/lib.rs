//! # Kiosk Test Suite
//!
//! Whole-session tests: the real session controller driving the runtime's
//! simulated devices and in-memory bank, one customer script per test.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── harness.rs      # Kiosk under test, customer helpers
//! │   ├── sessions.rs     # Customer journeys that succeed
//! │   ├── deposits.rs     # Cash sensor vs. display race, refunds
//! │   └── faults.rs       # Device and bank faults end to end
//! └── benches/
//!     └── session_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p kiosk-tests
//! cargo test -p kiosk-tests integration::faults::
//! cargo bench -p kiosk-tests
//! ```
