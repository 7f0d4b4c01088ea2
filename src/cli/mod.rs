//! # CLI Module
//!
//! Command-line access to a CORS policy, for checking a configuration
//! before it ships.
//!
//! ## Commands
//!
//! ### `policy`
//!
//! Load a config file (with `CORSGATE_*` overrides), normalize it, and print
//! the resulting policy:
//!
//! ```bash
//! corsgate policy --config config/cors.yaml
//! ```
//!
//! ### `check`
//!
//! Run one request through the middleware chain and print the decision,
//! whether the inner handler ran, and the final response headers:
//!
//! ```bash
//! corsgate check --config config/cors.yaml \
//!     --method OPTIONS \
//!     -H "Origin: https://app.example.com" \
//!     -H "Access-Control-Request-Method: PUT"
//! ```
//!
//! A configuration error (e.g. no origins) exits non-zero.

mod commands;


pub use commands::{run, run_cli, Cli, Commands};
