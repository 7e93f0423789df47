//! Utility types shared across the service.
//!
//! - [`literal_or_env`] - Config values that may reference environment variables
//! - [`native_amount`] - Decimal coin amounts and their base-unit conversion
//! - [`sig_down`] - Graceful shutdown signal handling
//! - [`telemetry`] - Tracing subscriber and OpenTelemetry setup

pub mod literal_or_env;
pub mod native_amount;
pub mod sig_down;
pub mod telemetry;

pub use literal_or_env::*;
pub use native_amount::*;
pub use sig_down::*;
pub use telemetry::*;
