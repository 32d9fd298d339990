//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Endpoint, audience, and policy resolution tests
//! - `environment_fallbacks`: Workflow environment fallback tests

mod helpers;
