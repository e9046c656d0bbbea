//! Integration tests for grove

mod config_integration;
mod facade_operations;
mod filters;
mod hydration;
mod round_trip;
mod test_utils;
