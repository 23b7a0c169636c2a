//! Priority-aware rolling-blackout planner for distribution feeders.
//!
//! Areas hang off feeders, are classified into priority tiers from their
//! facilities and population, and are cut hour by hour whenever demand
//! exceeds the available supply. Critical areas are never cut and the burden
//! rotates across lower-priority areas between schedule generations.

pub mod api;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod optimizer;
pub mod power_flow;
pub mod repo;
pub mod telemetry;
