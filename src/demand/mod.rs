//! # Demand tracking for backpressure.
//!
//! This module provides [`DemandController`], the per-subscription counter
//! of outstanding requested items. Every `Next` delivery consumes one unit;
//! units are replenished only by explicit consumer requests.

mod controller;

pub use controller::DemandController;
