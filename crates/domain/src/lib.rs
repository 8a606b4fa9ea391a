//! # ipadha-domain
//!
//! Pure domain model for the ipadha touch dashboard.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, typed identifiers
//! - Define **Entity ids** (`domain.object_id`) and their validation
//! - Define **Entity snapshots** as delivered by the hub (state + attributes)
//! - Define **Levels**: slider percentages and hub brightness, with the
//!   conversions between them
//! - Define **Service calls** (`light.turn_on`, `switch.toggle`, …) sent to the hub
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod entity;
pub mod level;
pub mod service;
