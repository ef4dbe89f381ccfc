// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for the type-ahead engine
//!
//! These types are shared between the engine core, the search service
//! clients and the hosts that embed an autocomplete field. They carry no
//! presentation concerns.

pub mod binding;
pub mod candidate;
pub mod error;
pub mod record_type;
pub mod request;

// Re-export commonly used types
pub use binding::*;
pub use candidate::*;
pub use error::*;
pub use record_type::*;
pub use request::*;
