// SPDX-License-Identifier: MIT

//! Reasoning-service layer: model trait, backends and the shared error type

pub mod error;
pub mod factory;
pub mod model;

pub use error::{ModelError, QualifierError, Result};
