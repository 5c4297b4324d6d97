// SPDX-License-Identifier: MIT

//! Lead qualification service: workflow, collaborators and HTTP surface

pub mod config;
pub mod server;
pub mod store;
pub mod tools;
pub mod workflow;
