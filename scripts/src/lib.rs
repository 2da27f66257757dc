//! Scripts for deploying and wiring together the marketplace smart contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod backend;
pub mod cli;
mod commands;
pub mod constants;
pub mod deployments;
pub mod errors;
pub mod orchestrator;
mod solidity;
pub mod types;
pub mod utils;
