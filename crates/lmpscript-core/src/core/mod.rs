//! # Core Module
//!
//! This module provides the stateless building blocks of the group algebra: the
//! expression data model, the naming utility, and the command vocabulary.
//!
//! ## Architecture
//!
//! - **Expression Model** ([`models`]) - Operators, operands, literal values, and the
//!   `Operation` node with its algebraic composition rules
//! - **Command Rendering** ([`commands`]) - The simulator keyword vocabulary and the
//!   rendering of primitive operations into command lines
//! - **Utilities** ([`utils`]) - Deterministic content-addressed naming
//!
//! Nothing in this module owns state shared between expressions; registration and
//! lowering live in [`crate::engine`].

pub mod commands;
pub mod models;
pub mod utils;
