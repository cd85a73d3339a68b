//! # Engine Module
//!
//! The stateful layer of the group algebra.
//!
//! ## Overview
//!
//! A [`registry::GroupRegistry`] is the system of record for every group command a script
//! emits. It owns its operations in an arena, preserves their insertion order, and keeps
//! names unique. Primitive operations are built directly through its factory methods;
//! composite expressions built with `+`, `-` and `*` are lowered into primitive commands by
//! [`registry::GroupRegistry::evaluate`].
//!
//! ## Architecture
//!
//! - **Registry** ([`registry`]) - Factories, CRUD, lookup, and command emission
//! - **Evaluation** ([`evaluate`]) - Depth-first lowering of unevaluated expressions
//! - **Definitions** ([`definitions`]) - Loading and saving registries as TOML group definitions
//! - **Error Handling** ([`error`]) - Registry error types

pub mod definitions;
pub mod error;
pub mod evaluate;
pub mod registry;
