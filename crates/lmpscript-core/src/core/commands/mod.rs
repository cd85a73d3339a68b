//! # Commands Module
//!
//! Rendering of primitive operations into simulator command lines.
//!
//! The exact keywords (`group`, `type`, `union`, ...) belong to the simulator's scripting
//! language, so they are collected in a [`vocabulary::Vocabulary`] that can be loaded from a
//! TOML file when a dialect differs from the LAMMPS defaults.

pub mod vocabulary;
