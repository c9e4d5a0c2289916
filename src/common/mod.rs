//! Utilities shared by the package engine and the XML compatibility layer.

pub mod xml;
