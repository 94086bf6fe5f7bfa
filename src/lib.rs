//! Mead Calculator (meadcalc) Library
//!
//! Gravity, ABV and fermentable planning for mead and wine.

pub mod build_info;
pub mod config;
pub mod error;
pub mod gravity;
pub mod mcp;
pub mod measure;
pub mod models;
pub mod session;
pub mod tools;
