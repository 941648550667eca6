//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions that are not
//! commands themselves.

/// Autocomplete handlers for subscription names, categories, and currencies
pub mod autocomplete;
