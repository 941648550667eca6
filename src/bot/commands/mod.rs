//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Profile and reminder preference commands
pub mod settings;

/// Subscription management and overview commands
pub mod subscription;

// Export commands
pub use general::*;
pub use settings::*;
pub use subscription::*;
