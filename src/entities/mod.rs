//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod profile;
pub mod subscription;

// Re-export specific types to avoid conflicts
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
pub use subscription::{
    BillingCycle, Column as SubscriptionColumn, Entity as Subscription,
    Model as SubscriptionModel, Status,
};
