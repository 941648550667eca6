//! Profile entity - Display identity and reminder preferences of a user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// User id supplied by the identity provider (Discord user id)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Optional display nickname
    pub nickname: Option<String>,
    /// Address reminder digests are sent to
    pub email: Option<String>,
    /// Public URL of the avatar image
    pub avatar_url: Option<String>,
    /// Opt-in flag for reminder emails
    pub email_notify: bool,
    /// Lead time in days before expiry at which reminders start
    pub reminder_days: i32,
    /// Creation timestamp
    pub created_at: DateTimeUtc,
    /// Last modification timestamp
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Profile and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One profile owns many subscriptions
    #[sea_orm(has_many = "super::subscription::Entity")]
    Subscriptions,
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
