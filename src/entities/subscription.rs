//! Subscription entity - One recurring service a user pays for.
//!
//! `status` and `days_remaining` are derived from `expiry_date` and the current
//! date. They are stored only so the store can filter and sort on them; every
//! write recomputes them and readers relabel from `expiry_date`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    /// Opaque identifier (UUID v4), assigned at creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owner's user id
    pub user_id: String,
    /// Display name (e.g., "Netflix Premium")
    pub name: String,
    /// Free-text category label
    pub category: String,
    /// Numeric part of the price as entered, no currency math is done on it
    pub price: String,
    /// Currency tag shown in front of the price (e.g., "$", "HK$")
    pub currency: String,
    /// Informational billing cadence
    pub billing_cycle: BillingCycle,
    /// First day of the subscription
    pub start_date: Date,
    /// Last day the subscription is paid for
    pub expiry_date: Date,
    /// Derived status, recomputed on every write
    pub status: Status,
    /// Derived days until expiry, negative once expired
    pub days_remaining: i64,
    /// Icon tag for display
    pub icon: String,
    /// Optional free-text notes
    pub notes: Option<String>,
    /// Optional URL where the subscription can be renewed
    pub renewal_link: Option<String>,
    /// Creation timestamp
    pub created_at: DateTimeUtc,
    /// Last modification timestamp
    pub updated_at: DateTimeUtc,
}

/// Expiry status of a subscription.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// More than a week left
    #[sea_orm(string_value = "active")]
    Active,
    /// Expires within the next week (or today)
    #[sea_orm(string_value = "expiring")]
    Expiring,
    /// Expiry date is in the past
    #[sea_orm(string_value = "expired")]
    Expired,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Expiring => "expiring",
            Self::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// Billing cadence. Informational only, it never drives renewal dates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    /// Billed every month
    #[default]
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Billed every year
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => f.write_str("monthly"),
            Self::Yearly => f.write_str("yearly"),
        }
    }
}

/// Defines relationships between Subscription and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each subscription belongs to one profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
