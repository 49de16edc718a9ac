//! Subscription: a user following a pickup schedule for one address.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{ScheduleId, SubscriptionId, UserId};
use crate::time::{Timestamp, now};

/// How and when a subscriber wants to be reminded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    #[serde(default = "enabled")]
    pub email: bool,
    #[serde(default = "enabled")]
    pub push: bool,
    #[serde(default)]
    pub sms: bool,
    /// Days before a pickup to send a reminder.
    #[serde(default = "default_advance_days", alias = "advance_days")]
    pub advance_days: Vec<u32>,
}

fn enabled() -> bool {
    true
}

fn default_advance_days() -> Vec<u32> {
    vec![1, 7]
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
            advance_days: default_advance_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub address_id: String,
    pub schedule_id: ScheduleId,
    pub notification_preferences: NotificationPreferences,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl Subscription {
    /// Create an active subscription.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when `address_id` is blank.
    pub fn new(
        user_id: UserId,
        address_id: String,
        schedule_id: ScheduleId,
        notification_preferences: Option<NotificationPreferences>,
    ) -> Result<Self, ValidationError> {
        if address_id.trim().is_empty() {
            return Err(ValidationError::MissingField("addressId"));
        }
        Ok(Self {
            id: SubscriptionId::new(),
            user_id,
            address_id,
            schedule_id,
            notification_preferences: notification_preferences.unwrap_or_default(),
            is_active: true,
            created_at: now(),
        })
    }
}
