//! Memory management module for long-term user profiles.
//!
//! This module provides utilities for:
//! - Reading and writing the per-user profile record through a [`KvStore`]
//! - Formatting a profile into the fixed-order block injected into system
//!   prompts
//!
//! One logical record exists per user, at
//! `(namespace = ["memory", user_id], key = "user_memory")`. The record is
//! replaced wholesale after every conversational turn and never deleted here.

use crate::store::KvStore;
use crate::types::{AppError, Result, UserProfile};

/// First namespace component for profile records.
pub const MEMORY_NAMESPACE: &str = "memory";

/// Key of the single profile record within a user's namespace.
pub const PROFILE_KEY: &str = "user_memory";

/// Rendered marker for a user with no stored profile.
///
/// Distinguishable from an empty-but-present profile, which renders the full
/// field block with per-field placeholders.
pub const NO_MEMORY: &str = "None";

/// Reads the stored profile for a user. Absence is a valid state, not an
/// error; a record that fails to deserialize is a store-level failure.
pub async fn load_profile(store: &dyn KvStore, user_id: &str) -> Result<Option<UserProfile>> {
    let namespace = [MEMORY_NAMESPACE, user_id];
    match store.get(&namespace, PROFILE_KEY).await? {
        Some(value) => {
            let profile = serde_json::from_value(value)
                .map_err(|e| AppError::Store(format!("Corrupt profile record: {}", e)))?;
            Ok(Some(profile))
        }
        None => Ok(None),
    }
}

/// Persists a profile, fully replacing the prior snapshot.
pub async fn save_profile(store: &dyn KvStore, user_id: &str, profile: &UserProfile) -> Result<()> {
    let namespace = [MEMORY_NAMESPACE, user_id];
    let value = serde_json::to_value(profile)
        .map_err(|e| AppError::Internal(format!("Failed to serialize profile: {}", e)))?;
    store.put(&namespace, PROFILE_KEY, value).await
}

/// Formats a profile into the fixed-order block used in system prompts.
///
/// Missing fields render their specific placeholder (`Unknown`,
/// `Not provided`, empty join, `None`) rather than a blanket marker; tests
/// depend on these exact strings.
pub fn render_profile(profile: &UserProfile) -> String {
    format!(
        "Name: {}\nAge: {}\nLocation: {}\nInterests: {}\nDislikes: {}\nNotes: {}",
        if profile.user_name.is_empty() {
            "Unknown"
        } else {
            &profile.user_name
        },
        profile.age.as_deref().unwrap_or("Not provided"),
        profile.location.as_deref().unwrap_or("Not provided"),
        profile.interests.join(", "),
        profile.dislikes.join(", "),
        profile.additional_notes.as_deref().unwrap_or("None"),
    )
}

/// Renders an optional profile: the field block when present, [`NO_MEMORY`]
/// when absent.
pub fn render_memory(profile: Option<&UserProfile>) -> String {
    match profile {
        Some(profile) => render_profile(profile),
        None => NO_MEMORY.to_string(),
    }
}
