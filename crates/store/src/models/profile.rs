//! User profile domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chouxlab_core::Uid;

/// The `users/{uid}` profile document.
///
/// Base identity fields are merged-into on every sign-in; `points` and
/// `total_orders` are stitched on first creation and maintained by the order
/// flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: Uid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Capitalized `URL` on the wire, following the identity provider's
    /// field name.
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub total_orders: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Caller-supplied profile fields not sourced from the identity provider.
#[derive(Debug, Clone, Default)]
pub struct ProfileExtra {
    pub phone: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_wire_field_names() {
        let json = serde_json::json!({
            "uid": "abc123",
            "email": "user@example.com",
            "displayName": "Som Chai",
            "photoURL": "https://example.com/p.jpg",
            "phone": null,
            "points": 40,
            "totalOrders": 3,
            "createdAt": "2024-11-05T09:30:00Z",
            "updatedAt": "2024-12-01T10:00:00Z"
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();

        assert_eq!(profile.uid.as_str(), "abc123");
        assert_eq!(profile.photo_url.as_deref(), Some("https://example.com/p.jpg"));
        assert_eq!(profile.total_orders, 3);
    }

    #[test]
    fn test_counters_default_to_zero() {
        let json = serde_json::json!({
            "uid": "abc123",
            "email": null,
            "displayName": null,
            "photoURL": null,
            "phone": null,
            "createdAt": null,
            "updatedAt": null
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.points, 0);
        assert_eq!(profile.total_orders, 0);
    }
}
