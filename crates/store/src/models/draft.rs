//! Shipping-address draft domain type.

use serde::{Deserialize, Serialize};

/// A shipping-address draft, saved incrementally while the user fills in the
/// checkout form. All fields are optional; only present fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ShippingDraft {
    /// Whether no field is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address1.is_none()
            && self.address2.is_none()
            && self.city.is_none()
            && self.postal_code.is_none()
            && self.note.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_present_fields_serialize() {
        let draft = ShippingDraft {
            full_name: Some("Som Chai".to_string()),
            city: Some("Bangkok".to_string()),
            ..ShippingDraft::default()
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "fullName": "Som Chai", "city": "Bangkok" })
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored_on_decode() {
        // Stored drafts carry bookkeeping fields this type does not model
        let json = serde_json::json!({
            "fullName": "Som Chai",
            "postalCode": "10110",
            "updatedAt": "2024-11-05T09:30:00Z",
            "migratedFrom": "anon-uid"
        });
        let draft: ShippingDraft = serde_json::from_value(json).unwrap();
        assert_eq!(draft.postal_code.as_deref(), Some("10110"));
    }

    #[test]
    fn test_is_empty() {
        assert!(ShippingDraft::default().is_empty());
        let draft = ShippingDraft {
            note: Some("leave at door".to_string()),
            ..ShippingDraft::default()
        };
        assert!(!draft.is_empty());
    }
}
