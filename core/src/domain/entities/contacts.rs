//! Contact details a student can be verified through.

use serde::{Deserialize, Serialize};

/// Raw contact values held by the record store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Mobile number as stored, unnormalized
    pub mobile: Option<String>,

    /// Email address
    pub email: Option<String>,
}

/// Contacts plus per-channel verification status, as shown to the student
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationContacts {
    pub contacts: ContactDetails,
    pub mobile_verified: bool,
    pub email_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_interface_field_names() {
        let contacts = VerificationContacts {
            contacts: ContactDetails {
                mobile: Some("9035550142".to_string()),
                email: None,
            },
            mobile_verified: true,
            email_verified: false,
        };

        let json = serde_json::to_value(&contacts).unwrap();
        assert_eq!(json["contacts"]["mobile"], "9035550142");
        assert!(json["contacts"]["email"].is_null());
        assert_eq!(json["mobileVerified"], true);
        assert_eq!(json["emailVerified"], false);
    }
}
