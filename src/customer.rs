//! Customers
//!
//! The signed-in user, their stored profile, and the point-in-time copy of
//! both that is embedded into every order.

use serde::{Deserialize, Serialize};

/// Name used when neither the profile nor the session carries one.
pub const DEFAULT_CUSTOMER_NAME: &str = "Customer";

/// Country used when the profile has none.
pub const DEFAULT_COUNTRY: &str = "India";

/// The authenticated user at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Stable user identifier.
    pub id: String,

    /// Sign-in email.
    pub email: String,

    /// Display name from the identity provider.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SessionUser {
    /// Creates a session user without a display name.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
        }
    }
}

/// Profile details stored for a user; any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Full name, stored under the capitalised `Name` written at sign-up.
    #[serde(rename = "Name")]
    pub name: Option<String>,

    /// Phone number.
    pub phone: Option<String>,

    /// Street address.
    pub address: Option<String>,

    /// City.
    pub city: Option<String>,

    /// Country.
    pub country: Option<String>,

    /// Postal code.
    pub zip: Option<String>,
}

/// Postal address as captured on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street line.
    pub street: String,

    /// City.
    pub city: String,

    /// Country.
    pub country: String,

    /// Postal code.
    pub zip_code: String,
}

/// Customer details copied into an order when it is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    /// Customer name.
    pub name: String,

    /// Contact email.
    pub email: String,

    /// Contact phone, possibly empty.
    pub phone: String,

    /// Delivery address.
    pub address: Address,
}

impl CustomerInfo {
    /// Builds the snapshot, falling back to defaults for anything missing.
    pub fn snapshot(user: &SessionUser, profile: Option<&UserProfile>) -> Self {
        let field = |pick: fn(&UserProfile) -> Option<&String>| {
            profile
                .and_then(pick)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let name = field(|p| p.name.as_ref())
            .or_else(|| {
                user.display_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string());

        Self {
            name,
            email: user.email.clone(),
            phone: field(|p| p.phone.as_ref()).unwrap_or_default(),
            address: Address {
                street: field(|p| p.address.as_ref()).unwrap_or_default(),
                city: field(|p| p.city.as_ref()).unwrap_or_default(),
                country: field(|p| p.country.as_ref())
                    .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
                zip_code: field(|p| p.zip.as_ref()).unwrap_or_default(),
            },
        }
    }
}
