//! Wire and session data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Account role as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(Role::Citizen),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Authenticated identity cached after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub user_id: String,
}

/// Complaint lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    #[serde(rename = "In-Progress")]
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In-Progress",
            ComplaintStatus::Resolved => "Resolved",
        }
    }

    /// CSS class suffix, the lower-cased wire value.
    pub fn css_class(&self) -> String {
        format!("status-{}", self.as_str().to_lowercase())
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown status '{}'. Use: Pending, In-Progress, Resolved", s))
    }
}

/// Denormalized citizen identity attached to admin listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitizenRef {
    pub name: String,
    pub email: String,
}

/// The `citizenId` field is a populated profile in admin listings and a
/// bare id elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CitizenField {
    Profile(CitizenRef),
    Id(String),
}

/// Complaint record owned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ComplaintStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "imagePath", default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(rename = "citizenId", default, skip_serializing_if = "Option::is_none")]
    pub citizen: Option<CitizenField>,
}

impl Complaint {
    /// Populated citizen profile, if the service sent one.
    pub fn citizen(&self) -> Option<&CitizenRef> {
        match &self.citizen {
            Some(CitizenField::Profile(profile)) => Some(profile),
            _ => None,
        }
    }

    /// Last four characters of the id.
    pub fn short_id(&self) -> String {
        let count = self.id.chars().count();
        self.id.chars().skip(count.saturating_sub(4)).collect()
    }
}

/// Registration form contents.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login form contents.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Error body shape shared by every endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub msg: Option<String>,
}

/// Status-only update body.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: ComplaintStatus,
}

/// Image file attached to a new complaint.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Complaint submission form contents.
#[derive(Debug, Clone, Default)]
pub struct NewComplaint {
    pub title: String,
    pub category: String,
    pub location: String,
    pub description: String,
    /// Additional free-text form fields, sent as-is.
    pub fields: BTreeMap<String, String>,
    pub image: Option<ImageAttachment>,
}

impl NewComplaint {
    /// Text fields in submission order.
    pub fn text_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("title".to_string(), self.title.clone()),
            ("category".to_string(), self.category.clone()),
            ("location".to_string(), self.location.clone()),
            ("description".to_string(), self.description.clone()),
        ];
        fields.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        fields
    }
}
