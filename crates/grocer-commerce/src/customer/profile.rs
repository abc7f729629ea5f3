//! Customer profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checkout::DeliveryDestination;
use crate::error::CommerceError;
use crate::ids::UserId;

/// City assumed for non-student addresses when none is given.
pub const DEFAULT_CITY: &str = "Lusaka";

/// A geographic position captured by the location picker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point, checking coordinate ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CommerceError> {
        let point = Self {
            latitude,
            longitude,
        };
        if point.is_valid() {
            Ok(point)
        } else {
            Err(CommerceError::Validation(format!(
                "coordinates out of range: {}, {}",
                latitude, longitude
            )))
        }
    }

    fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Where a customer lives, which decides where orders are delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "userType", rename_all = "kebab-case")]
pub enum Residence {
    /// Student in a campus hostel or boarding area.
    #[serde(rename_all = "camelCase")]
    Student {
        university: String,
        hostel: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },
    /// Off-campus customer with a street address.
    #[serde(rename_all = "camelCase")]
    NonStudent {
        address: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        landmark: Option<String>,
        township: String,
        #[serde(default)]
        city: String,
    },
}

impl Residence {
    /// "student" or "non-student".
    pub fn user_type(&self) -> &'static str {
        match self {
            Residence::Student { .. } => "student",
            Residence::NonStudent { .. } => "non-student",
        }
    }

    /// One-line description for delivery slips.
    pub fn describe(&self) -> String {
        DeliveryDestination::from(self).describe()
    }
}

/// A stored customer profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Same id as the authentication provider's user.
    pub id: UserId,
    /// Display name.
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(flatten)]
    pub residence: Residence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Whether this customer registered as a student.
    pub fn is_student(&self) -> bool {
        matches!(self.residence, Residence::Student { .. })
    }
}

/// Profile details submitted at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(flatten)]
    pub residence: Residence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl NewProfile {
    /// Display name derived from first and last name.
    pub fn username(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Fill in defaults: trims text and sets an empty city to `default_city`.
    pub fn normalized(mut self, default_city: &str) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone_number = self.phone_number.trim().to_string();
        if let Residence::NonStudent { city, .. } = &mut self.residence {
            if city.trim().is_empty() {
                *city = default_city.to_string();
            }
        }
        self
    }

    /// Check the profile against the registration rules.
    ///
    /// All problems are reported together.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let mut problems = Vec::new();

        if self.first_name.trim().chars().count() < 2 {
            problems.push("first name is required".to_string());
        }
        if self.last_name.trim().chars().count() < 2 {
            problems.push("last name is required".to_string());
        }
        if !is_email(self.email.trim()) {
            problems.push("invalid email address".to_string());
        }
        if self.phone_number.trim().chars().count() < 10 {
            problems.push("please enter a valid phone number".to_string());
        }

        match &self.residence {
            Residence::Student {
                university, hostel, ..
            } => {
                if university.trim().is_empty() {
                    problems.push("please select your university".to_string());
                }
                if hostel.trim().is_empty() {
                    problems.push("hostel is required".to_string());
                }
            }
            Residence::NonStudent {
                address, township, ..
            } => {
                if address.trim().chars().count() < 5 {
                    problems.push("please enter a valid address".to_string());
                }
                if township.trim().is_empty() {
                    problems.push("please select a township".to_string());
                }
            }
        }

        if let Some(point) = &self.location {
            if !point.is_valid() {
                problems.push("coordinates out of range".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::Validation(problems.join("; ")))
        }
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
