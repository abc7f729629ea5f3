//! Delivery details captured on an order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::customer::{GeoPoint, Residence, UserProfile};
use crate::error::CommerceError;

/// When the customer wants the order delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "when", content = "at", rename_all = "lowercase")]
pub enum DeliverySchedule {
    /// As soon as possible.
    #[default]
    Now,
    /// At a chosen date and time.
    #[serde(rename = "scheduled")]
    At(DateTime<Utc>),
}

impl DeliverySchedule {
    /// Reject scheduled times that are already in the past.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), CommerceError> {
        match self {
            DeliverySchedule::At(at) if *at < now => Err(CommerceError::Validation(format!(
                "delivery time {} is in the past",
                at.format("%Y-%m-%d %H:%M")
            ))),
            _ => Ok(()),
        }
    }

    pub fn display(&self) -> String {
        match self {
            DeliverySchedule::Now => "As soon as possible".to_string(),
            DeliverySchedule::At(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

/// Where an order goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeliveryDestination {
    /// Campus hostel room.
    Hostel {
        university: String,
        hostel: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },
    /// Street address.
    Address {
        address: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        landmark: Option<String>,
        township: String,
        city: String,
    },
}

impl From<&Residence> for DeliveryDestination {
    fn from(residence: &Residence) -> Self {
        match residence.clone() {
            Residence::Student {
                university,
                hostel,
                block,
                room,
            } => DeliveryDestination::Hostel {
                university,
                hostel,
                block,
                room,
            },
            Residence::NonStudent {
                address,
                landmark,
                township,
                city,
            } => DeliveryDestination::Address {
                address,
                landmark,
                township,
                city,
            },
        }
    }
}

impl DeliveryDestination {
    /// One-line description for delivery slips.
    pub fn describe(&self) -> String {
        match self {
            DeliveryDestination::Hostel {
                university,
                hostel,
                block,
                room,
            } => {
                let mut parts = vec![hostel.clone()];
                if let Some(block) = block.as_deref().filter(|b| !b.is_empty()) {
                    parts.push(format!("Block {}", block));
                }
                if let Some(room) = room.as_deref().filter(|r| !r.is_empty()) {
                    parts.push(format!("Room {}", room));
                }
                parts.push(university.clone());
                parts.join(", ")
            }
            DeliveryDestination::Address {
                address,
                landmark,
                township,
                city,
            } => {
                let mut parts = vec![address.clone()];
                if let Some(landmark) = landmark.as_deref().filter(|l| !l.is_empty()) {
                    parts.push(format!("near {}", landmark));
                }
                parts.push(township.clone());
                parts.push(city.clone());
                parts.join(", ")
            }
        }
    }
}

impl UserProfile {
    /// Where this customer's orders are delivered.
    pub fn delivery_destination(&self) -> DeliveryDestination {
        DeliveryDestination::from(&self.residence)
    }
}

/// Delivery metadata frozen onto an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub recipient_name: String,
    pub phone_number: String,
    pub destination: DeliveryDestination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub schedule: DeliverySchedule,
}

impl Delivery {
    /// Build delivery details from the customer's profile.
    pub fn from_profile(profile: &UserProfile, schedule: DeliverySchedule) -> Self {
        Self {
            recipient_name: profile.username.clone(),
            phone_number: profile.phone_number.clone(),
            destination: profile.delivery_destination(),
            location: profile.location,
            schedule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_past_schedule_rejected() {
        let now = Utc::now();
        assert!(DeliverySchedule::Now.validate(now).is_ok());
        assert!(DeliverySchedule::At(now + Duration::hours(2)).validate(now).is_ok());
        assert!(DeliverySchedule::At(now - Duration::minutes(1)).validate(now).is_err());
    }

    #[test]
    fn test_schedule_serialization() {
        assert_eq!(
            serde_json::to_value(DeliverySchedule::Now).unwrap(),
            json!({ "when": "now" })
        );

        let at = DateTime::parse_from_rfc3339("2026-03-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let value = serde_json::to_value(DeliverySchedule::At(at)).unwrap();
        assert_eq!(value["when"], "scheduled");
        let back: DeliverySchedule = serde_json::from_value(value).unwrap();
        assert_eq!(back, DeliverySchedule::At(at));
    }

    #[test]
    fn test_destination_from_residence() {
        let residence = Residence::Student {
            university: "Copperbelt University".to_string(),
            hostel: "Riverside".to_string(),
            block: None,
            room: Some("4".to_string()),
        };
        let destination = DeliveryDestination::from(&residence);
        let value = serde_json::to_value(&destination).unwrap();
        assert_eq!(value["kind"], "hostel");
        assert_eq!(value["room"], "4");
        assert!(value.get("block").is_none());
    }
}
