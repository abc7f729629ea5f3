//! Customer profiles.
//!
//! A profile is keyed by the authenticated user's id and records where the
//! customer's orders are delivered.

mod profile;
mod service;

pub use profile::{GeoPoint, NewProfile, Residence, UserProfile, DEFAULT_CITY};
pub use service::{ProfileService, USERS};
