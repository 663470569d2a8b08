use serde::{Deserialize, Serialize};

use crate::domain::geo::distance_miles;

/// An employer with a location and a contact person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employer {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Employer {
    pub fn from_input(id: String, input: EmployerInput) -> Self {
        Self {
            id,
            name: input.name,
            latitude: input.latitude,
            longitude: input.longitude,
            contact_name: input.contact_name,
            contact_phone: input.contact_phone,
            contact_email: input.contact_email,
            website: input.website,
        }
    }

    /// Great-circle distance from the given point, in miles.
    pub fn distance_miles_from(&self, latitude: f64, longitude: f64) -> f64 {
        distance_miles(latitude, longitude, self.latitude, self.longitude)
    }
}

/// Create/replace payload for an employer. Any `id` in the body is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerInput {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl From<Employer> for EmployerInput {
    fn from(e: Employer) -> Self {
        Self {
            name: e.name,
            latitude: e.latitude,
            longitude: e.longitude,
            contact_name: e.contact_name,
            contact_phone: e.contact_phone,
            contact_email: e.contact_email,
            website: e.website,
        }
    }
}
