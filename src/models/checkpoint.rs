use chrono::NaiveDateTime;
use serde::Serialize;

/// Geofenced location with a rotating access token.
#[derive(Debug, Clone, Serialize)]
pub struct Checkpoint {
    pub id: i64,
    pub neighborhood_id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub token_expires_at: NaiveDateTime,
    pub created_at: String,
}

impl Checkpoint {
    /// A token is accepted only if it is the current one and has not expired.
    /// Expiry is inclusive: `now == token_expires_at` still passes.
    pub fn accepts_token(&self, presented: &str, now: NaiveDateTime) -> bool {
        !self.access_token.is_empty()
            && presented == self.access_token
            && now <= self.token_expires_at
    }
}
