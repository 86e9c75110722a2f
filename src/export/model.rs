use crate::models::fine::Fine;
use crate::utils::time::format_ts;
use serde::Serialize;

/// Struttura “piatta” per export delle multe.
#[derive(Serialize, Clone, Debug)]
pub struct FineExport {
    pub id: i64,
    pub neighborhood_id: i64,
    pub resident_id: i64,
    pub shift_id: i64,
    pub participant_id: i64,
    pub violation_kind: String,
    pub amount: i64,
    pub status: String,
    pub generated_at: String,
    pub paid_at: String,
}

impl From<&Fine> for FineExport {
    fn from(f: &Fine) -> Self {
        Self {
            id: f.id,
            neighborhood_id: f.neighborhood_id,
            resident_id: f.resident_id,
            shift_id: f.shift_id,
            participant_id: f.participant_id,
            violation_kind: f.violation_kind.to_db_str().to_string(),
            amount: f.amount,
            status: f.status.to_db_str().to_string(),
            generated_at: format_ts(&f.generated_at),
            paid_at: f.paid_at.as_ref().map(format_ts).unwrap_or_default(),
        }
    }
}
