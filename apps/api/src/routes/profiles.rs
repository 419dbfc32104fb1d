use axum::Json;

use crate::ats::{AtsSystemProfile, ATS_PROFILES};

/// GET /api/v1/ats-profiles
pub async fn list_profiles_handler() -> Json<&'static [AtsSystemProfile]> {
    Json(ATS_PROFILES)
}
