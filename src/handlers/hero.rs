use axum::Json;

use crate::{
    models::hero::HeroFramesResponse,
    services::typewriter::{HERO_PHRASES, Typewriter},
};

pub const HEADLINE_PREFIX: &str = "CryptoVision: ";

/// Handler for GET /api/hero/frames
/// One full pass of the headline typing animation; the page loops it
pub async fn get_hero_frames() -> Json<HeroFramesResponse> {
    Json(HeroFramesResponse {
        prefix: HEADLINE_PREFIX,
        phrases: HERO_PHRASES.to_vec(),
        frames: Typewriter::default().cycle_frames(),
    })
}
