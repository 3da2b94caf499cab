use serde::Serialize;

use crate::services::typewriter::Frame;

/// Response for GET /api/hero/frames
#[derive(Debug, Clone, Serialize)]
pub struct HeroFramesResponse {
    pub prefix: &'static str,
    pub phrases: Vec<&'static str>,
    pub frames: Vec<Frame>,
}
