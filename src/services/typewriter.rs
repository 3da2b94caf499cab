//! Typing animation for the landing headline.
//!
//! Types a phrase one character at a time, holds it, deletes it with an
//! accelerating backspace, then moves on to the next phrase.

use serde::Serialize;

pub const HERO_PHRASES: [&str; 5] = [
    "Track Bitcoin Live",
    "Monitor Ethereum Instantly",
    "Follow Crypto Trends",
    "Analyze Market Movements",
    "Watch Prices in Real-Time",
];

const TYPE_DELAY_MS: f64 = 200.0;
const HOLD_DELAY_MS: f64 = 2000.0;
const DELETE_SPEEDUP: f64 = 1.5;

/// What to show after a tick, and how long to wait before the next one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub text: String,
    pub delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Typewriter {
    phrases: Vec<&'static str>,
    index: usize,
    /// Visible prefix length, in chars.
    shown: usize,
    deleting: bool,
    delay_ms: f64,
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::start(HERO_PHRASES.to_vec())
    }
}

impl Typewriter {
    /// `None` for an empty phrase list.
    pub fn new(phrases: &[&'static str]) -> Option<Self> {
        if phrases.is_empty() {
            return None;
        }
        Some(Self::start(phrases.to_vec()))
    }

    fn start(phrases: Vec<&'static str>) -> Self {
        Self {
            phrases,
            index: 0,
            shown: 0,
            deleting: false,
            delay_ms: TYPE_DELAY_MS,
        }
    }

    pub fn phrase_index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> String {
        self.phrases[self.index].chars().take(self.shown).collect()
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms.round() as u64
    }

    pub fn tick(&mut self) -> Frame {
        let len = self.phrases[self.index].chars().count();

        if self.deleting {
            if self.shown == 0 {
                self.deleting = false;
                self.index = (self.index + 1) % self.phrases.len();
                self.delay_ms = TYPE_DELAY_MS;
            } else {
                self.shown -= 1;
                self.delay_ms /= DELETE_SPEEDUP;
            }
        } else if self.shown < len {
            self.shown += 1;
        } else {
            self.deleting = true;
            self.delay_ms = HOLD_DELAY_MS;
        }

        Frame {
            text: self.text(),
            delay_ms: self.delay_ms(),
        }
    }

    /// Every frame of one pass through all phrases, ending back at an empty
    /// headline on the first phrase.
    pub fn cycle_frames(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        loop {
            frames.push(self.tick());
            if self.index == 0 && self.shown == 0 && !self.deleting {
                return frames;
            }
        }
    }
}
