use chrono::{DateTime, Duration, Utc};
use crate::domain::Dimension;

pub const MAX_SCORE: u8 = 5;
/// Scores at or above this tier don't need any reminder.
pub const HEALTHY_SCORE: u8 = 4;

/// Decay cadence of each maintenance dimension, in minutes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Intervals {
    pub feed: u32,
    pub water: u32,
    pub clean: u32,
}

impl Intervals {
    pub fn of(&self, dimension: Dimension) -> u32 {
        match dimension {
            Dimension::Feed => self.feed,
            Dimension::Water => self.water,
            Dimension::Clean => self.clean,
        }
    }
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            feed: 30,
            water: 120,
            clean: 240,
        }
    }
}

/// Converts the time passed since the last maintenance action into a tier from 0 to 5.
///
/// Tier boundaries are multiples of `interval_minutes`: less than one interval gives 5,
/// less than two gives 4 and so on down to 0 once five intervals have passed.
/// A timestamp in the future is treated as just now.
pub fn score(last_action: DateTime<Utc>, interval_minutes: u32, now: DateTime<Utc>) -> u8 {
    let elapsed = (now - last_action).num_minutes();
    let interval = i64::from(interval_minutes);
    (1..=i64::from(MAX_SCORE))
        .find(|tier| elapsed < tier * interval)
        .map(|tier| MAX_SCORE - (tier - 1) as u8)
        .unwrap_or(0)
}

/// Same as [score] but for a timestamp that may be missing in the storage.
pub fn score_of(last_action: Option<DateTime<Utc>>, interval_minutes: u32, now: DateTime<Utc>) -> Option<u8> {
    last_action.map(|time| score(time, interval_minutes, now))
}

pub fn is_healthy(score: u8) -> bool {
    score >= HEALTHY_SCORE
}

/// Timestamp for a fresh aquarium: two intervals ago, which yields tier 3.
pub fn initial_timestamp(interval_minutes: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(2 * i64::from(interval_minutes))
}
