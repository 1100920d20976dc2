use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::decay::{self, Intervals};
use crate::domain::primitives::{AquariumId, BackgroundId, Dimension, FishTypeId, UserId};

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct Aquarium {
    pub id: AquariumId,
    pub owner: UserId,
    pub name: String,
    pub background: BackgroundId,
    pub last_fed_at: Option<DateTime<Utc>>,
    pub last_water_changed_at: Option<DateTime<Utc>>,
    pub last_cleaned_at: Option<DateTime<Utc>>,
}

impl Aquarium {
    pub fn last_action(&self, dimension: Dimension) -> Option<DateTime<Utc>> {
        match dimension {
            Dimension::Feed => self.last_fed_at,
            Dimension::Water => self.last_water_changed_at,
            Dimension::Clean => self.last_cleaned_at,
        }
    }

    pub fn score(&self, dimension: Dimension, intervals: &Intervals, now: DateTime<Utc>) -> Option<u8> {
        decay::score_of(self.last_action(dimension), intervals.of(dimension), now)
    }
}

#[derive(Debug, Clone)]
pub struct NewAquarium {
    pub owner: UserId,
    pub name: String,
    pub background: BackgroundId,
    pub last_fed_at: DateTime<Utc>,
    pub last_water_changed_at: DateTime<Utc>,
    pub last_cleaned_at: DateTime<Utc>,
}

impl NewAquarium {
    /// Every timestamp is backdated by two intervals of its dimension.
    pub fn backdated(owner: UserId, name: String, background: BackgroundId, intervals: &Intervals, now: DateTime<Utc>) -> Self {
        let initial = |dimension| decay::initial_timestamp(intervals.of(dimension), now);
        Self {
            owner,
            name,
            background,
            last_fed_at: initial(Dimension::Feed),
            last_water_changed_at: initial(Dimension::Water),
            last_cleaned_at: initial(Dimension::Clean),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AquariumSummary {
    pub id: AquariumId,
    pub name: String,
}

impl From<Aquarium> for AquariumSummary {
    fn from(value: Aquarium) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct FishCount {
    pub fish_type: FishTypeId,
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AquariumDetails {
    pub aquarium: Aquarium,
    pub feed_score: Option<u8>,
    pub water_score: Option<u8>,
    pub clean_score: Option<u8>,
    pub fishes: Vec<FishCount>,
}
