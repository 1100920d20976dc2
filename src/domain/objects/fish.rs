use serde::Serialize;
use crate::domain::primitives::{AquariumId, FishTypeId, OwnedFishId, UserId};

/// A catalog entry.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct FishType {
    pub id: FishTypeId,
    pub name: String,
    pub image: Option<String>,
    pub rarity: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFishType {
    pub name: String,
    pub image: Option<String>,
    pub rarity: String,
    pub size: String,
}

impl FishType {
    /// Catalog entry for a gifted fish: a new name, everything else inherited.
    pub fn derive_named(&self, name: impl Into<String>) -> NewFishType {
        NewFishType {
            name: name.into(),
            image: self.image.clone(),
            rarity: self.rarity.clone(),
            size: self.size.clone(),
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct OwnedFish {
    pub id: OwnedFishId,
    pub fish_type: FishTypeId,
    pub owner: UserId,
    pub aquarium: Option<AquariumId>,
}

impl OwnedFish {
    pub fn in_inventory(&self) -> bool {
        self.aquarium.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnedFishDetails {
    pub fish: OwnedFish,
    pub fish_type: FishType,
}
