use std::str::FromStr;
use std::sync::Arc;
use anyhow::anyhow;
use strum_macros::{Display, EnumString};
use crate::domain::{Aquarium, AquariumDetails, AquariumId, AquariumSummary, BackgroundId, ClassifiedError, Clock, Dimension, ErrorKind, Intervals, NewAquarium, OwnedFish, OwnedFishDetails, OwnedFishId, UserId};
use crate::repo::{Storage, StorageTx};

#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AquariumError {
    UserNotFound(UserId),
    AquariumNotFound(AquariumId),
    FishNotFound(OwnedFishId),
    UnknownStatusField(String),
    InvalidBackground(String),
    ForeignAquarium(AquariumId),
    Other(anyhow::Error)
}

impl <T: Into<anyhow::Error>> From<T> for AquariumError {
    fn from(value: T) -> Self {
        Self::Other(anyhow!(value))
    }
}

impl ClassifiedError for AquariumError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_) | Self::AquariumNotFound(_) | Self::FishNotFound(_) => ErrorKind::NotFound,
            Self::UnknownStatusField(_) | Self::InvalidBackground(_) | Self::ForeignAquarium(_) => ErrorKind::InvalidInput,
            Self::Other(_) => ErrorKind::Internal,
        }
    }
}

/// What a status update changes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatusField {
    Name,
    Background,
    Feed,
    Water,
    Clean,
}

#[derive(Clone)]
pub struct AquariumService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    intervals: Intervals,
}

impl AquariumService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, intervals: Intervals) -> Self {
        Self { storage, clock, intervals }
    }

    /// A new aquarium starts at the middle tier of every dimension. The first aquarium
    /// of a user becomes their main one.
    pub async fn create_aquarium(&self, owner: &UserId, name: &str, background: BackgroundId) -> Result<Aquarium, AquariumError> {
        let mut tx = self.storage.begin().await?;
        let user = tx.get_user(owner).await?
            .ok_or_else(|| AquariumError::UserNotFound(owner.clone()))?;
        let new_aquarium = NewAquarium::backdated(owner.clone(), name.to_owned(), background, &self.intervals, self.clock.now());
        let aquarium = tx.create_aquarium(new_aquarium).await?;
        if user.main_aquarium.is_none() {
            tx.set_main_aquarium(owner, Some(aquarium.id)).await?;
        }
        tx.commit().await?;
        Ok(aquarium)
    }

    pub async fn update_status(&self, id: AquariumId, field: &str, data: &str) -> Result<Aquarium, AquariumError> {
        let field = StatusField::from_str(field.trim())
            .map_err(|_| AquariumError::UnknownStatusField(field.to_owned()))?;
        let mut tx = self.storage.begin().await?;
        if tx.get_aquarium(id).await?.is_none() {
            return Err(AquariumError::AquariumNotFound(id))
        }

        match field {
            StatusField::Name => {
                tx.rename_aquarium(id, data).await?;
            }
            StatusField::Background => {
                let background = BackgroundId::from_str(data.trim())
                    .map_err(|_| AquariumError::InvalidBackground(data.to_owned()))?;
                tx.set_background(id, background).await?;
            }
            StatusField::Feed => self.touch(tx.as_mut(), id, Dimension::Feed).await?,
            StatusField::Water => self.touch(tx.as_mut(), id, Dimension::Water).await?,
            StatusField::Clean => self.touch(tx.as_mut(), id, Dimension::Clean).await?,
        }

        let updated = tx.get_aquarium(id).await?
            .ok_or(AquariumError::AquariumNotFound(id))?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn touch(&self, tx: &mut (dyn StorageTx + '_), id: AquariumId, dimension: Dimension) -> anyhow::Result<()> {
        tx.touch_aquarium(id, dimension, self.clock.now()).await?;
        Ok(())
    }

    pub async fn details(&self, id: AquariumId) -> Result<AquariumDetails, AquariumError> {
        let mut tx = self.storage.begin().await?;
        let aquarium = tx.get_aquarium(id).await?
            .ok_or(AquariumError::AquariumNotFound(id))?;
        let fishes = tx.count_fish_in_aquarium(id).await?;

        let now = self.clock.now();
        let score = |dimension| aquarium.score(dimension, &self.intervals, now);
        Ok(AquariumDetails {
            feed_score: score(Dimension::Feed),
            water_score: score(Dimension::Water),
            clean_score: score(Dimension::Clean),
            aquarium,
            fishes,
        })
    }

    pub async fn list_aquariums(&self, owner: &UserId) -> Result<Vec<AquariumSummary>, AquariumError> {
        let mut tx = self.storage.begin().await?;
        let aquariums = tx.find_aquariums_by_owner(owner).await?;
        Ok(aquariums.into_iter()
            .map(AquariumSummary::from)
            .collect())
    }

    pub async fn set_main_aquarium(&self, user: &UserId, id: AquariumId) -> Result<(), AquariumError> {
        let mut tx = self.storage.begin().await?;
        if tx.get_user(user).await?.is_none() {
            return Err(AquariumError::UserNotFound(user.clone()))
        }
        let aquarium = tx.get_aquarium(id).await?
            .ok_or(AquariumError::AquariumNotFound(id))?;
        if &aquarium.owner != user {
            return Err(AquariumError::ForeignAquarium(id))
        }
        tx.set_main_aquarium(user, Some(id)).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Puts the fish of the aquarium back into the inventory before deleting it.
    /// `false` if there was no such aquarium.
    pub async fn delete_aquarium(&self, id: AquariumId) -> Result<bool, AquariumError> {
        let mut tx = self.storage.begin().await?;
        let Some(aquarium) = tx.get_aquarium(id).await? else {
            return Ok(false)
        };
        let released = tx.release_fish_from_aquarium(id).await?;
        let owner = tx.get_user(&aquarium.owner).await?;
        if owner.is_some_and(|u| u.main_aquarium == Some(id)) {
            tx.set_main_aquarium(&aquarium.owner, None).await?;
        }
        let deleted = tx.delete_aquarium(id).await?;
        tx.commit().await?;
        log::info!("the aquarium {id} of {} was deleted, {released} fish are back in the inventory", aquarium.owner);
        Ok(deleted)
    }

    /// Moves the fish into an aquarium of its owner, or into the inventory when `aquarium` is `None`.
    pub async fn place_fish(&self, fish: OwnedFishId, aquarium: Option<AquariumId>) -> Result<OwnedFish, AquariumError> {
        let mut tx = self.storage.begin().await?;
        let owned = tx.get_owned_fish(fish).await?
            .ok_or(AquariumError::FishNotFound(fish))?;
        if let Some(aquarium_id) = aquarium {
            let target = tx.get_aquarium(aquarium_id).await?
                .ok_or(AquariumError::AquariumNotFound(aquarium_id))?;
            if target.owner != owned.owner {
                return Err(AquariumError::ForeignAquarium(aquarium_id))
            }
        }
        tx.place_fish(fish, aquarium).await?;
        tx.commit().await?;
        Ok(OwnedFish { aquarium, ..owned })
    }

    pub async fn list_fish(&self, owner: &UserId) -> Result<Vec<OwnedFishDetails>, AquariumError> {
        let mut tx = self.storage.begin().await?;
        let fishes = tx.find_owned_fish(owner).await?;
        Ok(fishes)
    }

    /// Fish the owner has placed into the aquarium. Empty for an unknown aquarium.
    pub async fn aquarium_fish(&self, owner: &UserId, aquarium: AquariumId) -> Result<Vec<OwnedFishDetails>, AquariumError> {
        let mut tx = self.storage.begin().await?;
        let fishes = tx.find_fish_in_aquarium(owner, aquarium).await?;
        Ok(fishes)
    }

    /// What a friend shows off in their main aquarium; the source of the fish types to be gifted.
    pub async fn friend_aquarium_fish(&self, friend: &UserId) -> Result<Vec<OwnedFishDetails>, AquariumError> {
        let mut tx = self.storage.begin().await?;
        let user = tx.get_user(friend).await?
            .ok_or_else(|| AquariumError::UserNotFound(friend.clone()))?;
        let Some(main_aquarium) = user.main_aquarium else {
            return Ok(Vec::new())
        };
        let fishes = tx.find_fish_in_aquarium(friend, main_aquarium).await?;
        Ok(fishes)
    }
}
