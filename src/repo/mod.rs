mod users;
mod aquariums;
mod fish;
mod friendships;
mod memory;

#[cfg(test)]
pub(crate) mod test;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use sqlx::postgres::PgQueryResult;
use crate::config::DatabaseConfig;
use crate::domain::{Aquarium, AquariumId, BackgroundId, Dimension, FishCount, FishType, FishTypeId, FriendRelationship, FriendshipStatus, NewAquarium, NewFishType, OwnedFish, OwnedFishDetails, OwnedFishId, RelationshipId, User, UserId};

pub use memory::MemoryStorage;

#[async_trait]
pub trait UserStore: Send {
    async fn create_user(&mut self, user: &User) -> anyhow::Result<()>;
    async fn get_user(&mut self, id: &UserId) -> anyhow::Result<Option<User>>;
    /// Case-insensitive substring search over user ids.
    async fn find_users_by_id_substring(&mut self, keyword: &str) -> anyhow::Result<Vec<User>>;
    /// Every user other than `user` that has no relationship row of any status with `user`.
    async fn find_non_friends(&mut self, user: &UserId) -> anyhow::Result<Vec<User>>;
    /// Returns the new balance, or `None` if the user is absent or the balance would go below zero.
    async fn adjust_tickets(&mut self, user: &UserId, delta: i32) -> anyhow::Result<Option<u32>>;
    async fn set_main_aquarium(&mut self, user: &UserId, aquarium: Option<AquariumId>) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait AquariumStore: Send {
    async fn create_aquarium(&mut self, aquarium: NewAquarium) -> anyhow::Result<Aquarium>;
    async fn get_aquarium(&mut self, id: AquariumId) -> anyhow::Result<Option<Aquarium>>;
    async fn find_aquariums_by_owner(&mut self, owner: &UserId) -> anyhow::Result<Vec<Aquarium>>;
    async fn all_aquariums(&mut self) -> anyhow::Result<Vec<Aquarium>>;
    async fn rename_aquarium(&mut self, id: AquariumId, name: &str) -> anyhow::Result<bool>;
    async fn set_background(&mut self, id: AquariumId, background: BackgroundId) -> anyhow::Result<bool>;
    /// Moves the timestamp of the dimension to `at` unless it's already later.
    async fn touch_aquarium(&mut self, id: AquariumId, dimension: Dimension, at: DateTime<Utc>) -> anyhow::Result<bool>;
    async fn delete_aquarium(&mut self, id: AquariumId) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait FishStore: Send {
    async fn get_fish_type(&mut self, id: FishTypeId) -> anyhow::Result<Option<FishType>>;
    async fn create_fish_type(&mut self, fish_type: NewFishType) -> anyhow::Result<FishType>;
    async fn create_owned_fish(&mut self, owner: &UserId, fish_type: FishTypeId) -> anyhow::Result<OwnedFish>;
    async fn get_owned_fish(&mut self, id: OwnedFishId) -> anyhow::Result<Option<OwnedFish>>;
    async fn find_owned_fish(&mut self, owner: &UserId) -> anyhow::Result<Vec<OwnedFishDetails>>;
    /// Fish of `owner` placed into the aquarium, ordered by fish type.
    async fn find_fish_in_aquarium(&mut self, owner: &UserId, aquarium: AquariumId) -> anyhow::Result<Vec<OwnedFishDetails>>;
    async fn owns_fish_named(&mut self, owner: &UserId, name: &str) -> anyhow::Result<bool>;
    async fn count_fish_in_aquarium(&mut self, aquarium: AquariumId) -> anyhow::Result<Vec<FishCount>>;
    async fn place_fish(&mut self, fish: OwnedFishId, aquarium: Option<AquariumId>) -> anyhow::Result<bool>;
    /// Puts every fish of the aquarium back into its owner's inventory.
    async fn release_fish_from_aquarium(&mut self, aquarium: AquariumId) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait FriendshipStore: Send {
    async fn get_relationship(&mut self, id: RelationshipId) -> anyhow::Result<Option<FriendRelationship>>;
    /// Every row between the two users in either direction, ordered by id.
    async fn find_relationships_between(&mut self, a: &UserId, b: &UserId) -> anyhow::Result<Vec<FriendRelationship>>;
    async fn find_relationships_of(&mut self, user: &UserId, status: FriendshipStatus) -> anyhow::Result<Vec<FriendRelationship>>;
    /// Inserts a new PENDING row.
    async fn create_relationship(&mut self, requester: &UserId, recipient: &UserId) -> anyhow::Result<FriendRelationship>;
    async fn set_relationship_status(&mut self, id: RelationshipId, status: FriendshipStatus) -> anyhow::Result<bool>;
    /// Also forgets the merges into the row.
    async fn delete_relationship(&mut self, id: RelationshipId) -> anyhow::Result<bool>;
    /// Remembers that the `merged` duplicate was folded into `survivor`.
    async fn record_merge(&mut self, merged: RelationshipId, survivor: RelationshipId) -> anyhow::Result<()>;
    async fn find_merge_survivor(&mut self, merged: RelationshipId) -> anyhow::Result<Option<RelationshipId>>;
}

/// A unit of work. Dropping it without calling [StorageTx::commit] discards every change.
#[async_trait]
pub trait StorageTx: UserStore + AquariumStore + FishStore + FriendshipStore + Send {
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn begin(&self) -> anyhow::Result<Box<dyn StorageTx + '_>>;
}

#[derive(Clone)]
pub struct PgStorage {
    pool: Pool<Postgres>,
}

pub struct PgTx {
    tx: sqlx::Transaction<'static, Postgres>,
}

impl PgStorage {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn begin(&self) -> anyhow::Result<Box<dyn StorageTx + '_>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }
}

#[async_trait]
impl StorageTx for PgTx {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

pub async fn establish_database_connection(config: &DatabaseConfig) -> Result<Pool<Postgres>, anyhow::Error> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.url.as_str()).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

fn ensure_only_one_row_updated(res: PgQueryResult) -> Result<PgQueryResult, anyhow::Error> {
    match res.rows_affected() {
        1 => Ok(res),
        x => Err(anyhow!("not only one row was updated but {x}"))
    }
}

fn at_most_one_row_updated(res: PgQueryResult) -> Result<bool, anyhow::Error> {
    match res.rows_affected() {
        0 => Ok(false),
        1 => Ok(true),
        x => Err(anyhow!("at most one row was expected to be updated but {x}"))
    }
}
