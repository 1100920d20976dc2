use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use crate::domain::{Aquarium, AquariumId, BackgroundId, Dimension, FishCount, FishType, FishTypeId, FriendRelationship, FriendshipStatus, NewAquarium, NewFishType, OwnedFish, OwnedFishDetails, OwnedFishId, RelationshipId, User, UserId};
use super::{AquariumStore, FishStore, FriendshipStore, Storage, StorageTx, UserStore};

/// Storage kept entirely in process memory.
///
/// Transactions are serialized: `begin` waits for the previous transaction to finish and
/// hands out a working copy of the state, which replaces the shared state on commit.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<State>>,
}

#[derive(Clone, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    aquariums: BTreeMap<AquariumId, Aquarium>,
    fish_types: BTreeMap<FishTypeId, FishType>,
    owned_fish: BTreeMap<OwnedFishId, OwnedFish>,
    relationships: BTreeMap<RelationshipId, FriendRelationship>,
    merges: HashMap<RelationshipId, RelationshipId>,
    sequences: Sequences,
}

#[derive(Clone, Default)]
struct Sequences {
    aquariums: i64,
    fish_types: i64,
    owned_fish: i64,
    relationships: i64,
}

fn next(sequence: &mut i64) -> i64 {
    *sequence += 1;
    *sequence
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a row written by an older schema that lacks the timestamp.
    #[cfg(test)]
    pub(crate) async fn erase_timestamp(&self, id: AquariumId, dimension: Dimension) {
        if let Some(aquarium) = self.state.lock().await.aquariums.get_mut(&id) {
            match dimension {
                Dimension::Feed => aquarium.last_fed_at = None,
                Dimension::Water => aquarium.last_water_changed_at = None,
                Dimension::Clean => aquarium.last_cleaned_at = None,
            }
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn begin(&self) -> anyhow::Result<Box<dyn StorageTx + '_>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

#[async_trait]
impl StorageTx for MemoryTx {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryTx {
    async fn create_user(&mut self, user: &User) -> anyhow::Result<()> {
        if self.working.users.contains_key(&user.id) {
            bail!("the user {} already exists", user.id)
        }
        self.working.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&mut self, id: &UserId) -> anyhow::Result<Option<User>> {
        Ok(self.working.users.get(id).cloned())
    }

    async fn find_users_by_id_substring(&mut self, keyword: &str) -> anyhow::Result<Vec<User>> {
        Ok(self.working.users.values()
            .filter(|u| u.id.contains_ignore_case(keyword))
            .cloned()
            .collect())
    }

    async fn find_non_friends(&mut self, user: &UserId) -> anyhow::Result<Vec<User>> {
        let relationships = &self.working.relationships;
        Ok(self.working.users.values()
            .filter(|u| &u.id != user)
            .filter(|u| !relationships.values().any(|r| r.connects(user, &u.id)))
            .cloned()
            .collect())
    }

    async fn adjust_tickets(&mut self, user: &UserId, delta: i32) -> anyhow::Result<Option<u32>> {
        let Some(u) = self.working.users.get_mut(user) else {
            return Ok(None)
        };
        let balance = i64::from(u.fish_tickets) + i64::from(delta);
        match u32::try_from(balance) {
            Ok(balance) => {
                u.fish_tickets = balance;
                Ok(Some(balance))
            }
            Err(_) => Ok(None)
        }
    }

    async fn set_main_aquarium(&mut self, user: &UserId, aquarium: Option<AquariumId>) -> anyhow::Result<bool> {
        Ok(self.working.users.get_mut(user)
            .map(|u| u.main_aquarium = aquarium)
            .is_some())
    }
}

#[async_trait]
impl AquariumStore for MemoryTx {
    async fn create_aquarium(&mut self, aquarium: NewAquarium) -> anyhow::Result<Aquarium> {
        if !self.working.users.contains_key(&aquarium.owner) {
            bail!("couldn't create an aquarium for the absent user {}", aquarium.owner)
        }
        let id = AquariumId::new(next(&mut self.working.sequences.aquariums));
        let created = Aquarium {
            id,
            owner: aquarium.owner,
            name: aquarium.name,
            background: aquarium.background,
            last_fed_at: Some(aquarium.last_fed_at),
            last_water_changed_at: Some(aquarium.last_water_changed_at),
            last_cleaned_at: Some(aquarium.last_cleaned_at),
        };
        self.working.aquariums.insert(id, created.clone());
        Ok(created)
    }

    async fn get_aquarium(&mut self, id: AquariumId) -> anyhow::Result<Option<Aquarium>> {
        Ok(self.working.aquariums.get(&id).cloned())
    }

    async fn find_aquariums_by_owner(&mut self, owner: &UserId) -> anyhow::Result<Vec<Aquarium>> {
        Ok(self.working.aquariums.values()
            .filter(|a| &a.owner == owner)
            .cloned()
            .collect())
    }

    async fn all_aquariums(&mut self) -> anyhow::Result<Vec<Aquarium>> {
        Ok(self.working.aquariums.values().cloned().collect())
    }

    async fn rename_aquarium(&mut self, id: AquariumId, name: &str) -> anyhow::Result<bool> {
        Ok(self.working.aquariums.get_mut(&id)
            .map(|a| a.name = name.to_owned())
            .is_some())
    }

    async fn set_background(&mut self, id: AquariumId, background: BackgroundId) -> anyhow::Result<bool> {
        Ok(self.working.aquariums.get_mut(&id)
            .map(|a| a.background = background)
            .is_some())
    }

    async fn touch_aquarium(&mut self, id: AquariumId, dimension: Dimension, at: DateTime<Utc>) -> anyhow::Result<bool> {
        let Some(aquarium) = self.working.aquariums.get_mut(&id) else {
            return Ok(false)
        };
        let timestamp = match dimension {
            Dimension::Feed => &mut aquarium.last_fed_at,
            Dimension::Water => &mut aquarium.last_water_changed_at,
            Dimension::Clean => &mut aquarium.last_cleaned_at,
        };
        *timestamp = Some(timestamp.map_or(at, |current| current.max(at)));
        Ok(true)
    }

    async fn delete_aquarium(&mut self, id: AquariumId) -> anyhow::Result<bool> {
        if self.working.owned_fish.values().any(|f| f.aquarium == Some(id)) {
            bail!("the aquarium {id} still contains fish")
        }
        Ok(self.working.aquariums.remove(&id).is_some())
    }
}

#[async_trait]
impl FishStore for MemoryTx {
    async fn get_fish_type(&mut self, id: FishTypeId) -> anyhow::Result<Option<FishType>> {
        Ok(self.working.fish_types.get(&id).cloned())
    }

    async fn create_fish_type(&mut self, fish_type: NewFishType) -> anyhow::Result<FishType> {
        let id = FishTypeId::new(next(&mut self.working.sequences.fish_types));
        let created = FishType {
            id,
            name: fish_type.name,
            image: fish_type.image,
            rarity: fish_type.rarity,
            size: fish_type.size,
        };
        self.working.fish_types.insert(id, created.clone());
        Ok(created)
    }

    async fn create_owned_fish(&mut self, owner: &UserId, fish_type: FishTypeId) -> anyhow::Result<OwnedFish> {
        if !self.working.users.contains_key(owner) {
            bail!("couldn't give a fish to the absent user {owner}")
        }
        if !self.working.fish_types.contains_key(&fish_type) {
            bail!("couldn't give a fish of the absent type {fish_type}")
        }
        let id = OwnedFishId::new(next(&mut self.working.sequences.owned_fish));
        let created = OwnedFish {
            id,
            fish_type,
            owner: owner.clone(),
            aquarium: None,
        };
        self.working.owned_fish.insert(id, created.clone());
        Ok(created)
    }

    async fn get_owned_fish(&mut self, id: OwnedFishId) -> anyhow::Result<Option<OwnedFish>> {
        Ok(self.working.owned_fish.get(&id).cloned())
    }

    async fn find_owned_fish(&mut self, owner: &UserId) -> anyhow::Result<Vec<OwnedFishDetails>> {
        let mut details: Vec<OwnedFishDetails> = self.working.owned_fish.values()
            .filter(|f| &f.owner == owner)
            .filter_map(|f| self.working.fish_types.get(&f.fish_type)
                .map(|t| OwnedFishDetails { fish: f.clone(), fish_type: t.clone() }))
            .collect();
        details.sort_by_key(|d| (d.fish_type.id, d.fish.id));
        Ok(details)
    }

    async fn find_fish_in_aquarium(&mut self, owner: &UserId, aquarium: AquariumId) -> anyhow::Result<Vec<OwnedFishDetails>> {
        let mut details = self.find_owned_fish(owner).await?;
        details.retain(|d| d.fish.aquarium == Some(aquarium));
        Ok(details)
    }

    async fn owns_fish_named(&mut self, owner: &UserId, name: &str) -> anyhow::Result<bool> {
        Ok(self.working.owned_fish.values()
            .filter(|f| &f.owner == owner)
            .filter_map(|f| self.working.fish_types.get(&f.fish_type))
            .any(|t| t.name == name))
    }

    async fn count_fish_in_aquarium(&mut self, aquarium: AquariumId) -> anyhow::Result<Vec<FishCount>> {
        let mut counts: BTreeMap<FishTypeId, FishCount> = BTreeMap::new();
        let fishes = self.working.owned_fish.values()
            .filter(|f| f.aquarium == Some(aquarium))
            .filter_map(|f| self.working.fish_types.get(&f.fish_type));
        for fish_type in fishes {
            counts.entry(fish_type.id)
                .or_insert_with(|| FishCount { fish_type: fish_type.id, name: fish_type.name.clone(), count: 0 })
                .count += 1;
        }
        Ok(counts.into_values().collect())
    }

    async fn place_fish(&mut self, fish: OwnedFishId, aquarium: Option<AquariumId>) -> anyhow::Result<bool> {
        Ok(self.working.owned_fish.get_mut(&fish)
            .map(|f| f.aquarium = aquarium)
            .is_some())
    }

    async fn release_fish_from_aquarium(&mut self, aquarium: AquariumId) -> anyhow::Result<u64> {
        let mut released = 0;
        for fish in self.working.owned_fish.values_mut().filter(|f| f.aquarium == Some(aquarium)) {
            fish.aquarium = None;
            released += 1;
        }
        Ok(released)
    }
}

#[async_trait]
impl FriendshipStore for MemoryTx {
    async fn get_relationship(&mut self, id: RelationshipId) -> anyhow::Result<Option<FriendRelationship>> {
        Ok(self.working.relationships.get(&id).cloned())
    }

    async fn find_relationships_between(&mut self, a: &UserId, b: &UserId) -> anyhow::Result<Vec<FriendRelationship>> {
        Ok(self.working.relationships.values()
            .filter(|r| r.connects(a, b))
            .cloned()
            .collect())
    }

    async fn find_relationships_of(&mut self, user: &UserId, status: FriendshipStatus) -> anyhow::Result<Vec<FriendRelationship>> {
        Ok(self.working.relationships.values()
            .filter(|r| r.involves(user) && r.status == status)
            .cloned()
            .collect())
    }

    async fn create_relationship(&mut self, requester: &UserId, recipient: &UserId) -> anyhow::Result<FriendRelationship> {
        if requester == recipient {
            bail!("{requester} can't be in a relationship with the same user")
        }
        for member in [requester, recipient] {
            if !self.working.users.contains_key(member) {
                bail!("couldn't create a relationship with the absent user {member}")
            }
        }
        let id = RelationshipId::new(next(&mut self.working.sequences.relationships));
        let created = FriendRelationship {
            id,
            requester: requester.clone(),
            recipient: recipient.clone(),
            status: FriendshipStatus::Pending,
        };
        self.working.relationships.insert(id, created.clone());
        Ok(created)
    }

    async fn set_relationship_status(&mut self, id: RelationshipId, status: FriendshipStatus) -> anyhow::Result<bool> {
        Ok(self.working.relationships.get_mut(&id)
            .map(|r| r.status = status)
            .is_some())
    }

    async fn delete_relationship(&mut self, id: RelationshipId) -> anyhow::Result<bool> {
        self.working.merges.retain(|_, survivor| *survivor != id);
        Ok(self.working.relationships.remove(&id).is_some())
    }

    async fn record_merge(&mut self, merged: RelationshipId, survivor: RelationshipId) -> anyhow::Result<()> {
        for target in self.working.merges.values_mut().filter(|target| **target == merged) {
            *target = survivor;
        }
        self.working.merges.insert(merged, survivor);
        Ok(())
    }

    async fn find_merge_survivor(&mut self, merged: RelationshipId) -> anyhow::Result<Option<RelationshipId>> {
        Ok(self.working.merges.get(&merged).copied())
    }
}
