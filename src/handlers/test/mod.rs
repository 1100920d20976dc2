mod aquariums;

use std::sync::{Arc, Mutex};
use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use crate::config::AppConfig;
use crate::domain::{FishType, FixedClock, FriendRelationship, NewFishType, OwnedFish, User, UserId};
use crate::handlers::Services;
use crate::notifier::{Notification, Notifier};
use crate::repo::{MemoryStorage, Storage};

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";
pub const CAROL: &str = "carol";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: bool,
}

impl RecordingNotifier {
    /// Rejects every notification.
    pub fn failing() -> Self {
        Self { failing: true, ..Default::default() }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> anyhow::Result<()> {
        if self.failing {
            bail!("the push gateway is unavailable")
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

pub struct Fixture {
    pub storage: MemoryStorage,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: FixedClock,
    pub config: AppConfig,
    pub services: Services,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        let storage = MemoryStorage::new();
        let notifier = Arc::new(notifier);
        let clock = FixedClock::new(now());
        let config = AppConfig::default();
        let services = Services::new(Arc::new(storage.clone()), notifier.clone(), Arc::new(clock.clone()), &config);
        Self { storage, notifier, clock, config, services }
    }

    pub async fn with_users(users: &[&str]) -> Self {
        let fixture = Self::new();
        for id in users {
            fixture.add_user(User::new(*id, id.to_uppercase())).await;
        }
        fixture
    }

    pub async fn add_user(&self, user: User) {
        let mut tx = self.storage.begin().await.unwrap();
        tx.create_user(&user).await.unwrap();
        tx.commit().await.unwrap();
    }

    pub async fn user(&self, id: &str) -> User {
        let mut tx = self.storage.begin().await.unwrap();
        let user = tx.get_user(&id.into()).await.unwrap();
        user.expect("no such user")
    }

    pub async fn add_fish_type(&self, name: &str) -> FishType {
        let mut tx = self.storage.begin().await.unwrap();
        let fish_type = tx.create_fish_type(NewFishType {
            name: name.to_owned(),
            image: Some(format!("{}.png", name.to_lowercase())),
            rarity: "RARE".to_owned(),
            size: "M".to_owned(),
        }).await.unwrap();
        tx.commit().await.unwrap();
        fish_type
    }

    pub async fn give_fish(&self, owner: &str, fish_type: &FishType) -> OwnedFish {
        let mut tx = self.storage.begin().await.unwrap();
        let fish = tx.create_owned_fish(&owner.into(), fish_type.id).await.unwrap();
        tx.commit().await.unwrap();
        fish
    }

    /// Inserts a pending row bypassing every check, like a request that raced another one.
    pub async fn insert_relationship(&self, requester: &str, recipient: &str) -> FriendRelationship {
        let mut tx = self.storage.begin().await.unwrap();
        let relationship = tx.create_relationship(&requester.into(), &recipient.into()).await.unwrap();
        tx.commit().await.unwrap();
        relationship
    }

    pub async fn relationships_between(&self, a: &str, b: &str) -> Vec<FriendRelationship> {
        let mut tx = self.storage.begin().await.unwrap();
        let rows = tx.find_relationships_between(&a.into(), &b.into()).await.unwrap();
        rows
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.notifier.sent()
    }
}

pub fn uid(id: &str) -> UserId {
    UserId::from(id)
}
