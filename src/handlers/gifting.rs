use std::sync::Arc;
use anyhow::anyhow;
use strum_macros::Display;
use crate::domain::{ClassifiedError, ErrorKind, FishType, FishTypeId, OwnedFish, UserId};
use crate::metrics;
use crate::notifier::{self, Notification, NotificationKind, Notifier};
use crate::repo::Storage;

#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum GiftError {
    UserNotFound(UserId),
    FishTypeNotFound(FishTypeId),
    SelfGift,
    InvalidName,
    DuplicateName,
    InsufficientTickets,
    Other(anyhow::Error)
}

impl <T: Into<anyhow::Error>> From<T> for GiftError {
    fn from(value: T) -> Self {
        Self::Other(anyhow!(value))
    }
}

impl ClassifiedError for GiftError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_) | Self::FishTypeNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateName => ErrorKind::Conflict,
            Self::InsufficientTickets => ErrorKind::InsufficientResource,
            Self::SelfGift | Self::InvalidName => ErrorKind::InvalidInput,
            Self::Other(_) => ErrorKind::Internal,
        }
    }
}

/// Everything a successful gift has produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Gift {
    pub fish_type: FishType,
    pub fish: OwnedFish,
    pub requester_tickets: u32,
    pub friend_tickets: u32,
}

#[derive(Clone)]
pub struct GiftingService {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
}

impl GiftingService {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Self {
        Self { storage, notifier }
    }

    /// The requester spends a ticket to get a copy of the friend's fish under a new name;
    /// the friend earns the ticket. Either every change is committed or none is.
    pub async fn gift_fish(&self, requester: &UserId, friend: &UserId, source: FishTypeId, desired_name: &str) -> Result<Gift, GiftError> {
        metrics::GIFT_COUNTER.invoked();
        let name = desired_name.trim();
        if name.is_empty() {
            return Err(GiftError::InvalidName)
        }
        if requester == friend {
            return Err(GiftError::SelfGift)
        }

        let mut tx = self.storage.begin().await?;
        let requester_account = tx.get_user(requester).await?
            .ok_or_else(|| GiftError::UserNotFound(requester.clone()))?;
        if tx.get_user(friend).await?.is_none() {
            return Err(GiftError::UserNotFound(friend.clone()))
        }
        if tx.owns_fish_named(requester, name).await? {
            return Err(GiftError::DuplicateName)
        }
        if requester_account.fish_tickets < 1 {
            return Err(GiftError::InsufficientTickets)
        }
        let source_type = tx.get_fish_type(source).await?
            .ok_or(GiftError::FishTypeNotFound(source))?;

        let fish_type = tx.create_fish_type(source_type.derive_named(name)).await?;
        let fish = tx.create_owned_fish(requester, fish_type.id).await?;
        let requester_tickets = tx.adjust_tickets(requester, -1).await?
            .ok_or(GiftError::InsufficientTickets)?;
        let friend_tickets = tx.adjust_tickets(friend, 1).await?
            .ok_or_else(|| GiftError::UserNotFound(friend.clone()))?;
        tx.commit().await?;
        metrics::GIFT_COUNTER.finished();
        log::info!("{requester} got the fish {} from {friend}", fish_type.name);

        let image = fish_type.image.clone().unwrap_or_default();
        let notification = Notification::new(requester, friend.clone(), NotificationKind::FriendFish, image);
        notifier::deliver(self.notifier.as_ref(), notification).await;

        Ok(Gift { fish_type, fish, requester_tickets, friend_tickets })
    }
}
