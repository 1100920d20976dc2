use std::collections::HashSet;
use std::sync::Arc;
use anyhow::anyhow;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use strum_macros::Display;
use crate::domain::{ClassifiedError, Connection, ErrorKind, FriendRelationship, FriendshipStatus, FriendSummary, RelationshipId, SearchHit, UserId};
use crate::metrics;
use crate::notifier::{self, Notification, NotificationKind, Notifier};
use crate::repo::{Storage, StorageTx};

#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FriendshipError {
    UserNotFound(UserId),
    RelationshipNotFound(RelationshipId),
    SelfRequest,
    AlreadyFriends,
    DuplicateRequest,
    Other(anyhow::Error)
}

impl <T: Into<anyhow::Error>> From<T> for FriendshipError {
    fn from(value: T) -> Self {
        Self::Other(anyhow!(value))
    }
}

impl ClassifiedError for FriendshipError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_) | Self::RelationshipNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyFriends | Self::DuplicateRequest => ErrorKind::Conflict,
            Self::SelfRequest => ErrorKind::InvalidInput,
            Self::Other(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted(RelationshipId),
    /// The pair had been friends already; nothing was notified.
    AlreadyFriends(RelationshipId),
}

impl AcceptOutcome {
    pub fn relationship_id(self) -> RelationshipId {
        match self {
            Self::Accepted(id) | Self::AlreadyFriends(id) => id,
        }
    }
}

#[derive(Clone)]
pub struct FriendshipService {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
}

impl FriendshipService {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Self {
        Self { storage, notifier }
    }

    pub async fn request(&self, requester: &UserId, recipient: &UserId) -> Result<RelationshipId, FriendshipError> {
        if requester == recipient {
            return Err(FriendshipError::SelfRequest)
        }
        let mut tx = self.storage.begin().await?;
        for member in [requester, recipient] {
            if tx.get_user(member).await?.is_none() {
                return Err(FriendshipError::UserNotFound(member.clone()))
            }
        }

        match canonicalize_pair(tx.as_mut(), requester, recipient).await? {
            Some(existing) if existing.is_accepted() => return Err(FriendshipError::AlreadyFriends),
            Some(existing) if &existing.requester == requester => return Err(FriendshipError::DuplicateRequest),
            Some(existing) => {
                log::info!("the request {} of {recipient} is superseded by the one of {requester}", existing.id);
                tx.delete_relationship(existing.id).await?;
            }
            None => {}
        }

        let created = tx.create_relationship(requester, recipient).await?;
        tx.commit().await?;
        metrics::FRIEND_REQUEST_COUNTER.inc();

        let notification = Notification::new(requester, recipient.clone(), NotificationKind::FriendRequest, created.id);
        notifier::deliver(self.notifier.as_ref(), notification).await;
        Ok(created.id)
    }

    /// Accepts the request. Accepting an id that was merged into another row of the same pair
    /// acts on the surviving row, so repeated calls keep succeeding.
    pub async fn accept(&self, id: RelationshipId) -> Result<AcceptOutcome, FriendshipError> {
        let mut tx = self.storage.begin().await?;
        let relationship = match tx.get_relationship(id).await? {
            Some(relationship) => relationship,
            None => {
                let survivor = tx.find_merge_survivor(id).await?
                    .ok_or(FriendshipError::RelationshipNotFound(id))?;
                tx.get_relationship(survivor).await?
                    .ok_or(FriendshipError::RelationshipNotFound(id))?
            }
        };

        let survivor = canonicalize_pair(tx.as_mut(), &relationship.requester, &relationship.recipient).await?
            .ok_or(FriendshipError::RelationshipNotFound(id))?;
        if survivor.is_accepted() {
            tx.commit().await?;
            return Ok(AcceptOutcome::AlreadyFriends(survivor.id))
        }

        if !tx.set_relationship_status(survivor.id, FriendshipStatus::Accepted).await? {
            return Err(anyhow!("the relationship {} disappeared while being accepted", survivor.id).into())
        }
        tx.commit().await?;
        metrics::FRIEND_ACCEPT_COUNTER.inc();

        let notification = Notification::new(&survivor.recipient, survivor.requester.clone(), NotificationKind::FriendAccept, survivor.id);
        notifier::deliver(self.notifier.as_ref(), notification).await;
        Ok(AcceptOutcome::Accepted(survivor.id))
    }

    /// Rejects a request or ends a friendship. `false` if there was no such relationship.
    pub async fn delete(&self, id: RelationshipId) -> Result<bool, FriendshipError> {
        let mut tx = self.storage.begin().await?;
        let deleted = tx.delete_relationship(id).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    pub async fn list_friends(&self, user: &UserId) -> Result<Vec<FriendSummary>, FriendshipError> {
        let mut tx = self.storage.begin().await?;
        let relationships = tx.find_relationships_of(user, FriendshipStatus::Accepted).await?;

        let mut seen = HashSet::new();
        let mut friends = Vec::with_capacity(relationships.len());
        for relationship in relationships {
            let Some(friend_id) = relationship.other_member(user) else { continue };
            if !seen.insert(friend_id.clone()) {
                continue
            }
            match tx.get_user(friend_id).await? {
                Some(friend) => friends.push(FriendSummary {
                    relationship_id: relationship.id,
                    user_id: friend.id,
                    nickname: friend.nickname,
                    level: friend.level,
                    avatar: friend.main_fish_image,
                }),
                None => log::warn!("the friend {friend_id} of {user} is missing"),
            }
        }
        Ok(friends)
    }

    /// Users whose id contains the keyword, with their connection to `user`.
    pub async fn search(&self, user: &UserId, keyword: &str) -> Result<Vec<SearchHit>, FriendshipError> {
        let mut tx = self.storage.begin().await?;
        let found = tx.find_users_by_id_substring(keyword).await?;

        let mut hits = Vec::with_capacity(found.len());
        for candidate in found.into_iter().filter(|u| &u.id != user) {
            let rows = tx.find_relationships_between(user, &candidate.id).await?;
            hits.push(SearchHit {
                connection: Connection::classify(&rows),
                user_id: candidate.id,
                nickname: candidate.nickname,
                level: candidate.level,
                avatar: candidate.main_fish_image,
            });
        }
        Ok(hits)
    }

    pub async fn pick_non_friend_candidate(&self, user: &UserId) -> Result<Option<UserId>, FriendshipError> {
        let mut tx = self.storage.begin().await?;
        let candidates: Vec<UserId> = tx.find_non_friends(user).await?
            .into_iter()
            .filter(|u| u.active)
            .map(|u| u.id)
            .collect();
        Ok(candidates.choose(&mut OsRng).cloned())
    }
}

/// Collapses every relationship row of the unordered pair into the one with the lowest id.
/// The survivor becomes accepted if any of the dropped duplicates was.
pub async fn canonicalize_pair(tx: &mut (dyn StorageTx + '_), a: &UserId, b: &UserId) -> anyhow::Result<Option<FriendRelationship>> {
    let mut rows = tx.find_relationships_between(a, b).await?;
    rows.sort_by_key(|r| r.id);
    let mut rows = rows.into_iter();
    let Some(mut survivor) = rows.next() else {
        return Ok(None)
    };

    for duplicate in rows {
        log::warn!("removing the duplicate relationship {} between {a} and {b} in favor of {}", duplicate.id, survivor.id);
        tx.record_merge(duplicate.id, survivor.id).await?;
        tx.delete_relationship(duplicate.id).await?;
        if duplicate.is_accepted() && !survivor.is_accepted() {
            tx.set_relationship_status(survivor.id, FriendshipStatus::Accepted).await?;
            survivor.status = FriendshipStatus::Accepted;
        }
    }
    Ok(Some(survivor))
}
