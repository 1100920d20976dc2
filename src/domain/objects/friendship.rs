use serde::Serialize;
use crate::domain::primitives::{RelationshipId, UserId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, sqlx::Type, strum_macros::Display)]
#[sqlx(type_name = "friendship_status")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

/// A row of the social graph. `requester` and `recipient` keep the direction of a pending
/// request; once accepted the relationship is symmetric.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct FriendRelationship {
    pub id: RelationshipId,
    pub requester: UserId,
    pub recipient: UserId,
    pub status: FriendshipStatus,
}

impl FriendRelationship {
    pub fn is_accepted(&self) -> bool {
        self.status == FriendshipStatus::Accepted
    }

    pub fn involves(&self, user: &UserId) -> bool {
        &self.requester == user || &self.recipient == user
    }

    pub fn connects(&self, a: &UserId, b: &UserId) -> bool {
        (&self.requester == a && &self.recipient == b) || (&self.requester == b && &self.recipient == a)
    }

    pub fn other_member(&self, user: &UserId) -> Option<&UserId> {
        if &self.requester == user {
            Some(&self.recipient)
        } else if &self.recipient == user {
            Some(&self.requester)
        } else {
            None
        }
    }
}

/// How two users are related, as reported by the user search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Connection {
    None,
    Pending,
    Accepted,
}

impl Connection {
    pub fn classify(rows: &[FriendRelationship]) -> Self {
        if rows.iter().any(FriendRelationship::is_accepted) {
            Connection::Accepted
        } else if rows.is_empty() {
            Connection::None
        } else {
            Connection::Pending
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Connection::None => 0,
            Connection::Pending => 1,
            Connection::Accepted => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FriendSummary {
    pub relationship_id: RelationshipId,
    pub user_id: UserId,
    pub nickname: String,
    pub level: u32,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub user_id: UserId,
    pub nickname: String,
    pub level: u32,
    pub avatar: Option<String>,
    pub connection: Connection,
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(id: i64, requester: &str, recipient: &str, status: FriendshipStatus) -> FriendRelationship {
        FriendRelationship {
            id: RelationshipId::new(id),
            requester: requester.into(),
            recipient: recipient.into(),
            status,
        }
    }

    #[test]
    fn test_members() {
        let r = row(1, "alice", "bob", FriendshipStatus::Pending);
        let (alice, bob, carol) = (UserId::from("alice"), UserId::from("bob"), UserId::from("carol"));
        assert!(r.connects(&alice, &bob));
        assert!(r.connects(&bob, &alice));
        assert!(!r.connects(&alice, &carol));
        assert_eq!(r.other_member(&alice), Some(&bob));
        assert_eq!(r.other_member(&bob), Some(&alice));
        assert_eq!(r.other_member(&carol), None);
    }

    #[test]
    fn test_classify() {
        assert_eq!(Connection::classify(&[]).code(), 0);
        let pending = row(1, "alice", "bob", FriendshipStatus::Pending);
        let accepted = row(2, "bob", "alice", FriendshipStatus::Accepted);
        assert_eq!(Connection::classify(&[pending.clone()]).code(), 1);
        assert_eq!(Connection::classify(&[pending, accepted]).code(), 2);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(FriendshipStatus::Pending.to_string(), "PENDING");
        assert_eq!(FriendshipStatus::Accepted.to_string(), "ACCEPTED");
    }
}
