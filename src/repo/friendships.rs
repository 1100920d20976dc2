use anyhow::Context;
use async_trait::async_trait;
use crate::domain::{FriendRelationship, FriendshipStatus, RelationshipId, UserId};
use super::{at_most_one_row_updated, FriendshipStore, PgTx};

const SELECT_RELATIONSHIPS: &str = "SELECT id, friend1_id AS requester, friend2_id AS recipient, status FROM Friend_Relationships";

#[async_trait]
impl FriendshipStore for PgTx {
    async fn get_relationship(&mut self, id: RelationshipId) -> anyhow::Result<Option<FriendRelationship>> {
        sqlx::query_as::<_, FriendRelationship>(&format!("{SELECT_RELATIONSHIPS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(Into::into)
    }

    async fn find_relationships_between(&mut self, a: &UserId, b: &UserId) -> anyhow::Result<Vec<FriendRelationship>> {
        sqlx::query_as::<_, FriendRelationship>(&format!(
                "{SELECT_RELATIONSHIPS}
                    WHERE (friend1_id = $1 AND friend2_id = $2) OR (friend1_id = $2 AND friend2_id = $1)
                    ORDER BY id"))
            .bind(a)
            .bind(b)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(Into::into)
    }

    async fn find_relationships_of(&mut self, user: &UserId, status: FriendshipStatus) -> anyhow::Result<Vec<FriendRelationship>> {
        sqlx::query_as::<_, FriendRelationship>(&format!(
                "{SELECT_RELATIONSHIPS} WHERE (friend1_id = $1 OR friend2_id = $1) AND status = $2 ORDER BY id"))
            .bind(user)
            .bind(status)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(Into::into)
    }

    async fn create_relationship(&mut self, requester: &UserId, recipient: &UserId) -> anyhow::Result<FriendRelationship> {
        sqlx::query_as::<_, FriendRelationship>(
                "INSERT INTO Friend_Relationships (friend1_id, friend2_id, status) VALUES ($1, $2, $3)
                    RETURNING id, friend1_id AS requester, friend2_id AS recipient, status")
            .bind(requester)
            .bind(recipient)
            .bind(FriendshipStatus::Pending)
            .fetch_one(&mut *self.tx)
            .await
            .context(format!("couldn't create a relationship from {requester} to {recipient}"))
    }

    async fn set_relationship_status(&mut self, id: RelationshipId, status: FriendshipStatus) -> anyhow::Result<bool> {
        sqlx::query("UPDATE Friend_Relationships SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *self.tx)
            .await
            .map_err(Into::into)
            .and_then(at_most_one_row_updated)
    }

    async fn delete_relationship(&mut self, id: RelationshipId) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM Friend_Relationships WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(Into::into)
            .and_then(at_most_one_row_updated)?;
        sqlx::query("DELETE FROM Friend_Relationship_Merges WHERE survivor_id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .context(format!("couldn't forget the merges into {id}"))?;
        Ok(deleted)
    }

    async fn record_merge(&mut self, merged: RelationshipId, survivor: RelationshipId) -> anyhow::Result<()> {
        sqlx::query("UPDATE Friend_Relationship_Merges SET survivor_id = $2 WHERE survivor_id = $1")
            .bind(merged)
            .bind(survivor)
            .execute(&mut *self.tx)
            .await?;
        sqlx::query("INSERT INTO Friend_Relationship_Merges (merged_id, survivor_id) VALUES ($1, $2)
                ON CONFLICT (merged_id) DO UPDATE SET survivor_id = $2")
            .bind(merged)
            .bind(survivor)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_merge_survivor(&mut self, merged: RelationshipId) -> anyhow::Result<Option<RelationshipId>> {
        sqlx::query_scalar::<_, RelationshipId>("SELECT survivor_id FROM Friend_Relationship_Merges WHERE merged_id = $1")
            .bind(merged)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(Into::into)
    }
}
