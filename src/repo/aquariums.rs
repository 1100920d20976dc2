use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::domain::{Aquarium, AquariumId, BackgroundId, Dimension, NewAquarium, UserId};
use super::{at_most_one_row_updated, AquariumStore, PgTx};

const SELECT_AQUARIUMS: &str = "SELECT id, user_id AS owner, aquarium_name AS name, background_id AS background,
        last_fed_time AS last_fed_at, last_water_change_time AS last_water_changed_at, last_cleaned_time AS last_cleaned_at
    FROM Aquariums";

#[async_trait]
impl AquariumStore for PgTx {
    async fn create_aquarium(&mut self, aquarium: NewAquarium) -> anyhow::Result<Aquarium> {
        sqlx::query_as::<_, Aquarium>(
                "INSERT INTO Aquariums (user_id, aquarium_name, background_id, last_fed_time, last_water_change_time, last_cleaned_time)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING id, user_id AS owner, aquarium_name AS name, background_id AS background,
                        last_fed_time AS last_fed_at, last_water_change_time AS last_water_changed_at, last_cleaned_time AS last_cleaned_at")
            .bind(&aquarium.owner)
            .bind(&aquarium.name)
            .bind(aquarium.background)
            .bind(aquarium.last_fed_at)
            .bind(aquarium.last_water_changed_at)
            .bind(aquarium.last_cleaned_at)
            .fetch_one(&mut *self.tx)
            .await
            .context(format!("couldn't create an aquarium for {}", aquarium.owner))
    }

    async fn get_aquarium(&mut self, id: AquariumId) -> anyhow::Result<Option<Aquarium>> {
        sqlx::query_as::<_, Aquarium>(&format!("{SELECT_AQUARIUMS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(Into::into)
    }

    async fn find_aquariums_by_owner(&mut self, owner: &UserId) -> anyhow::Result<Vec<Aquarium>> {
        sqlx::query_as::<_, Aquarium>(&format!("{SELECT_AQUARIUMS} WHERE user_id = $1 ORDER BY id"))
            .bind(owner)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(Into::into)
    }

    async fn all_aquariums(&mut self) -> anyhow::Result<Vec<Aquarium>> {
        sqlx::query_as::<_, Aquarium>(&format!("{SELECT_AQUARIUMS} ORDER BY id"))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(Into::into)
    }

    async fn rename_aquarium(&mut self, id: AquariumId, name: &str) -> anyhow::Result<bool> {
        sqlx::query("UPDATE Aquariums SET aquarium_name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&mut *self.tx)
            .await
            .map_err(Into::into)
            .and_then(at_most_one_row_updated)
    }

    async fn set_background(&mut self, id: AquariumId, background: BackgroundId) -> anyhow::Result<bool> {
        sqlx::query("UPDATE Aquariums SET background_id = $2 WHERE id = $1")
            .bind(id)
            .bind(background)
            .execute(&mut *self.tx)
            .await
            .map_err(Into::into)
            .and_then(at_most_one_row_updated)
    }

    async fn touch_aquarium(&mut self, id: AquariumId, dimension: Dimension, at: DateTime<Utc>) -> anyhow::Result<bool> {
        // GREATEST skips NULLs, so a missing timestamp is simply replaced
        let sql = match dimension {
            Dimension::Feed => "UPDATE Aquariums SET last_fed_time = GREATEST(last_fed_time, $2) WHERE id = $1",
            Dimension::Water => "UPDATE Aquariums SET last_water_change_time = GREATEST(last_water_change_time, $2) WHERE id = $1",
            Dimension::Clean => "UPDATE Aquariums SET last_cleaned_time = GREATEST(last_cleaned_time, $2) WHERE id = $1",
        };
        sqlx::query(sql)
            .bind(id)
            .bind(at)
            .execute(&mut *self.tx)
            .await
            .map_err(Into::into)
            .and_then(at_most_one_row_updated)
    }

    async fn delete_aquarium(&mut self, id: AquariumId) -> anyhow::Result<bool> {
        sqlx::query("DELETE FROM Aquariums WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(Into::into)
            .and_then(at_most_one_row_updated)
    }
}
