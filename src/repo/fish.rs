use anyhow::Context;
use async_trait::async_trait;
use crate::domain::{AquariumId, FishCount, FishType, FishTypeId, NewFishType, OwnedFish, OwnedFishDetails, OwnedFishId, UserId};
use super::{at_most_one_row_updated, FishStore, PgTx};

const FISH_TYPE_COLUMNS: &str = "id, fish_name AS name, image_url AS image, rarity, size";
const OWNED_FISH_COLUMNS: &str = "id, fish_type_id AS fish_type, user_id AS owner, aquarium_id AS aquarium";

#[derive(sqlx::FromRow)]
struct OwnedFishWithType {
    id: OwnedFishId,
    owner: UserId,
    aquarium: Option<AquariumId>,
    fish_type: FishTypeId,
    name: String,
    image: Option<String>,
    rarity: String,
    size: String,
}

impl From<OwnedFishWithType> for OwnedFishDetails {
    fn from(value: OwnedFishWithType) -> Self {
        Self {
            fish: OwnedFish {
                id: value.id,
                fish_type: value.fish_type,
                owner: value.owner,
                aquarium: value.aquarium,
            },
            fish_type: FishType {
                id: value.fish_type,
                name: value.name,
                image: value.image,
                rarity: value.rarity,
                size: value.size,
            },
        }
    }
}

#[async_trait]
impl FishStore for PgTx {
    async fn get_fish_type(&mut self, id: FishTypeId) -> anyhow::Result<Option<FishType>> {
        sqlx::query_as::<_, FishType>(&format!("SELECT {FISH_TYPE_COLUMNS} FROM Fish_Types WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(Into::into)
    }

    async fn create_fish_type(&mut self, fish_type: NewFishType) -> anyhow::Result<FishType> {
        sqlx::query_as::<_, FishType>(&format!(
                "INSERT INTO Fish_Types (fish_name, image_url, rarity, size) VALUES ($1, $2, $3, $4)
                    RETURNING {FISH_TYPE_COLUMNS}"))
            .bind(&fish_type.name)
            .bind(&fish_type.image)
            .bind(&fish_type.rarity)
            .bind(&fish_type.size)
            .fetch_one(&mut *self.tx)
            .await
            .context(format!("couldn't create the fish type '{}'", fish_type.name))
    }

    async fn create_owned_fish(&mut self, owner: &UserId, fish_type: FishTypeId) -> anyhow::Result<OwnedFish> {
        sqlx::query_as::<_, OwnedFish>(&format!(
                "INSERT INTO User_Fish (fish_type_id, user_id) VALUES ($1, $2)
                    RETURNING {OWNED_FISH_COLUMNS}"))
            .bind(fish_type)
            .bind(owner)
            .fetch_one(&mut *self.tx)
            .await
            .context(format!("couldn't give a fish of type {fish_type} to {owner}"))
    }

    async fn get_owned_fish(&mut self, id: OwnedFishId) -> anyhow::Result<Option<OwnedFish>> {
        sqlx::query_as::<_, OwnedFish>(&format!("SELECT {OWNED_FISH_COLUMNS} FROM User_Fish WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(Into::into)
    }

    async fn find_owned_fish(&mut self, owner: &UserId) -> anyhow::Result<Vec<OwnedFishDetails>> {
        let rows = sqlx::query_as::<_, OwnedFishWithType>(
                "SELECT uf.id, uf.user_id AS owner, uf.aquarium_id AS aquarium, ft.id AS fish_type,
                        ft.fish_name AS name, ft.image_url AS image, ft.rarity, ft.size
                    FROM User_Fish uf
                    JOIN Fish_Types ft ON ft.id = uf.fish_type_id
                    WHERE uf.user_id = $1
                    ORDER BY ft.id, uf.id")
            .bind(owner)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_fish_in_aquarium(&mut self, owner: &UserId, aquarium: AquariumId) -> anyhow::Result<Vec<OwnedFishDetails>> {
        let rows = sqlx::query_as::<_, OwnedFishWithType>(
                "SELECT uf.id, uf.user_id AS owner, uf.aquarium_id AS aquarium, ft.id AS fish_type,
                        ft.fish_name AS name, ft.image_url AS image, ft.rarity, ft.size
                    FROM User_Fish uf
                    JOIN Fish_Types ft ON ft.id = uf.fish_type_id
                    WHERE uf.user_id = $1 AND uf.aquarium_id = $2
                    ORDER BY ft.id, uf.id")
            .bind(owner)
            .bind(aquarium)
            .fetch_all(&mut *self.tx)
            .await
            .with_context(|| format!("couldn't fetch the fish of {owner} in the aquarium {aquarium}"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn owns_fish_named(&mut self, owner: &UserId, name: &str) -> anyhow::Result<bool> {
        sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (
                    SELECT 1 FROM User_Fish uf
                    JOIN Fish_Types ft ON ft.id = uf.fish_type_id
                    WHERE uf.user_id = $1 AND ft.fish_name = $2
                )")
            .bind(owner)
            .bind(name)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(Into::into)
    }

    async fn count_fish_in_aquarium(&mut self, aquarium: AquariumId) -> anyhow::Result<Vec<FishCount>> {
        sqlx::query_as::<_, FishCount>(
                "SELECT ft.id AS fish_type, ft.fish_name AS name, count(*) AS count
                    FROM User_Fish uf
                    JOIN Fish_Types ft ON ft.id = uf.fish_type_id
                    WHERE uf.aquarium_id = $1
                    GROUP BY ft.id, ft.fish_name
                    ORDER BY ft.id")
            .bind(aquarium)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(Into::into)
    }

    async fn place_fish(&mut self, fish: OwnedFishId, aquarium: Option<AquariumId>) -> anyhow::Result<bool> {
        sqlx::query("UPDATE User_Fish SET aquarium_id = $2 WHERE id = $1")
            .bind(fish)
            .bind(aquarium)
            .execute(&mut *self.tx)
            .await
            .map_err(Into::into)
            .and_then(at_most_one_row_updated)
    }

    async fn release_fish_from_aquarium(&mut self, aquarium: AquariumId) -> anyhow::Result<u64> {
        let res = sqlx::query("UPDATE User_Fish SET aquarium_id = NULL WHERE aquarium_id = $1")
            .bind(aquarium)
            .execute(&mut *self.tx)
            .await?;
        Ok(res.rows_affected())
    }
}
