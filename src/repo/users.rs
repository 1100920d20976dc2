use anyhow::Context;
use async_trait::async_trait;
use num_traits::ToPrimitive;
use crate::domain::{AquariumId, DomainAssertionError, User, UserId};
use super::{at_most_one_row_updated, ensure_only_one_row_updated, PgTx, UserStore};

const SELECT_USERS: &str = "SELECT id, nickname, level, fish_ticket, main_aquarium_id, main_fish_image, status FROM Users";

#[derive(sqlx::FromRow)]
struct UserEntity {
    id: UserId,
    nickname: String,
    level: i32,
    fish_ticket: i32,
    main_aquarium_id: Option<AquariumId>,
    main_fish_image: Option<String>,
    status: bool,
}

impl TryFrom<UserEntity> for User {
    type Error = DomainAssertionError<i32>;

    fn try_from(value: UserEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            nickname: value.nickname,
            level: value.level.to_u32()
                .ok_or(DomainAssertionError::new(value.level, "level must not be negative"))?,
            fish_tickets: value.fish_ticket.to_u32()
                .ok_or(DomainAssertionError::new(value.fish_ticket, "fish_ticket must not be negative"))?,
            main_aquarium: value.main_aquarium_id,
            main_fish_image: value.main_fish_image,
            active: value.status,
        })
    }
}

fn to_users(entities: Vec<UserEntity>) -> anyhow::Result<Vec<User>> {
    entities.into_iter()
        .map(|e| User::try_from(e).map_err(Into::into))
        .collect()
}

#[async_trait]
impl UserStore for PgTx {
    async fn create_user(&mut self, user: &User) -> anyhow::Result<()> {
        let level: i32 = user.level.try_into()?;
        let fish_ticket: i32 = user.fish_tickets.try_into()?;
        sqlx::query("INSERT INTO Users (id, nickname, level, fish_ticket, main_aquarium_id, main_fish_image, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(&user.id)
            .bind(&user.nickname)
            .bind(level)
            .bind(fish_ticket)
            .bind(user.main_aquarium)
            .bind(&user.main_fish_image)
            .bind(user.active)
            .execute(&mut *self.tx)
            .await
            .context(format!("couldn't create the user {}", user.id))
            .and_then(ensure_only_one_row_updated)?;
        Ok(())
    }

    async fn get_user(&mut self, id: &UserId) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, UserEntity>(&format!("{SELECT_USERS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(User::try_from)
            .transpose()
            .map_err(Into::into)
    }

    async fn find_users_by_id_substring(&mut self, keyword: &str) -> anyhow::Result<Vec<User>> {
        let entities = sqlx::query_as::<_, UserEntity>(&format!(
                "{SELECT_USERS} WHERE strpos(lower(id), lower($1)) > 0 ORDER BY id"))
            .bind(keyword)
            .fetch_all(&mut *self.tx)
            .await?;
        to_users(entities)
    }

    async fn find_non_friends(&mut self, user: &UserId) -> anyhow::Result<Vec<User>> {
        let entities = sqlx::query_as::<_, UserEntity>(&format!(
                "{SELECT_USERS} u WHERE u.id <> $1 AND NOT EXISTS (
                    SELECT 1 FROM Friend_Relationships f
                    WHERE (f.friend1_id = $1 AND f.friend2_id = u.id)
                       OR (f.friend1_id = u.id AND f.friend2_id = $1)
                ) ORDER BY u.id"))
            .bind(user)
            .fetch_all(&mut *self.tx)
            .await?;
        to_users(entities)
    }

    async fn adjust_tickets(&mut self, user: &UserId, delta: i32) -> anyhow::Result<Option<u32>> {
        let balance = sqlx::query_scalar::<_, i32>(
                "UPDATE Users SET fish_ticket = (fish_ticket + $2)
                    WHERE id = $1 AND fish_ticket + $2 >= 0
                    RETURNING fish_ticket")
            .bind(user)
            .bind(delta)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(balance.and_then(|b| b.to_u32()))
    }

    async fn set_main_aquarium(&mut self, user: &UserId, aquarium: Option<AquariumId>) -> anyhow::Result<bool> {
        sqlx::query("UPDATE Users SET main_aquarium_id = $2 WHERE id = $1")
            .bind(user)
            .bind(aquarium)
            .execute(&mut *self.tx)
            .await
            .map_err(Into::into)
            .and_then(at_most_one_row_updated)
    }
}
