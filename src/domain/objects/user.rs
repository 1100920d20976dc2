use serde::Serialize;
use crate::domain::primitives::{AquariumId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub nickname: String,
    pub level: u32,
    pub fish_tickets: u32,
    pub main_aquarium: Option<AquariumId>,
    pub main_fish_image: Option<String>,
    pub active: bool,
}

impl User {
    /// A freshly registered, active account without any aquarium.
    pub fn new(id: impl Into<UserId>, nickname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nickname: nickname.into(),
            level: 1,
            fish_tickets: 0,
            main_aquarium: None,
            main_fish_image: None,
            active: true,
        }
    }

    pub fn with_tickets(self, fish_tickets: u32) -> Self {
        Self { fish_tickets, ..self }
    }

    pub fn inactive(self) -> Self {
        Self { active: false, ..self }
    }
}
