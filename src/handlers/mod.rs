mod friends;
mod gifting;
mod aquariums;
pub mod sweep;

#[cfg(test)]
mod test;

use std::sync::Arc;
use crate::config::AppConfig;
use crate::domain::Clock;
use crate::notifier::Notifier;
use crate::repo::Storage;

pub use friends::*;
pub use gifting::*;
pub use aquariums::*;

/// The engines, wired to the same storage, notifier and clock.
#[derive(Clone)]
pub struct Services {
    pub friends: FriendshipService,
    pub gifting: GiftingService,
    pub aquariums: AquariumService,
}

impl Services {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        Self {
            friends: FriendshipService::new(storage.clone(), notifier.clone()),
            gifting: GiftingService::new(storage.clone(), notifier),
            aquariums: AquariumService::new(storage, clock, config.intervals),
        }
    }
}
