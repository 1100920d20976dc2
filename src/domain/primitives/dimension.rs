use strum_macros::{Display, EnumIter, EnumString};
use crate::notifier::NotificationKind;

/// An independently decaying aspect of aquarium upkeep.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Dimension {
    Feed,
    Water,
    Clean,
}

impl Dimension {
    pub fn notification_kind(self) -> NotificationKind {
        match self {
            Dimension::Feed => NotificationKind::Feed,
            Dimension::Water => NotificationKind::Water,
            Dimension::Clean => NotificationKind::Clean,
        }
    }
}
