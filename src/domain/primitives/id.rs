use crate::id;

id! {
    AquariumId,
    BackgroundId,
    FishTypeId,
    OwnedFishId,
    RelationshipId
}

/// Opaque account identifier, issued by the registration flow.
#[derive(
    Clone,
    Debug, derive_more::Display,
    PartialEq, Eq, Hash, PartialOrd, Ord,
    derive_more::From,
    serde::Serialize, serde::Deserialize,
    sqlx::Type
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match, used by the user search.
    pub fn contains_ignore_case(&self, keyword: &str) -> bool {
        self.0.to_lowercase().contains(&keyword.to_lowercase())
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_contains_ignore_case() {
        let uid = UserId::from("NemoFan42");
        assert!(uid.contains_ignore_case("nemo"));
        assert!(uid.contains_ignore_case("FAN"));
        assert!(uid.contains_ignore_case(""));
        assert!(!uid.contains_ignore_case("dory"));
    }

    #[test]
    fn test_parse_numeric_id() {
        let id: RelationshipId = "17".parse().expect("must be parsed");
        assert_eq!(id.value(), 17);
        assert_eq!(id, RelationshipId::new(17));
    }
}
