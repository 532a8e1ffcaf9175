use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceRole {
    Owner,
    Moderator,
    #[default]
    Member,
}

impl SpaceRole {
    pub fn can_moderate(self) -> bool {
        matches!(self, SpaceRole::Owner | SpaceRole::Moderator)
    }
}

/// A collaboration space the user belongs to, with their role in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: SpaceRole,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_role_defaults_to_member() {
        let space: Space = serde_json::from_str(r#"{"id": "space-1", "name": "Design"}"#).unwrap();
        assert_eq!(space.role, SpaceRole::Member);
        assert!(!space.role.can_moderate());
        assert!(SpaceRole::Owner.can_moderate());
        assert!(SpaceRole::Moderator.can_moderate());
    }
}
