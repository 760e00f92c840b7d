//! Entity model
//!
//! An entity is a resolved identity merging one or more records. It may be
//! created before any of its records are attached (a `related` reference can
//! arrive first), so every attribute except the id starts out absent.

use serde::{Deserialize, Serialize};

use super::record::RecordType;

/// Prefix namespacing resolved entity ids away from record ids
pub const ENTITY_PREFIX: &str = "sz_";

/// Node id for a resolved entity id from the ER export
pub fn entity_node_id(resolved_id: &str) -> String {
    format!("{}{}", ENTITY_PREFIX, resolved_id.trim())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entity {
    id: String,

    /// Type inherited from the last resolved record
    entity_type: Option<RecordType>,

    name: Option<String>,

    /// Most frequent country among resolved records
    country: Option<String>,
}

impl Entity {
    /// Create an entity with only its id known
    pub fn new(id: String) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn entity_type(&self) -> Option<RecordType> {
        self.entity_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn is_person(&self) -> bool {
        self.entity_type == Some(RecordType::Person)
    }

    pub fn is_organization(&self) -> bool {
        self.entity_type == Some(RecordType::Organization)
    }

    pub(crate) fn set_entity_type(&mut self, entity_type: Option<RecordType>) {
        self.entity_type = entity_type;
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub(crate) fn set_country(&mut self, country: Option<String>) {
        self.country = country;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_node_id_is_namespaced() {
        assert_eq!(entity_node_id(" 42 "), "sz_42");
    }

    #[test]
    fn test_new_entity_has_no_attributes() {
        let ent = Entity::new("sz_1".to_string());
        assert_eq!(ent.entity_type(), None);
        assert_eq!(ent.name(), None);
        assert_eq!(ent.country(), None);
        assert!(!ent.is_person());
        assert!(!ent.is_organization());
    }
}
