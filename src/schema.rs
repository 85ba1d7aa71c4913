//! Annotation schema configuration.
//!
//! The bootstrap layer hands the core a schema declaring which entity
//! labels exist (with optional keyboard shortcut, display color, and
//! hierarchy level) and which relation types are allowed between them.
//! Validation gates startup: a schema that references unknown entities or
//! claims a reserved shortcut is rejected before any annotation happens.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::Tag;
use crate::error::{Error, Result};

/// Shortcut characters claimed by built-in commands (undo, un-label,
/// span info, detail delete, relation pick). Entity shortcuts must not
/// collide with these.
pub const RESERVED_SHORTCUTS: [char; 5] = ['z', 'q', 's', 'd', 'e'];

/// A declared entity label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Label name (e.g. `PER`).
    pub name: String,
    /// Keyboard shortcut assigned to this label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<char>,
    /// Display color hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Hierarchy level for nested labeling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

/// An allowed `(start, end)` entity pairing for a relation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEnds {
    /// Entity name allowed on the source side.
    pub start: String,
    /// Entity name allowed on the target side.
    pub end: String,
}

/// A declared relation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation name (e.g. `born_in`).
    pub name: String,
    /// Entity pairings this relation may connect.
    #[serde(default)]
    pub entities: Vec<RelationEnds>,
}

/// The full annotation schema: entities plus optional relations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Declared entity labels.
    #[serde(default)]
    pub entities: Vec<EntityDef>,
    /// Declared relation types.
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

impl Schema {
    /// Parse a schema from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a schema from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load and validate a schema from a `.json`, `.yml`, or `.yaml`
    /// file.
    ///
    /// # Errors
    ///
    /// [`Error::FileNotFound`] when the path does not exist,
    /// [`Error::Config`] for unsupported extensions or validation
    /// failures, parse errors otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let schema = match extension.as_str() {
            "json" => Self::from_json_str(&text)?,
            "yml" | "yaml" => Self::from_yaml_str(&text)?,
            _ => {
                return Err(Error::config(format!(
                    "unsupported config format for {}",
                    path.display()
                )))
            }
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Validate the schema.
    ///
    /// Rules: at least one entity; entity names non-blank and unique;
    /// shortcuts unique and not among [`RESERVED_SHORTCUTS`]; relation
    /// names non-blank; every relation endpoint names a declared entity.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] naming the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.entities.is_empty() {
            return Err(Error::config("config must declare at least one entity"));
        }
        let mut names: Vec<&str> = Vec::new();
        let mut shortcuts: Vec<char> = Vec::new();
        for entity in &self.entities {
            if entity.name.trim().is_empty() {
                return Err(Error::config("entity name must not be blank"));
            }
            if names.contains(&entity.name.as_str()) {
                return Err(Error::config(format!(
                    "duplicate entity name {}",
                    entity.name
                )));
            }
            names.push(&entity.name);
            if let Some(shortcut) = entity.shortcut {
                let key = shortcut.to_ascii_lowercase();
                if RESERVED_SHORTCUTS.contains(&key) {
                    return Err(Error::config(format!(
                        "shortcut {key} for entity {} is reserved for a command key",
                        entity.name
                    )));
                }
                if shortcuts.contains(&key) {
                    return Err(Error::config(format!(
                        "shortcut {key} assigned to more than one entity"
                    )));
                }
                shortcuts.push(key);
            }
        }
        for relation in &self.relations {
            if relation.name.trim().is_empty() {
                return Err(Error::config("relation name must not be blank"));
            }
            for ends in &relation.entities {
                for endpoint in [&ends.start, &ends.end] {
                    if !names.contains(&endpoint.as_str()) {
                        return Err(Error::config(format!(
                            "relation {} references unknown entity {endpoint}",
                            relation.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Look up an entity definition by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Look up a relation definition by name.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Look up the entity assigned to a shortcut key.
    #[must_use]
    pub fn entity_by_shortcut(&self, shortcut: char) -> Option<&EntityDef> {
        let key = shortcut.to_ascii_lowercase();
        self.entities
            .iter()
            .find(|e| e.shortcut.map(|s| s.to_ascii_lowercase()) == Some(key))
    }

    /// Build the [`Tag`] a declared entity applies, with its configured
    /// color and level filled in.
    #[must_use]
    pub fn tag_for(&self, name: &str) -> Option<Tag> {
        let entity = self.entity(name)?;
        let mut tag = Tag::new(&entity.name);
        if let Some(color) = &entity.color {
            tag = tag.with_color(color);
        }
        if let Some(level) = entity.level {
            tag = tag.with_level(level);
        }
        Some(tag)
    }

    /// Whether a relation type allows the given entity pairing.
    #[must_use]
    pub fn allows_relation(&self, name: &str, start_entity: &str, end_entity: &str) -> bool {
        self.relation(name).is_some_and(|r| {
            r.entities
                .iter()
                .any(|ends| ends.start == start_entity && ends.end == end_entity)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema {
            entities: vec![
                EntityDef {
                    name: "PER".into(),
                    shortcut: Some('p'),
                    color: Some("DarkBlue".into()),
                    level: Some(1),
                },
                EntityDef {
                    name: "LOC".into(),
                    shortcut: None,
                    color: None,
                    level: None,
                },
            ],
            relations: vec![RelationDef {
                name: "born_in".into(),
                entities: vec![RelationEnds {
                    start: "PER".into(),
                    end: "LOC".into(),
                }],
            }],
        }
    }

    #[test]
    fn test_valid_schema_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_unknown_relation_endpoint_rejected() {
        let mut schema = sample();
        schema.relations[0].entities[0].end = "ORG".into();
        assert!(matches!(schema.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_reserved_shortcut_rejected() {
        let mut schema = sample();
        schema.entities[0].shortcut = Some('z');
        assert!(matches!(schema.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_shortcut_rejected() {
        let mut schema = sample();
        schema.entities[1].shortcut = Some('P');
        assert!(matches!(schema.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_entities_rejected() {
        let schema = Schema::default();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_tag_for_fills_configured_fields() {
        let schema = sample();
        let tag = schema.tag_for("PER").unwrap();
        assert_eq!(tag.color, "DarkBlue");
        assert_eq!(tag.level, 1);
        let tag = schema.tag_for("LOC").unwrap();
        assert_eq!(tag.color, crate::document::DEFAULT_TAG_COLOR);
        assert!(schema.tag_for("ORG").is_none());
    }

    #[test]
    fn test_allows_relation() {
        let schema = sample();
        assert!(schema.allows_relation("born_in", "PER", "LOC"));
        assert!(!schema.allows_relation("born_in", "LOC", "PER"));
        assert!(!schema.allows_relation("works_at", "PER", "LOC"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let yaml = "entities:\n  - name: PER\n    shortcut: p\n  - name: LOC\nrelations:\n  - name: born_in\n    entities:\n      - start: PER\n        end: LOC\n";
        let schema = Schema::from_yaml_str(yaml).unwrap();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.entities.len(), 2);
        assert_eq!(schema.entity_by_shortcut('P').unwrap().name, "PER");
    }
}
