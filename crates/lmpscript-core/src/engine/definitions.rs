use super::error::GroupError;
use super::registry::GroupRegistry;
use crate::core::models::criteria::Criteria;
use crate::core::models::operator::PrimitiveOp;
use crate::core::models::value::Value;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const INLINE_ORIGIN: &str = "<inline>";

/// One `[[group]]` table of a group definition file.
///
/// ```toml
/// [[group]]
/// name = "water"
/// style = "bytype"
/// args = [1, 2]
///
/// [[group]]
/// name = "dry"
/// style = "subtract"
/// args = ["all", "water"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDefinition {
    pub name: String,
    pub style: PrimitiveOp,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionFile {
    #[serde(default, rename = "group")]
    groups: Vec<GroupDefinition>,
}

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid group definition #{index}: {source}")]
    Group {
        index: usize,
        #[source]
        source: GroupError,
    },
}

impl GroupDefinition {
    pub fn criteria(&self) -> Criteria {
        Criteria::new(self.style, self.args.clone())
    }
}

impl GroupRegistry {
    /// Builds a registry from a TOML group definition file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or contains a
    /// definition the registry rejects.
    pub fn load_definitions(path: &Path) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path).map_err(|e| DefinitionError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let definitions = parse_definitions(&content, &path.to_string_lossy())?;
        let mut registry = Self::new();
        registry.apply_definitions(definitions)?;
        Ok(registry)
    }

    pub fn from_definitions_str(content: &str) -> Result<Self, DefinitionError> {
        let definitions = parse_definitions(content, INLINE_ORIGIN)?;
        let mut registry = Self::new();
        registry.apply_definitions(definitions)?;
        Ok(registry)
    }

    /// Registers definitions in order.
    ///
    /// Either every definition is registered or, on the first rejected one, none are.
    ///
    /// # Return
    ///
    /// The number of registered definitions.
    pub fn apply_definitions(
        &mut self,
        definitions: impl IntoIterator<Item = GroupDefinition>,
    ) -> Result<usize, DefinitionError> {
        let mut staged = self.clone();
        let mut count = 0;
        for (index, definition) in definitions.into_iter().enumerate() {
            staged
                .define(&definition.name, definition.criteria())
                .map_err(|source| DefinitionError::Group { index, source })?;
            count += 1;
        }
        *self = staged;
        debug!("Applied {} group definition(s)", count);
        Ok(count)
    }

    /// Describes every registered operation as a definition, in registry order.
    pub fn definitions(&self) -> Vec<GroupDefinition> {
        self.iter()
            .filter_map(|op| {
                op.criteria().map(|criteria| GroupDefinition {
                    name: op.name().to_string(),
                    style: criteria.style,
                    args: criteria.args.clone(),
                })
            })
            .collect()
    }

    pub fn to_definitions_string(&self) -> Result<String, DefinitionError> {
        let file = DefinitionFile {
            groups: self.definitions(),
        };
        Ok(toml::to_string(&file)?)
    }
}

fn parse_definitions(content: &str, origin: &str) -> Result<Vec<GroupDefinition>, DefinitionError> {
    let file: DefinitionFile = toml::from_str(content).map_err(|e| DefinitionError::Toml {
        path: origin.to_string(),
        source: e,
    })?;
    Ok(file.groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::criteria::CriteriaError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[[group]]
name = "water"
style = "bytype"
args = [1, 2]

[[group]]
name = "inner"
style = "byregion"
args = ["box"]

[[group]]
name = "wet_core"
style = "intersect"
args = ["water", "inner"]

[[group]]
name = "dry"
style = "subtract"
args = ["all", "water"]

[[group]]
name = "scratch"
style = "create"
"#;

    #[test]
    fn definitions_are_registered_in_file_order() {
        let groups = GroupRegistry::from_definitions_str(SAMPLE).unwrap();
        assert_eq!(
            groups.code(),
            [
                "group water type 1 2",
                "group inner region box",
                "group wet_core intersect water inner",
                "group dry subtract all water",
                "group scratch empty",
            ]
            .join("\n")
        );
    }

    #[test]
    fn load_definitions_reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let groups = GroupRegistry::load_definitions(file.path()).unwrap();
        assert_eq!(groups.len(), 5);
        assert_eq!(groups.find("dry"), Some(3));
    }

    #[test]
    fn written_definitions_reload_to_the_same_script() {
        let mut groups = GroupRegistry::from_definitions_str(SAMPLE).unwrap();
        let mut expr = groups.get("water").unwrap() + groups.get("inner").unwrap();
        groups.evaluate("either", &mut expr).unwrap();

        let written = groups.to_definitions_string().unwrap();
        let reloaded = GroupRegistry::from_definitions_str(&written).unwrap();

        assert_eq!(reloaded.code(), groups.code());
        assert_eq!(reloaded.definitions(), groups.definitions());
    }

    #[test]
    fn ill_typed_region_is_reported_with_its_position() {
        let content = r#"
[[group]]
name = "ok"
style = "create"

[[group]]
name = "inner"
style = "byregion"
args = [3]
"#;
        match GroupRegistry::from_definitions_str(content) {
            Err(DefinitionError::Group {
                index: 1,
                source:
                    GroupError::InvalidCriteria {
                        name,
                        source: CriteriaError::ExpectedName { .. },
                    },
            }) => assert_eq!(name, "inner"),
            other => panic!("expected an invalid criteria error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_style_is_a_parse_error() {
        let content = r#"
[[group]]
name = "x"
style = "bymolecule"
args = [1]
"#;
        assert!(matches!(
            GroupRegistry::from_definitions_str(content),
            Err(DefinitionError::Toml { path, .. }) if path == INLINE_ORIGIN
        ));
    }

    #[test]
    fn apply_definitions_is_all_or_nothing() {
        let mut groups = GroupRegistry::new();
        groups.create("water").unwrap();
        let definitions = vec![
            GroupDefinition {
                name: "ions".to_string(),
                style: PrimitiveOp::ByType,
                args: vec![Value::Int(3)],
            },
            GroupDefinition {
                name: "water".to_string(),
                style: PrimitiveOp::ByType,
                args: vec![Value::Int(1)],
            },
        ];

        let err = groups.apply_definitions(definitions).unwrap_err();

        assert!(matches!(
            err,
            DefinitionError::Group {
                index: 1,
                source: GroupError::NameInUse { .. }
            }
        ));
        assert_eq!(groups.len(), 1);
        assert!(!groups.contains("ions"));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = GroupRegistry::load_definitions(&dir.path().join("groups.toml"));
        assert!(matches!(result, Err(DefinitionError::Io { .. })));
    }
}
