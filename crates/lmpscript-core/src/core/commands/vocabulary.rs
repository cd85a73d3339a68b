use crate::core::models::criteria::Criteria;
use crate::core::models::operator::PrimitiveOp;
use crate::core::models::value::Value;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// The keywords of the simulator's scripting language used to render group commands.
///
/// The defaults produce LAMMPS syntax. A TOML file only needs to list the keywords that
/// differ, for example:
///
/// ```toml
/// group-command = "grp"
/// empty = "none"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Vocabulary {
    pub group_command: String,
    pub variable_command: String,
    pub by_type: String,
    pub by_id: String,
    pub by_region: String,
    pub by_variable: String,
    pub empty: String,
    pub clear: String,
    pub union: String,
    pub intersect: String,
    pub subtract: String,
}

const INLINE_ORIGIN: &str = "<inline>";

#[derive(Debug, Error)]
pub enum VocabularyError {
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
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            group_command: "group".to_string(),
            variable_command: "variable".to_string(),
            by_type: "type".to_string(),
            by_id: "id".to_string(),
            by_region: "region".to_string(),
            by_variable: "variable".to_string(),
            empty: "empty".to_string(),
            clear: "clear".to_string(),
            union: "union".to_string(),
            intersect: "intersect".to_string(),
            subtract: "subtract".to_string(),
        }
    }
}

impl Vocabulary {
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let content = std::fs::read_to_string(path).map_err(|e| VocabularyError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        parse_vocabulary(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, VocabularyError> {
        parse_vocabulary(content, INLINE_ORIGIN)
    }

    /// The keyword that follows the group name for a given `group` command style.
    ///
    /// Returns `None` for `variable`, which is a separate top-level command.
    pub fn keyword(&self, style: PrimitiveOp) -> Option<&str> {
        let keyword = match style {
            PrimitiveOp::Variable => return None,
            PrimitiveOp::ByType => &self.by_type,
            PrimitiveOp::ById => &self.by_id,
            PrimitiveOp::ByRegion => &self.by_region,
            PrimitiveOp::ByVariable => &self.by_variable,
            PrimitiveOp::Create => &self.empty,
            PrimitiveOp::Clear => &self.clear,
            PrimitiveOp::Union => &self.union,
            PrimitiveOp::Intersect => &self.intersect,
            PrimitiveOp::Subtract => &self.subtract,
        };
        Some(keyword)
    }

    /// Renders the command line for an operation named `name`.
    ///
    /// The layout is `<command> <name> <keyword> <args...>`; `variable` commands have no
    /// keyword and take their style from the first argument.
    pub fn render(&self, name: &str, criteria: &Criteria) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(criteria.args.len() + 3);
        match self.keyword(criteria.style) {
            Some(keyword) => {
                parts.push(self.group_command.clone());
                parts.push(name.to_string());
                parts.push(keyword.to_string());
            }
            None => {
                parts.push(self.variable_command.clone());
                parts.push(name.to_string());
            }
        }
        parts.extend(criteria.args.iter().map(render_arg));
        parts.join(" ")
    }
}

fn parse_vocabulary(content: &str, origin: &str) -> Result<Vocabulary, VocabularyError> {
    toml::from_str(content).map_err(|e| VocabularyError::Toml {
        path: origin.to_string(),
        source: e,
    })
}

/// Replaces the name word of a rendered `<command> <name> ...` line.
///
/// Returns `None` if the second word of `code` is not `old_name`.
pub(crate) fn rename_command(code: &str, old_name: &str, new_name: &str) -> Option<String> {
    let (command, rest) = code.split_once(' ')?;
    let tail = rest.strip_prefix(old_name)?;
    if !tail.is_empty() && !tail.starts_with(' ') {
        return None;
    }
    Some(format!("{} {}{}", command, new_name, tail))
}

/// Strings with embedded whitespace are quoted so they stay a single script word.
fn render_arg(value: &Value) -> String {
    match value {
        Value::Str(s) if s.contains(char::is_whitespace) && !is_quoted(s) => {
            format!("\"{}\"", s)
        }
        Value::List(items) => items.iter().map(render_arg).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
}
