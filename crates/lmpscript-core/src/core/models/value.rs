use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal argument of a primitive operation, such as an atom type, an id range,
/// or the name of a region or variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Number of script words this value renders to; lists count their flattened items.
    pub fn word_count(&self) -> usize {
        match self {
            Value::List(items) => items.iter().map(Value::word_count).sum(),
            _ => 1,
        }
    }

    /// Whether this value, or any item of a list, would render to nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty() || items.iter().any(Value::is_blank),
            Value::Int(_) | Value::Float(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_flattens_nested_lists() {
        assert_eq!(Value::Int(3).word_count(), 1);
        assert_eq!(Value::from(vec![1, 2, 3]).word_count(), 3);
        assert_eq!(
            Value::List(vec![Value::from("a"), Value::from(vec![1, 2])]).word_count(),
            3
        );
        assert_eq!(Value::List(vec![]).word_count(), 0);
    }

    #[test]
    fn blank_values_render_to_nothing() {
        assert!(Value::from("").is_blank());
        assert!(Value::List(vec![]).is_blank());
        assert!(Value::List(vec![Value::Int(1), Value::from("")]).is_blank());
        assert!(!Value::from("box").is_blank());
        assert!(!Value::Int(0).is_blank());
    }

    #[test]
    fn display_renders_scalars_verbatim() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::from("10:20").to_string(), "10:20");
    }

    #[test]
    fn display_flattens_lists_with_spaces() {
        let value = Value::from(vec![Value::Int(1), Value::from(vec![2, 3]), Value::from("4*")]);
        assert_eq!(value.to_string(), "1 2 3 4*");
    }

    #[test]
    fn as_str_only_matches_strings() {
        assert_eq!(Value::from("box").as_str(), Some("box"));
        assert_eq!(Value::Int(1).as_str(), None);
        assert!(!Value::Float(1.0).is_str());
    }

    #[test]
    fn untagged_deserialization_picks_the_natural_variant() {
        #[derive(Deserialize)]
        struct Doc {
            args: Vec<Value>,
        }
        let doc: Doc = toml::from_str(r#"args = [1, 2.5, "box", [3, 4]]"#).unwrap();
        assert_eq!(
            doc.args,
            vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("box"),
                Value::from(vec![3, 4]),
            ]
        );
    }
}
