use super::operand::Operand;
use super::operator::{ArgCount, PrimitiveOp};
use super::value::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The parameters a primitive operation was built from.
///
/// Criteria are the round-trippable description of a finalized operation: the command
/// text and the operand list are both derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Criteria {
    pub style: PrimitiveOp,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CriteriaError {
    #[error("'{style}' expects {expected} argument(s), found {found}")]
    Arity {
        style: PrimitiveOp,
        expected: ArgCount,
        found: usize,
    },

    #[error("'{style}' expects a name at argument {position}, found '{found}'")]
    ExpectedName {
        style: PrimitiveOp,
        position: usize,
        found: Value,
    },

    #[error("'{style}' argument {position} is empty")]
    EmptyArgument { style: PrimitiveOp, position: usize },
}

impl Criteria {
    pub fn new(style: PrimitiveOp, args: Vec<Value>) -> Self {
        Self { style, args }
    }

    /// Checks argument count and argument types against the command style.
    ///
    /// Lists count as the number of items they flatten to, and no argument may render to an
    /// empty word. Region, variable, and group references must be strings; the leading
    /// argument of a `variable` command is its style keyword and must be a string as well.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        let expected = self.style.arg_count();
        let found = self.args.iter().map(Value::word_count).sum();
        if !expected.accepts(found) {
            return Err(CriteriaError::Arity {
                style: self.style,
                expected,
                found,
            });
        }

        if let Some(position) = self.args.iter().position(Value::is_blank) {
            return Err(CriteriaError::EmptyArgument {
                style: self.style,
                position,
            });
        }

        let named_positions = match self.style {
            PrimitiveOp::ByRegion | PrimitiveOp::ByVariable | PrimitiveOp::Variable => 0..1,
            PrimitiveOp::Union | PrimitiveOp::Intersect | PrimitiveOp::Subtract => {
                0..self.args.len()
            }
            PrimitiveOp::ByType | PrimitiveOp::ById | PrimitiveOp::Create | PrimitiveOp::Clear => {
                0..0
            }
        };

        for position in named_positions {
            let arg = &self.args[position];
            if !arg.is_str() {
                return Err(CriteriaError::ExpectedName {
                    style: self.style,
                    position,
                    found: arg.clone(),
                });
            }
        }
        Ok(())
    }

    /// The operand list of an operation built from these criteria.
    pub fn operands(&self) -> Vec<Operand> {
        if self.style.is_set_operation() {
            self.args
                .iter()
                .map(|arg| Operand::Group(arg.to_string()))
                .collect()
        } else {
            self.args.iter().cloned().map(Operand::Value).collect()
        }
    }
}
