use super::operation::Operation;
use super::value::Value;
use std::borrow::Cow;
use std::fmt;

/// One slot in an operation's operand list.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal argument, rendered verbatim.
    Value(Value),
    /// A reference by name to a group that is (or will be) defined in the script.
    Group(String),
    /// An owned, not yet evaluated subexpression.
    Expr(Box<Operation>),
}

impl Operand {
    pub fn group(name: impl Into<String>) -> Self {
        Operand::Group(name.into())
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Operand::Value(value.into())
    }

    /// The string that identifies this operand in hashes and in rendered commands.
    ///
    /// Group references and nested expressions are identified by name, literals by
    /// their textual form.
    pub fn identity(&self) -> Cow<'_, str> {
        match self {
            Operand::Value(value) => Cow::Owned(value.to_string()),
            Operand::Group(name) => Cow::Borrowed(name),
            Operand::Expr(operation) => Cow::Borrowed(operation.name()),
        }
    }

    pub fn as_expr(&self) -> Option<&Operation> {
        match self {
            Operand::Expr(operation) => Some(operation),
            _ => None,
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

/// Finalized operations are referenced by name; unevaluated ones are nested by value.
impl From<Operation> for Operand {
    fn from(operation: Operation) -> Self {
        if operation.is_finalized() {
            Operand::Group(operation.name().to_string())
        } else {
            Operand::Expr(Box::new(operation))
        }
    }
}

impl From<&Operation> for Operand {
    fn from(operation: &Operation) -> Self {
        if operation.is_finalized() {
            Operand::Group(operation.name().to_string())
        } else {
            Operand::Expr(Box::new(operation.clone()))
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Expr(operation) => write!(f, "{}", operation),
            _ => f.write_str(&self.identity()),
        }
    }
}
