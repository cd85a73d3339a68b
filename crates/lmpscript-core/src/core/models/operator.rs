use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tag of a finalized operation that maps one-to-one onto a simulator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveOp {
    Variable,
    ByVariable,
    ByRegion,
    ByType,
    ById,
    Create,
    Clear,
    Union,
    Intersect,
    Subtract,
}

/// Tag of an unevaluated node produced by the `+`, `-` and `*` operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgebraicOp {
    Union,     // +
    Subtract,  // -
    Intersect, // *
}

/// The operator of an [`Operation`](super::operation::Operation).
///
/// The two families encode the finalization state: an operation is finalized exactly
/// when its operator is [`Operator::Primitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Primitive(PrimitiveOp),
    Algebraic(AlgebraicOp),
}

/// How many arguments a primitive command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgCount {
    None,
    Exactly(usize),
    AtLeast(usize),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown operator: '{0}'")]
pub struct ParseOperatorError(pub String);

static OPERATOR_TAGS: Map<&'static str, Operator> = phf_map! {
    "variable" => Operator::Primitive(PrimitiveOp::Variable),
    "byvariable" => Operator::Primitive(PrimitiveOp::ByVariable),
    "byregion" => Operator::Primitive(PrimitiveOp::ByRegion),
    "bytype" => Operator::Primitive(PrimitiveOp::ByType),
    "byid" => Operator::Primitive(PrimitiveOp::ById),
    "create" => Operator::Primitive(PrimitiveOp::Create),
    "clear" => Operator::Primitive(PrimitiveOp::Clear),
    "union" => Operator::Primitive(PrimitiveOp::Union),
    "intersect" => Operator::Primitive(PrimitiveOp::Intersect),
    "subtract" => Operator::Primitive(PrimitiveOp::Subtract),
    "+" => Operator::Algebraic(AlgebraicOp::Union),
    "-" => Operator::Algebraic(AlgebraicOp::Subtract),
    "*" => Operator::Algebraic(AlgebraicOp::Intersect),
};

impl PrimitiveOp {
    pub fn tag(self) -> &'static str {
        match self {
            PrimitiveOp::Variable => "variable",
            PrimitiveOp::ByVariable => "byvariable",
            PrimitiveOp::ByRegion => "byregion",
            PrimitiveOp::ByType => "bytype",
            PrimitiveOp::ById => "byid",
            PrimitiveOp::Create => "create",
            PrimitiveOp::Clear => "clear",
            PrimitiveOp::Union => "union",
            PrimitiveOp::Intersect => "intersect",
            PrimitiveOp::Subtract => "subtract",
        }
    }

    /// Returns `true` for commands whose arguments are names of other groups.
    pub fn is_set_operation(self) -> bool {
        matches!(
            self,
            PrimitiveOp::Union | PrimitiveOp::Intersect | PrimitiveOp::Subtract
        )
    }

    pub fn arg_count(self) -> ArgCount {
        match self {
            PrimitiveOp::Create | PrimitiveOp::Clear => ArgCount::None,
            PrimitiveOp::ByRegion | PrimitiveOp::ByVariable => ArgCount::Exactly(1),
            PrimitiveOp::Variable | PrimitiveOp::ByType | PrimitiveOp::ById => {
                ArgCount::AtLeast(1)
            }
            PrimitiveOp::Union | PrimitiveOp::Intersect | PrimitiveOp::Subtract => {
                ArgCount::AtLeast(2)
            }
        }
    }
}

impl AlgebraicOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AlgebraicOp::Union => "+",
            AlgebraicOp::Subtract => "-",
            AlgebraicOp::Intersect => "*",
        }
    }

    /// The primitive command this operator is lowered to during evaluation.
    pub fn lowered(self) -> PrimitiveOp {
        match self {
            AlgebraicOp::Union => PrimitiveOp::Union,
            AlgebraicOp::Subtract => PrimitiveOp::Subtract,
            AlgebraicOp::Intersect => PrimitiveOp::Intersect,
        }
    }

    /// Whether chains of this operator may be flattened from either side.
    ///
    /// Subtraction only flattens on the left: `(a - b) - c` equals `a - b - c`,
    /// while `a - (b - c)` does not.
    pub fn is_associative(self) -> bool {
        !matches!(self, AlgebraicOp::Subtract)
    }
}

impl Operator {
    pub fn is_finalized(self) -> bool {
        matches!(self, Operator::Primitive(_))
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Primitive(op) => op.tag(),
            Operator::Algebraic(op) => op.symbol(),
        }
    }
}

impl fmt::Display for ArgCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgCount::None => f.write_str("no arguments"),
            ArgCount::Exactly(n) => write!(f, "exactly {}", n),
            ArgCount::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

impl ArgCount {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            ArgCount::None => count == 0,
            ArgCount::Exactly(n) => count == n,
            ArgCount::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for PrimitiveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATOR_TAGS
            .get(s.trim())
            .copied()
            .ok_or_else(|| ParseOperatorError(s.to_string()))
    }
}

impl FromStr for PrimitiveOp {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Operator>()? {
            Operator::Primitive(op) => Ok(op),
            Operator::Algebraic(_) => Err(ParseOperatorError(s.to_string())),
        }
    }
}

impl From<PrimitiveOp> for Operator {
    fn from(op: PrimitiveOp) -> Self {
        Operator::Primitive(op)
    }
}

impl From<AlgebraicOp> for Operator {
    fn from(op: AlgebraicOp) -> Self {
        Operator::Algebraic(op)
    }
}
