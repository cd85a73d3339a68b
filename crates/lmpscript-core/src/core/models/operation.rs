use super::criteria::Criteria;
use super::operand::Operand;
use super::operator::{AlgebraicOp, Operator, PrimitiveOp};
use crate::core::utils::naming::{hash_name, join_identities, prefix_for};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A node of an atom-group expression.
///
/// An operation is in one of two states:
///
/// - **Finalized**: its operator is a [`PrimitiveOp`], it carries the command line it emits
///   (`code`) and the [`Criteria`] it was built from, and it has been registered in a
///   [`GroupRegistry`](crate::engine::registry::GroupRegistry) under its `name`.
/// - **Unevaluated**: its operator is an [`AlgebraicOp`] produced by `+`, `-` or `*`. Its
///   name is a content hash of the operator and operand identities, and its `code` is empty
///   until [`GroupRegistry::evaluate`](crate::engine::registry::GroupRegistry::evaluate)
///   lowers it.
///
/// Composition flattens chains of the same operator, so `a + b + c` is a single three-way
/// union rather than two nested binary ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    operator: Operator,
    operands: Vec<Operand>,
    name: String,
    code: String,
    criteria: Option<Criteria>,
}

impl Operation {
    /// Creates an unevaluated node named after its own content.
    pub fn algebraic(operator: AlgebraicOp, operands: Vec<Operand>) -> Self {
        let mut operation = Self {
            operator: Operator::Algebraic(operator),
            operands,
            name: String::new(),
            code: String::new(),
            criteria: None,
        };
        operation.refresh_name();
        operation
    }

    /// Creates a finalized node; only the registry builds these, after validating `criteria`.
    pub(crate) fn finalized(name: &str, criteria: Criteria, code: String) -> Self {
        Self {
            operator: Operator::Primitive(criteria.style),
            operands: criteria.operands(),
            name: name.to_string(),
            code,
            criteria: Some(criteria),
        }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub(crate) fn operands_mut(&mut self) -> &mut [Operand] {
        &mut self.operands
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn criteria(&self) -> Option<&Criteria> {
        self.criteria.as_ref()
    }

    /// Returns the primitive tag of a finalized operation.
    pub fn primitive(&self) -> Option<PrimitiveOp> {
        match self.operator {
            Operator::Primitive(op) => Some(op),
            Operator::Algebraic(_) => None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.operator.is_finalized()
    }

    pub fn is_unary(&self) -> bool {
        self.operands.len() == 1
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }

    /// The operand identities joined in order.
    pub fn identity(&self) -> String {
        let identities: Vec<_> = self.operands.iter().map(Operand::identity).collect();
        join_identities(identities.iter().map(|s| &**s))
    }

    /// How this operation appears when used as an operand of another one: its name once
    /// finalized, otherwise the joined identities of its own operands.
    pub fn proper_operand(&self) -> String {
        if self.is_finalized() {
            self.name.clone()
        } else {
            self.identity()
        }
    }

    /// Appends an operand in place.
    ///
    /// Unevaluated nodes are renamed to match their new content. Finalized nodes are not
    /// meant to be mutated; their name and code are left untouched.
    pub fn append(&mut self, operand: impl Into<Operand>) {
        self.operands.push(operand.into());
        self.refresh_name();
    }

    pub fn extend<I>(&mut self, operands: I)
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        self.operands.extend(operands.into_iter().map(Into::into));
        self.refresh_name();
    }

    /// Union of `self` and `other`; sugar: `self + other`.
    pub fn union_with(self, other: Operation) -> Operation {
        self.operate(other, AlgebraicOp::Union)
    }

    /// Atoms of `self` that are not in `other`; sugar: `self - other`.
    pub fn subtract(self, other: Operation) -> Operation {
        self.operate(other, AlgebraicOp::Subtract)
    }

    /// Atoms in both `self` and `other`; sugar: `self * other`.
    pub fn intersect(self, other: Operation) -> Operation {
        self.operate(other, AlgebraicOp::Intersect)
    }

    /// A left operand with the same operator absorbs `other`. A right operand with the same
    /// operator absorbs `self` only for `+` and `*`; `-` flattens on the left alone, since
    /// `a - (b - c)` is not `a - b - c`.
    fn operate(mut self, mut other: Operation, op: AlgebraicOp) -> Operation {
        let target = Operator::Algebraic(op);

        if self.operator == target {
            if other.operator == target && op.is_associative() {
                let spliced = std::mem::take(&mut other.operands);
                self.extend(spliced);
            } else {
                self.append(other);
            }
            return self;
        }

        if other.operator == target && op.is_associative() {
            other.operands.insert(0, Operand::from(self));
            other.refresh_name();
            return other;
        }

        Operation::algebraic(op, vec![Operand::from(self), Operand::from(other)])
    }

    fn refresh_name(&mut self) {
        if let Operator::Algebraic(op) = self.operator {
            let symbol = op.symbol();
            self.name = hash_name(symbol, &self.identity(), prefix_for(symbol));
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Operator::Algebraic(op) = self.operator else {
            return f.write_str(&self.name);
        };
        match self.operands.as_slice() {
            [] => write!(f, "{}()", op.symbol()),
            [only] => write!(f, "{}{}", op.symbol(), only),
            operands => {
                f.write_str("(")?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op.symbol())?;
                    }
                    write!(f, "{}", operand)?;
                }
                f.write_str(")")
            }
        }
    }
}

macro_rules! impl_group_operator {
    ($trait:ident, $method:ident, $inherent:ident) => {
        impl $trait for Operation {
            type Output = Operation;

            fn $method(self, rhs: Operation) -> Operation {
                self.$inherent(rhs)
            }
        }

        impl $trait<&Operation> for Operation {
            type Output = Operation;

            fn $method(self, rhs: &Operation) -> Operation {
                self.$inherent(rhs.clone())
            }
        }

        impl $trait<Operation> for &Operation {
            type Output = Operation;

            fn $method(self, rhs: Operation) -> Operation {
                self.clone().$inherent(rhs)
            }
        }

        impl $trait<&Operation> for &Operation {
            type Output = Operation;

            fn $method(self, rhs: &Operation) -> Operation {
                self.clone().$inherent(rhs.clone())
            }
        }
    };
}

impl_group_operator!(Add, add, union_with);
impl_group_operator!(Sub, sub, subtract);
impl_group_operator!(Mul, mul, intersect);
