use super::error::GroupError;
use super::registry::GroupRegistry;
use crate::core::models::criteria::Criteria;
use crate::core::models::operand::Operand;
use crate::core::models::operation::Operation;
use crate::core::models::operator::Operator;
use crate::core::models::value::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

impl GroupRegistry {
    /// Lowers an expression into primitive commands and registers it under `name`.
    ///
    /// Nested unevaluated subexpressions are registered first, depth-first and under their
    /// content-derived names, so every command only references groups defined before it.
    /// On success `expr` has been rewritten in place into the finalized operation that was
    /// registered as `name`.
    ///
    /// An already finalized `expr` is not lowered again: under its own name this is a
    /// no-op, under any other name the registered entry is copied and `expr` is left as is.
    /// This also applies to an expression that was finalized by an earlier call.
    ///
    /// # Errors
    ///
    /// - [`GroupError::NameInUse`] if `name` is already registered, or if a nested
    ///   subexpression's name equals `name` or is taken by a group with different content.
    /// - [`GroupError::InvalidCriteria`] if some node of the expression has fewer than two
    ///   operands, or an operand that renders to an empty word.
    /// - [`GroupError::NotFound`] if a finalized `expr` is copied but its source is not
    ///   registered here.
    ///
    /// Every error is detected before the registry changes.
    pub fn evaluate(&mut self, name: &str, expr: &mut Operation) -> Result<(), GroupError> {
        if expr.is_finalized() && expr.name() == name {
            debug!("Group '{}' is already finalized; nothing to evaluate", name);
            return Ok(());
        }
        self.ensure_available(name)?;

        if expr.is_finalized() {
            let source = expr.name().to_string();
            self.copy(&source, name)?;
            return Ok(());
        }

        self.plan(name, expr)?;
        debug!("Evaluating '{}' as {}", name, expr);
        self.lower(name, expr, false)
    }

    /// Checks every node the lowering of `expr` would register, without registering any.
    fn plan(&self, target: &str, expr: &Operation) -> Result<(), GroupError> {
        let mut planned = HashMap::new();
        self.plan_nested(target, expr, &mut planned)?;
        if let Some(criteria) = lowered_criteria(expr) {
            validate(target, &criteria)?;
        }
        Ok(())
    }

    fn plan_nested(
        &self,
        target: &str,
        expr: &Operation,
        planned: &mut HashMap<String, Criteria>,
    ) -> Result<(), GroupError> {
        for inner in expr.operands().iter().filter_map(Operand::as_expr) {
            if inner.is_finalized() {
                continue;
            }
            let Some(criteria) = lowered_criteria(inner) else {
                continue;
            };
            self.plan_nested(target, inner, planned)?;
            validate(inner.name(), &criteria)?;

            let name = inner.name();
            let in_use = || GroupError::NameInUse {
                name: name.to_string(),
            };
            if name == target {
                return Err(in_use());
            }
            if let Some(existing) = self.try_get(name) {
                if existing.criteria() != Some(&criteria) {
                    return Err(in_use());
                }
            }
            match planned.get(name) {
                Some(other) if other != &criteria => return Err(in_use()),
                Some(_) => {}
                None => {
                    planned.insert(name.to_string(), criteria);
                }
            }
        }
        Ok(())
    }

    fn lower(&mut self, name: &str, expr: &mut Operation, reuse: bool) -> Result<(), GroupError> {
        for operand in expr.operands_mut() {
            if let Operand::Expr(inner) = operand {
                if !inner.is_finalized() {
                    let inner_name = inner.name().to_string();
                    trace!("Lowering nested expression '{}'", inner_name);
                    self.lower(&inner_name, inner, true)?;
                }
            }
        }
        let Some(criteria) = lowered_criteria(expr) else {
            return Ok(());
        };

        // Nested names are content hashes, so an entry under the same name with the same
        // criteria is the same subexpression lowered by an earlier evaluation.
        if reuse {
            if let Some(existing) = self.try_get(name) {
                if existing.criteria() == Some(&criteria) {
                    trace!("Reusing registered group '{}'", name);
                    *expr = existing.clone();
                    return Ok(());
                }
                return Err(GroupError::NameInUse {
                    name: name.to_string(),
                });
            }
        }

        *expr = self.define(name, criteria)?;
        Ok(())
    }
}

/// The primitive set command an unevaluated node lowers to.
///
/// Nested expressions are referenced by their own name, which lowering leaves unchanged.
fn lowered_criteria(expr: &Operation) -> Option<Criteria> {
    let Operator::Algebraic(op) = expr.operator() else {
        return None;
    };
    let members = expr
        .operands()
        .iter()
        .map(|operand| match operand {
            Operand::Expr(inner) => Value::Str(inner.name().to_string()),
            Operand::Group(group) => Value::Str(group.clone()),
            Operand::Value(value) => Value::Str(value.to_string()),
        })
        .collect();
    Some(Criteria::new(op.lowered(), members))
}

fn validate(name: &str, criteria: &Criteria) -> Result<(), GroupError> {
    criteria
        .validate()
        .map_err(|source| GroupError::InvalidCriteria {
            name: name.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::criteria::CriteriaError;
    use crate::core::models::operator::{AlgebraicOp, PrimitiveOp};

    fn registry_with_three_groups() -> (GroupRegistry, Operation, Operation, Operation) {
        let mut groups = GroupRegistry::new();
        let o1 = groups.create("o1").unwrap();
        let o2 = groups.create("o2").unwrap();
        let o3 = groups.create("o3").unwrap();
        (groups, o1, o2, o3)
    }

    mod lowering {
        use super::*;

        #[test]
        fn union_then_subtract_emits_five_commands_in_order() {
            let (mut groups, o1, o2, o3) = registry_with_three_groups();
            let union_name = (&o1 + &o2).name().to_string();
            let mut expr = &o1 + &o2 - &o3;

            groups.evaluate("s", &mut expr).unwrap();

            let expected = [
                "group o1 empty".to_string(),
                "group o2 empty".to_string(),
                "group o3 empty".to_string(),
                format!("group {} union o1 o2", union_name),
                format!("group s subtract {} o3", union_name),
            ]
            .join("\n");
            assert_eq!(groups.code(), expected);
            assert_eq!(groups.len(), 5);
            assert_eq!(groups.at(3).unwrap().primitive(), Some(PrimitiveOp::Union));
            assert_eq!(groups.at(4).unwrap().name(), "s");
        }

        #[test]
        fn evaluated_expression_is_rewritten_in_place() {
            let (mut groups, o1, o2, o3) = registry_with_three_groups();
            let mut expr = &o1 + &o2 + &o3;

            groups.evaluate("all3", &mut expr).unwrap();

            assert!(expr.is_finalized());
            assert_eq!(expr.name(), "all3");
            assert_eq!(expr.primitive(), Some(PrimitiveOp::Union));
            assert_eq!(
                expr.operands(),
                &[
                    Operand::group("o1"),
                    Operand::group("o2"),
                    Operand::group("o3")
                ]
            );
            assert_eq!(expr.code(), "group all3 union o1 o2 o3");
            assert_eq!(groups.get("all3").unwrap(), &expr);
        }

        #[test]
        fn flattened_chain_emits_a_single_command() {
            let (mut groups, o1, o2, o3) = registry_with_three_groups();
            let mut expr = &o1 * &o2 * &o3;
            groups.evaluate("common", &mut expr).unwrap();
            assert_eq!(groups.len(), 4);
            assert_eq!(groups.code_of("common").unwrap(), "group common intersect o1 o2 o3");
        }

        #[test]
        fn deep_nesting_registers_dependencies_first() {
            let (mut groups, o1, o2, o3) = registry_with_three_groups();
            let o4 = groups.create("o4").unwrap();
            let left = &o1 + &o2;
            let right = &o3 * &o4;
            let mut expr = left.clone() - right.clone();

            groups.evaluate("result", &mut expr).unwrap();

            let tail: Vec<&str> = groups.names().skip(4).collect();
            assert_eq!(tail, vec![left.name(), right.name(), "result"]);
            assert_eq!(
                groups.code_of("result").unwrap(),
                format!("group result subtract {} {}", left.name(), right.name())
            );
        }

        #[test]
        fn raw_values_are_stringified() {
            let (mut groups, o1, _, _) = registry_with_three_groups();
            let mut expr = Operation::algebraic(
                AlgebraicOp::Union,
                vec![Operand::from(&o1), Operand::value("all")],
            );
            groups.evaluate("everything", &mut expr).unwrap();
            assert_eq!(
                groups.code_of("everything").unwrap(),
                "group everything union o1 all"
            );
        }

        #[test]
        fn shared_subexpression_is_registered_once() {
            let (mut groups, o1, o2, o3) = registry_with_three_groups();
            let shared = &o1 + &o2;
            let mut first = shared.clone() * &o3;
            let mut second = shared.clone() - &o3;

            groups.evaluate("first", &mut first).unwrap();
            groups.evaluate("second", &mut second).unwrap();

            assert_eq!(groups.len(), 6);
            assert_eq!(groups.names().filter(|n| *n == shared.name()).count(), 1);
            assert_eq!(
                groups.code_of("second").unwrap(),
                format!("group second subtract {} o3", shared.name())
            );
        }

        #[test]
        fn conflicting_content_under_a_nested_name_is_rejected_before_mutation() {
            let (mut groups, o1, o2, o3) = registry_with_three_groups();
            let o4 = groups.create("o4").unwrap();
            let right = &o3 + &o4;
            groups.create(right.name()).unwrap();
            let mut expr = (&o1 + &o2) - right.clone();
            let original = expr.clone();
            let before = groups.code();

            let err = groups.evaluate("s", &mut expr).unwrap_err();

            assert_eq!(
                err,
                GroupError::NameInUse {
                    name: right.name().to_string()
                }
            );
            assert_eq!(groups.len(), 5);
            assert_eq!(groups.code(), before);
            assert_eq!(expr, original);
        }

        #[test]
        fn target_equal_to_a_nested_name_is_rejected_before_mutation() {
            let (mut groups, o1, o2, o3) = registry_with_three_groups();
            let nested = &o1 + &o2;
            let mut expr = nested.clone() - &o3;

            let err = groups.evaluate(nested.name(), &mut expr).unwrap_err();

            assert_eq!(
                err,
                GroupError::NameInUse {
                    name: nested.name().to_string()
                }
            );
            assert_eq!(groups.len(), 3);
            assert!(!groups.contains(nested.name()));
            assert!(!expr.is_finalized());
        }

        #[test]
        fn empty_literal_operand_is_rejected_before_mutation() {
            let (mut groups, o1, o2, o3) = registry_with_three_groups();
            let blank = Operation::algebraic(
                AlgebraicOp::Union,
                vec![Operand::from(&o3), Operand::value("")],
            );
            let mut expr = (&o1 + &o2) * blank;

            let err = groups.evaluate("s", &mut expr).unwrap_err();

            assert!(matches!(
                err,
                GroupError::InvalidCriteria {
                    source: CriteriaError::EmptyArgument { position: 1, .. },
                    ..
                }
            ));
            assert_eq!(groups.len(), 3);
        }
    }

    mod finalization {
        use super::*;

        #[test]
        fn target_name_in_use_is_rejected_before_mutation() {
            let (mut groups, o1, o2, _) = registry_with_three_groups();
            let mut expr = (&o1 + &o2) - &o1;
            let before = groups.code();

            let err = groups.evaluate("o3", &mut expr).unwrap_err();

            assert_eq!(
                err,
                GroupError::NameInUse {
                    name: "o3".to_string()
                }
            );
            assert_eq!(groups.code(), before);
            assert!(!expr.is_finalized());
        }

        #[test]
        fn too_few_operands_are_rejected_before_mutation() {
            let (mut groups, o1, o2, _) = registry_with_three_groups();
            let lonely = Operation::algebraic(AlgebraicOp::Intersect, vec![Operand::from(&o2)]);
            let mut expr = Operation::algebraic(
                AlgebraicOp::Union,
                vec![Operand::from(&(&o1 + &o2)), Operand::from(lonely)],
            );

            let err = groups.evaluate("bad", &mut expr).unwrap_err();

            assert!(matches!(
                err,
                GroupError::InvalidCriteria {
                    source: CriteriaError::Arity { found: 1, .. },
                    ..
                }
            ));
            assert_eq!(groups.len(), 3);
        }

        #[test]
        fn re_evaluating_under_the_same_name_is_a_no_op() {
            let (mut groups, o1, o2, _) = registry_with_three_groups();
            let mut expr = &o1 + &o2;
            groups.evaluate("u", &mut expr).unwrap();
            let snapshot = groups.code();

            groups.evaluate("u", &mut expr).unwrap();

            assert!(expr.is_finalized());
            assert_eq!(groups.code(), snapshot);
        }

        #[test]
        fn evaluating_a_primitive_under_its_own_name_is_a_no_op() {
            let (mut groups, mut o1, _, _) = registry_with_three_groups();
            groups.evaluate("o1", &mut o1).unwrap();
            assert_eq!(groups.len(), 3);
        }

        #[test]
        fn evaluating_a_primitive_under_a_new_name_copies_it() {
            let (mut groups, mut o1, _, _) = registry_with_three_groups();
            groups.evaluate("o1_copy", &mut o1).unwrap();

            assert_eq!(o1.name(), "o1");
            assert_eq!(groups.len(), 4);
            assert_eq!(groups.code_of("o1_copy").unwrap(), "group o1_copy empty");
        }

        #[test]
        fn second_evaluation_under_another_name_copies_the_first_result() {
            let (mut groups, o1, o2, _) = registry_with_three_groups();
            let mut expr = &o1 + &o2;

            groups.evaluate("first", &mut expr).unwrap();
            groups.evaluate("second", &mut expr).unwrap();

            assert_eq!(expr.name(), "first");
            assert_eq!(groups.len(), 5);
            assert_eq!(groups.code_of("first").unwrap(), "group first union o1 o2");
            assert_eq!(groups.code_of("second").unwrap(), "group second union o1 o2");
        }

        #[test]
        fn copying_an_unregistered_primitive_fails() {
            let (mut source, o1, _, _) = registry_with_three_groups();
            let mut detached = source.delete("o2").unwrap();
            let mut groups = GroupRegistry::new();

            let err = groups.evaluate("x", &mut detached).unwrap_err();
            assert!(matches!(err, GroupError::NotFound { name } if name == "o2"));

            let mut also_detached = o1;
            assert!(groups.evaluate("y", &mut also_detached).is_err());
            assert!(groups.is_empty());
        }
    }
}
