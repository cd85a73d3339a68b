use super::error::GroupError;
use crate::core::commands::vocabulary::{Vocabulary, rename_command};
use crate::core::models::criteria::Criteria;
use crate::core::models::ids::OperationId;
use crate::core::models::operation::Operation;
use crate::core::models::operator::PrimitiveOp;
use crate::core::models::value::Value;
use slotmap::SlotMap;
use std::collections::HashMap;
use std::ops::Index;
use tracing::debug;

/// Addresses a registered operation either by name or by position.
///
/// Negative positions count from the end, so `Position(-1)` is the most recently
/// registered operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Name(String),
    Position(isize),
}

/// An ordered, name-unique collection of finalized group operations.
///
/// The registry is the system of record for the group section of a generated script:
/// [`GroupRegistry::code`] joins the command of every registered operation in insertion
/// order, which is also an order in which every group is defined before it is referenced.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    /// Arena owning every registered operation.
    operations: SlotMap<OperationId, Operation>,
    /// Insertion order; the only source of positions.
    order: Vec<OperationId>,
    /// Lookup map from group name to its arena key.
    name_index: HashMap<String, OperationId>,
    /// Keywords used to render commands.
    vocabulary: Vocabulary,
}

impl GroupRegistry {
    /// Creates an empty registry that renders LAMMPS syntax.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry that renders commands with a custom vocabulary.
    pub fn with_vocabulary(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            ..Self::default()
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Returns an iterator over the registered operations in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.order.iter().map(|&id| &self.operations[id])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(Operation::name)
    }

    /// Finds the position of a group by name.
    ///
    /// # Return
    ///
    /// Returns `Some(index)` if the group exists, otherwise `None`.
    pub fn find(&self, name: &str) -> Option<usize> {
        let id = self.name_index.get(name)?;
        self.order.iter().position(|other| other == id)
    }

    pub fn try_get(&self, name: &str) -> Option<&Operation> {
        self.name_index.get(name).map(|&id| &self.operations[id])
    }

    /// Retrieves a registered operation by name.
    ///
    /// # Errors
    ///
    /// Returns [`GroupError::NotFound`] if no group has this name.
    pub fn get(&self, name: &str) -> Result<&Operation, GroupError> {
        self.try_get(name).ok_or_else(|| GroupError::NotFound {
            name: name.to_string(),
        })
    }

    /// Retrieves a registered operation by position; negative indices count from the end.
    ///
    /// # Errors
    ///
    /// Returns [`GroupError::IndexOutOfRange`] if the position does not exist.
    pub fn at(&self, index: isize) -> Result<&Operation, GroupError> {
        let len = self.order.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs())
        };
        resolved
            .filter(|&i| i < len)
            .map(|i| &self.operations[self.order[i]])
            .ok_or(GroupError::IndexOutOfRange { index, len })
    }

    pub fn lookup(&self, key: impl Into<GroupKey>) -> Result<&Operation, GroupError> {
        match key.into() {
            GroupKey::Name(name) => self.get(&name),
            GroupKey::Position(index) => self.at(index),
        }
    }

    /// Joins the commands of all registered operations, one per line, in registry order.
    pub fn code(&self) -> String {
        self.iter()
            .map(Operation::code)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The command emitted by a single registered operation.
    pub fn code_of(&self, name: &str) -> Result<&str, GroupError> {
        self.get(name).map(Operation::code)
    }

    /// Returns `(name, command)` pairs in registry order, for emitting each group as an
    /// independent script step.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().map(|op| (op.name(), op.code()))
    }

    /// Validates `criteria`, renders its command, and registers the resulting operation.
    ///
    /// Every factory method funnels through here.
    ///
    /// # Errors
    ///
    /// - [`GroupError::NameInUse`] if `name` is already registered.
    /// - [`GroupError::InvalidCriteria`] if the arguments do not fit the command style.
    ///
    /// Nothing is registered when an error is returned.
    pub fn define(&mut self, name: &str, criteria: Criteria) -> Result<Operation, GroupError> {
        self.ensure_available(name)?;
        criteria
            .validate()
            .map_err(|source| GroupError::InvalidCriteria {
                name: name.to_string(),
                source,
            })?;

        let code = self.vocabulary.render(name, &criteria);
        let operation = Operation::finalized(name, criteria, code);
        debug!("Registered group '{}': {}", name, operation.code());
        self.insert(operation.clone());
        Ok(operation)
    }

    /// Registers an already finalized operation, e.g. one taken from another registry.
    ///
    /// The stored command is kept verbatim.
    pub fn add(&mut self, operation: Operation) -> Result<(), GroupError> {
        if !operation.is_finalized() {
            return Err(GroupError::Unfinalized {
                name: operation.name().to_string(),
            });
        }
        self.ensure_available(operation.name())?;
        debug!("Added finalized group '{}'", operation.name());
        self.insert(operation);
        Ok(())
    }

    pub fn bytype<I>(&mut self, name: &str, types: I) -> Result<Operation, GroupError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let args = types.into_iter().map(Into::into).collect();
        self.define(name, Criteria::new(PrimitiveOp::ByType, args))
    }

    pub fn byid<I>(&mut self, name: &str, ids: I) -> Result<Operation, GroupError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let args = ids.into_iter().map(Into::into).collect();
        self.define(name, Criteria::new(PrimitiveOp::ById, args))
    }

    /// Selects the atoms inside a region; the region must be given by name.
    pub fn byregion(
        &mut self,
        name: &str,
        region: impl Into<Value>,
    ) -> Result<Operation, GroupError> {
        self.define(name, Criteria::new(PrimitiveOp::ByRegion, vec![region.into()]))
    }

    /// Selects the atoms for which an atom-style variable is non-zero.
    pub fn byvariable(
        &mut self,
        name: &str,
        variable: impl Into<Value>,
    ) -> Result<Operation, GroupError> {
        self.define(
            name,
            Criteria::new(PrimitiveOp::ByVariable, vec![variable.into()]),
        )
    }

    /// Defines an empty group.
    pub fn create(&mut self, name: &str) -> Result<Operation, GroupError> {
        self.define(name, Criteria::new(PrimitiveOp::Create, Vec::new()))
    }

    /// Removes all atoms from a group at this point of the script.
    pub fn clear(&mut self, name: &str) -> Result<Operation, GroupError> {
        self.define(name, Criteria::new(PrimitiveOp::Clear, Vec::new()))
    }

    /// Defines a script variable, typically an `atom`-style one used by [`Self::byvariable`].
    pub fn variable<I>(&mut self, name: &str, style: &str, args: I) -> Result<Operation, GroupError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let args = std::iter::once(Value::from(style))
            .chain(args.into_iter().map(Into::into))
            .collect();
        self.define(name, Criteria::new(PrimitiveOp::Variable, args))
    }

    /// Union of the named groups; at least two members are required.
    pub fn union<I>(&mut self, name: &str, members: I) -> Result<Operation, GroupError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.set_operation(name, PrimitiveOp::Union, members)
    }

    /// Intersection of the named groups; at least two members are required.
    pub fn intersect<I>(&mut self, name: &str, members: I) -> Result<Operation, GroupError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.set_operation(name, PrimitiveOp::Intersect, members)
    }

    /// The first named group minus all following ones; at least two members are required.
    pub fn subtract<I>(&mut self, name: &str, members: I) -> Result<Operation, GroupError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.set_operation(name, PrimitiveOp::Subtract, members)
    }

    fn set_operation<I>(
        &mut self,
        name: &str,
        style: PrimitiveOp,
        members: I,
    ) -> Result<Operation, GroupError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        // Members may name simulator built-ins such as `all`, so they are not required
        // to be registered here.
        let args = members
            .into_iter()
            .map(|member| Value::from(member.as_ref()))
            .collect();
        self.define(name, Criteria::new(style, args))
    }

    /// Removes a group from the registry.
    ///
    /// # Return
    ///
    /// Returns the removed operation.
    ///
    /// # Errors
    ///
    /// Returns [`GroupError::NotFound`] if no group has this name.
    pub fn delete(&mut self, name: &str) -> Result<Operation, GroupError> {
        let not_found = || GroupError::NotFound {
            name: name.to_string(),
        };
        let id = self.name_index.remove(name).ok_or_else(not_found)?;
        self.order.retain(|&other| other != id);
        debug!("Deleted group '{}'", name);
        self.operations.remove(id).ok_or_else(not_found)
    }

    /// Registers a duplicate of `source` under `new_name`, appended at the end.
    ///
    /// The command is rendered for the new name from the source's criteria with this
    /// registry's vocabulary.
    pub fn copy(&mut self, source: &str, new_name: &str) -> Result<Operation, GroupError> {
        let criteria = self.criteria_of(source)?;
        debug!("Copying group '{}' to '{}'", source, new_name);
        self.define(new_name, criteria)
    }

    /// Renames a group in place, keeping its position.
    ///
    /// Only the name word of the stored command changes, so a command imported through
    /// [`Self::add`] keeps its keywords. Operations that reference the old name are not
    /// rewritten.
    ///
    /// # Errors
    ///
    /// - [`GroupError::NotFound`] if `old_name` does not exist.
    /// - [`GroupError::SameName`] if both names are equal.
    /// - [`GroupError::NameInUse`] if `new_name` is taken.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<(), GroupError> {
        let id = *self
            .name_index
            .get(old_name)
            .ok_or_else(|| GroupError::NotFound {
                name: old_name.to_string(),
            })?;
        if old_name == new_name {
            return Err(GroupError::SameName {
                name: old_name.to_string(),
            });
        }
        self.ensure_available(new_name)?;

        let criteria = self.criteria_of(old_name)?;
        let code = rename_command(self.operations[id].code(), old_name, new_name)
            .unwrap_or_else(|| self.vocabulary.render(new_name, &criteria));
        self.operations[id] = Operation::finalized(new_name, criteria, code);
        self.name_index.remove(old_name);
        self.name_index.insert(new_name.to_string(), id);
        debug!("Renamed group '{}' to '{}'", old_name, new_name);
        Ok(())
    }

    /// Moves a group to `position`, preserving the relative order of all other groups.
    ///
    /// # Errors
    ///
    /// - [`GroupError::NotFound`] if no group has this name.
    /// - [`GroupError::IndexOutOfRange`] if `position` is not a valid index.
    pub fn reindex(&mut self, name: &str, position: usize) -> Result<(), GroupError> {
        let current = self.find(name).ok_or_else(|| GroupError::NotFound {
            name: name.to_string(),
        })?;
        let len = self.order.len();
        if position >= len {
            return Err(GroupError::IndexOutOfRange {
                index: isize::try_from(position).unwrap_or(isize::MAX),
                len,
            });
        }
        let id = self.order.remove(current);
        self.order.insert(position, id);
        debug!("Moved group '{}' from {} to {}", name, current, position);
        Ok(())
    }

    pub(crate) fn ensure_available(&self, name: &str) -> Result<(), GroupError> {
        if self.contains(name) {
            return Err(GroupError::NameInUse {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn criteria_of(&self, name: &str) -> Result<Criteria, GroupError> {
        self.get(name)?
            .criteria()
            .cloned()
            .ok_or_else(|| GroupError::Unfinalized {
                name: name.to_string(),
            })
    }

    fn insert(&mut self, operation: Operation) {
        let name = operation.name().to_string();
        let id = self.operations.insert(operation);
        self.order.push(id);
        self.name_index.insert(name, id);
    }
}

impl From<&str> for GroupKey {
    fn from(name: &str) -> Self {
        GroupKey::Name(name.to_string())
    }
}

impl From<String> for GroupKey {
    fn from(name: String) -> Self {
        GroupKey::Name(name)
    }
}

impl From<isize> for GroupKey {
    fn from(index: isize) -> Self {
        GroupKey::Position(index)
    }
}

impl From<i32> for GroupKey {
    fn from(index: i32) -> Self {
        GroupKey::Position(index as isize)
    }
}

impl Index<&str> for GroupRegistry {
    type Output = Operation;

    fn index(&self, name: &str) -> &Operation {
        match self.get(name) {
            Ok(operation) => operation,
            Err(e) => panic!("{}", e),
        }
    }
}

impl Index<isize> for GroupRegistry {
    type Output = Operation;

    fn index(&self, index: isize) -> &Operation {
        match self.at(index) {
            Ok(operation) => operation,
            Err(e) => panic!("{}", e),
        }
    }
}

impl Index<usize> for GroupRegistry {
    type Output = Operation;

    fn index(&self, index: usize) -> &Operation {
        let len = self.order.len();
        match self.order.get(index) {
            Some(&id) => &self.operations[id],
            None => panic!(
                "{}",
                GroupError::IndexOutOfRange {
                    index: isize::try_from(index).unwrap_or(isize::MAX),
                    len,
                }
            ),
        }
    }
}

impl<'a> IntoIterator for &'a GroupRegistry {
    type Item = &'a Operation;
    type IntoIter = Box<dyn Iterator<Item = &'a Operation> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
