use thiserror::Error;

/// Dense index of a variable inside a [`ConstraintProblem`].
pub type VarId = usize;

/// Values still considered legal for one variable.
pub type Domain<V> = Vec<V>;

/// A constraint over exactly two variables.
///
/// The predicate receives the values in scope order: `first` belongs to
/// `scope().0`, `second` to `scope().1`.
pub trait BinaryConstraint<V> {
    fn scope(&self) -> (VarId, VarId);

    fn is_satisfied(&self, first: &V, second: &V) -> bool;

    /// The endpoint opposite to `var`, or `None` when `var` is not in scope.
    fn neighbor_of(&self, var: VarId) -> Option<VarId> {
        match self.scope() {
            (a, b) if a == var => Some(b),
            (a, b) if b == var => Some(a),
            _ => None,
        }
    }

    /// Checks the predicate with `value` bound to `var` and `other` bound to
    /// the opposite endpoint.
    fn allows(&self, var: VarId, value: &V, other: &V) -> bool {
        if self.scope().0 == var {
            self.is_satisfied(value, other)
        } else {
            self.is_satisfied(other, value)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("constraint {constraint} references unknown variable {var} (only {count} declared)")]
    UnknownVariable {
        constraint: usize,
        var: VarId,
        count: usize,
    },
    #[error("constraint {constraint} binds variable {var} to itself")]
    SelfLoop { constraint: usize, var: VarId },
}

/// Partial mapping from variables to values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<V> {
    values: Vec<Option<V>>,
    assigned: usize,
}

impl<V> Assignment<V> {
    pub fn new(variable_count: usize) -> Self {
        Self {
            values: (0..variable_count).map(|_| None).collect(),
            assigned: 0,
        }
    }

    pub fn get(&self, var: VarId) -> Option<&V> {
        self.values[var].as_ref()
    }

    pub fn is_assigned(&self, var: VarId) -> bool {
        self.values[var].is_some()
    }

    pub fn assign(&mut self, var: VarId, value: V) {
        if self.values[var].replace(value).is_none() {
            self.assigned += 1;
        }
    }

    pub fn unassign(&mut self, var: VarId) {
        if self.values[var].take().is_some() {
            self.assigned -= 1;
        }
    }

    /// Number of assigned variables.
    pub fn len(&self) -> usize {
        self.assigned
    }

    pub fn is_empty(&self) -> bool {
        self.assigned == 0
    }

    pub fn is_complete(&self) -> bool {
        self.assigned == self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &V)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(var, value)| value.as_ref().map(|v| (var, v)))
    }

    /// Values indexed by variable, if every variable is assigned.
    pub fn into_complete(self) -> Option<Vec<V>> {
        self.values.into_iter().collect()
    }
}

/// Variables, their initial domains and the binary constraints between them.
///
/// Read-only once built; the search works on its own copy of the domains.
#[derive(Debug, Clone)]
pub struct ConstraintProblem<V, C> {
    domains: Vec<Domain<V>>,
    constraints: Vec<C>,
    incident: Vec<Vec<usize>>,
}

impl<V, C: BinaryConstraint<V>> ConstraintProblem<V, C> {
    /// Builds a problem with one variable per entry of `domains`.
    pub fn new(domains: Vec<Domain<V>>, constraints: Vec<C>) -> Result<Self, ModelError> {
        let count = domains.len();
        let mut incident = vec![Vec::new(); count];

        for (idx, constraint) in constraints.iter().enumerate() {
            let (a, b) = constraint.scope();
            for var in [a, b] {
                if var >= count {
                    return Err(ModelError::UnknownVariable {
                        constraint: idx,
                        var,
                        count,
                    });
                }
            }
            if a == b {
                return Err(ModelError::SelfLoop { constraint: idx, var: a });
            }
            incident[a].push(idx);
            incident[b].push(idx);
        }

        Ok(Self {
            domains,
            constraints,
            incident,
        })
    }

    pub fn variable_count(&self) -> usize {
        self.domains.len()
    }

    pub fn variables(&self) -> std::ops::Range<VarId> {
        0..self.domains.len()
    }

    pub fn domains(&self) -> &[Domain<V>] {
        &self.domains
    }

    pub fn constraints(&self) -> &[C] {
        &self.constraints
    }

    /// Constraints whose scope contains `var`.
    pub fn constraints_on(&self, var: VarId) -> impl Iterator<Item = &C> + '_ {
        self.incident[var].iter().map(|&idx| &self.constraints[idx])
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{BinaryConstraint, VarId};

    /// Constraint backed by a plain predicate, for engine tests.
    #[derive(Debug, Clone)]
    pub struct Rule {
        pub first: VarId,
        pub second: VarId,
        pub allowed: fn(u8, u8) -> bool,
    }

    impl Rule {
        pub fn new(first: VarId, second: VarId, allowed: fn(u8, u8) -> bool) -> Self {
            Self {
                first,
                second,
                allowed,
            }
        }

        pub fn different(first: VarId, second: VarId) -> Self {
            Self::new(first, second, |a, b| a != b)
        }
    }

    impl BinaryConstraint<u8> for Rule {
        fn scope(&self) -> (VarId, VarId) {
            (self.first, self.second)
        }

        fn is_satisfied(&self, first: &u8, second: &u8) -> bool {
            (self.allowed)(*first, *second)
        }
    }
}
