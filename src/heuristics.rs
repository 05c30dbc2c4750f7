//! Variable and value ordering.

use crate::csp::{Assignment, BinaryConstraint, ConstraintProblem, Domain, VarId};
use itertools::Itertools;

/// Picks the unassigned variable with the fewest remaining values (MRV).
///
/// Ties go to the variable involved in the most constraints whose other
/// endpoint is still unassigned, then to the earliest declared variable.
pub fn select_unassigned_variable<V, C: BinaryConstraint<V>>(
    problem: &ConstraintProblem<V, C>,
    assignment: &Assignment<V>,
    domains: &[Domain<V>],
) -> Option<VarId> {
    let unassigned = problem
        .variables()
        .filter(|&var| !assignment.is_assigned(var))
        .collect_vec();
    let smallest = unassigned.iter().map(|&var| domains[var].len()).min()?;

    unassigned
        .into_iter()
        .filter(|&var| domains[var].len() == smallest)
        .max_by(|&a, &b| {
            // reversed index so that equal degrees favour the earlier variable
            degree(problem, assignment, a)
                .cmp(&degree(problem, assignment, b))
                .then(b.cmp(&a))
        })
}

/// Constraints on `var` whose other endpoint is unassigned.
pub fn degree<V, C: BinaryConstraint<V>>(
    problem: &ConstraintProblem<V, C>,
    assignment: &Assignment<V>,
    var: VarId,
) -> usize {
    problem
        .constraints_on(var)
        .filter_map(|c| c.neighbor_of(var))
        .filter(|&other| !assignment.is_assigned(other))
        .count()
}

/// Orders the working domain of `var` by least-constraining value first.
///
/// Each candidate is scored by how many values it would remove from the
/// domains of unassigned neighbours. The sort is stable, so equal scores
/// keep their domain order.
pub fn order_domain_values<V: Clone, C: BinaryConstraint<V>>(
    problem: &ConstraintProblem<V, C>,
    var: VarId,
    assignment: &Assignment<V>,
    domains: &[Domain<V>],
) -> Vec<V> {
    domains[var]
        .iter()
        .map(|value| (ruled_out(problem, var, value, assignment, domains), value))
        .sorted_by_key(|(count, _)| *count)
        .map(|(_, value)| value.clone())
        .collect()
}

fn ruled_out<V, C: BinaryConstraint<V>>(
    problem: &ConstraintProblem<V, C>,
    var: VarId,
    value: &V,
    assignment: &Assignment<V>,
    domains: &[Domain<V>],
) -> usize {
    problem
        .constraints_on(var)
        .filter_map(|c| c.neighbor_of(var).map(|other| (c, other)))
        .filter(|&(_, other)| !assignment.is_assigned(other))
        .map(|(c, other)| {
            domains[other]
                .iter()
                .filter(|candidate| !c.allows(var, value, candidate))
                .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::testing::Rule;

    fn problem(domains: Vec<Vec<u8>>, rules: Vec<Rule>) -> ConstraintProblem<u8, Rule> {
        ConstraintProblem::new(domains, rules).unwrap()
    }

    #[test]
    fn picks_smallest_domain() {
        let p = problem(vec![vec![1, 2, 3], vec![1, 2], vec![1, 2, 3]], vec![]);
        let assignment = Assignment::new(3);
        assert_eq!(
            select_unassigned_variable(&p, &assignment, p.domains()),
            Some(1)
        );
    }

    #[test]
    fn breaks_ties_by_degree_then_declaration_order() {
        let p = problem(
            vec![vec![1, 2], vec![1, 2], vec![1, 2], vec![1, 2]],
            vec![
                Rule::different(0, 1),
                Rule::different(2, 1),
                Rule::different(2, 3),
            ],
        );
        let mut assignment = Assignment::new(4);
        // 1 and 2 both have degree 2; 1 is declared first
        assert_eq!(
            select_unassigned_variable(&p, &assignment, p.domains()),
            Some(1)
        );

        // assigned neighbours no longer count towards the degree
        assignment.assign(1, 1);
        assert_eq!(degree(&p, &assignment, 2), 1);
        assert_eq!(degree(&p, &assignment, 0), 0);
        assert_eq!(
            select_unassigned_variable(&p, &assignment, p.domains()),
            Some(2)
        );
    }

    #[test]
    fn none_when_everything_is_assigned() {
        let p = problem(vec![vec![1]], vec![]);
        let mut assignment = Assignment::new(1);
        assignment.assign(0, 1);
        assert_eq!(
            select_unassigned_variable(&p, &assignment, p.domains()),
            None
        );
    }

    #[test]
    fn orders_least_constraining_first() {
        // value 3 for var 0 conflicts with nothing in var 1's domain
        let p = problem(
            vec![vec![1, 2, 3], vec![1, 2, 2]],
            vec![Rule::different(0, 1)],
        );
        let assignment = Assignment::new(2);
        assert_eq!(
            order_domain_values(&p, 0, &assignment, p.domains()),
            vec![3, 1, 2]
        );
    }

    #[test]
    fn ignores_assigned_neighbours() {
        let p = problem(
            vec![vec![2, 1], vec![1, 1, 1]],
            vec![Rule::different(0, 1)],
        );
        let mut assignment = Assignment::new(2);
        assignment.assign(1, 1);
        assert_eq!(
            order_domain_values(&p, 0, &assignment, p.domains()),
            vec![2, 1]
        );
    }
}
