use crate::csp::{Assignment, BinaryConstraint, ConstraintProblem, Domain, VarId};

/// Forward checking after tentatively binding `var` to `value`.
///
/// Removes from every unassigned neighbour's domain the values that would
/// violate a shared constraint. Returns `false` as soon as a neighbour is
/// left with an empty domain; `domains` may then be partially pruned and
/// must be restored by the caller.
pub fn forward_check<V, C: BinaryConstraint<V>>(
    problem: &ConstraintProblem<V, C>,
    var: VarId,
    value: &V,
    domains: &mut [Domain<V>],
    assignment: &Assignment<V>,
) -> bool {
    for constraint in problem.constraints_on(var) {
        let Some(other) = constraint.neighbor_of(var) else {
            continue;
        };
        if assignment.is_assigned(other) {
            continue;
        }

        let domain = &mut domains[other];
        domain.retain(|candidate| constraint.allows(var, value, candidate));
        if domain.is_empty() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::testing::Rule;

    #[test]
    fn prunes_unassigned_neighbours() {
        let problem = ConstraintProblem::new(
            vec![vec![1u8, 2], vec![1, 2, 3], vec![1, 2]],
            vec![Rule::different(0, 1), Rule::new(2, 0, |c, a| c > a)],
        )
        .unwrap();
        let mut domains = problem.domains().to_vec();
        let mut assignment = Assignment::new(3);
        assignment.assign(0, 1);

        assert!(forward_check(&problem, 0, &1, &mut domains, &assignment));
        assert_eq!(domains[1], vec![2, 3]);
        assert_eq!(domains[2], vec![2]);
        // the canonical domains are untouched
        assert_eq!(problem.domains()[1], vec![1, 2, 3]);
    }

    #[test]
    fn skips_assigned_neighbours() {
        let problem =
            ConstraintProblem::new(vec![vec![1u8], vec![1]], vec![Rule::different(0, 1)]).unwrap();
        let mut domains = problem.domains().to_vec();
        let mut assignment = Assignment::new(2);
        assignment.assign(1, 1);
        assignment.assign(0, 1);

        assert!(forward_check(&problem, 0, &1, &mut domains, &assignment));
        assert_eq!(domains[1], vec![1]);
    }

    #[test]
    fn fails_on_wiped_out_domain() {
        let problem = ConstraintProblem::new(
            vec![vec![1u8, 2], vec![1]],
            vec![Rule::different(0, 1)],
        )
        .unwrap();
        let mut domains = problem.domains().to_vec();
        let mut assignment = Assignment::new(2);
        assignment.assign(0, 1);

        assert!(!forward_check(&problem, 0, &1, &mut domains, &assignment));
        assert!(domains[1].is_empty());
    }
}
