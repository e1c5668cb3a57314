use good_lp::{
    Expression, ResolutionError, Solution, SolverModel, constraint, default_solver, variable,
    variables,
};

use crate::error::LpError;

use super::lp::{LinearProgram, LpBackend, LpSolution};

/// [`LpBackend`] over `good_lp` with its bundled `microlp` solver — pure
/// Rust, deterministic pivoting, no system libraries.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend;

impl LpBackend for GoodLpBackend {
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, LpError> {
        if program.num_variables() == 0 {
            return Ok(LpSolution::new(Vec::new(), 0.0));
        }

        let mut vars = variables!();
        let handles: Vec<_> = program
            .objective_weights()
            .iter()
            .map(|_| vars.add(variable().min(0.0)))
            .collect();

        let objective = handles
            .iter()
            .zip(program.objective_weights())
            .fold(Expression::from(0.0), |total, (handle, weight)| {
                total + *handle * *weight
            });

        let mut model = vars.maximise(objective.clone()).using(default_solver);
        for bound in program.constraints() {
            let lhs = bound
                .terms()
                .iter()
                .fold(Expression::from(0.0), |total, (id, coeff)| {
                    total + handles[id.get()] * *coeff
                });
            model = model.with(constraint!(lhs <= bound.upper_bound()));
        }

        let solution = model.solve().map_err(|err| match err {
            ResolutionError::Infeasible => LpError::Infeasible,
            ResolutionError::Unbounded => LpError::Unbounded,
            other => LpError::Backend(other.to_string()),
        })?;

        let values = handles.iter().map(|handle| solution.value(*handle)).collect();
        let objective = solution.eval(&objective);
        Ok(LpSolution::new(values, objective))
    }

    fn name(&self) -> &'static str {
        "good_lp/microlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maximize_respects_upper_bounds() {
        let mut program = LinearProgram::new();
        let x = program.add_variable(1.0);
        let y = program.add_variable(1.0);
        program.add_upper_bound(vec![(x, 1.0), (y, 1.0)], 10.0);
        program.add_upper_bound(vec![(x, 1.0)], 4.0);

        let solution = GoodLpBackend.solve(&program).unwrap();

        assert!((solution.objective() - 10.0).abs() < 1e-6);
        assert!(solution.value(x) <= 4.0 + 1e-6);
        assert!(solution.value(x) + solution.value(y) <= 10.0 + 1e-6);
        assert!(solution.value(x) >= -1e-9);
        assert!(solution.value(y) >= -1e-9);
    }

    #[test]
    fn test_weighted_objective() {
        let mut program = LinearProgram::new();
        let x = program.add_variable(2.0);
        let y = program.add_variable(1.0);
        program.add_upper_bound(vec![(x, 1.0)], 3.0);
        program.add_upper_bound(vec![(y, 1.0)], 5.0);

        let solution = GoodLpBackend.solve(&program).unwrap();

        assert!((solution.objective() - 11.0).abs() < 1e-6);
        assert!((solution.value(x) - 3.0).abs() < 1e-6);
        assert!((solution.value(y) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_program_is_trivially_solved() {
        let solution = GoodLpBackend.solve(&LinearProgram::new()).unwrap();
        assert_eq!(solution.objective(), 0.0);
    }

    #[test]
    fn test_unbounded_objective_reported() {
        let mut program = LinearProgram::new();
        program.add_variable(1.0);

        let err = GoodLpBackend.solve(&program).unwrap_err();
        assert_eq!(err, LpError::Unbounded);
    }

    #[test]
    fn test_zero_upper_bounds_pin_variables() {
        let mut program = LinearProgram::new();
        let x = program.add_variable(1.0);
        program.add_upper_bound(vec![(x, 1.0)], 0.0);

        let solution = GoodLpBackend.solve(&program).unwrap();
        assert!(solution.value(x).abs() < 1e-9);
        assert!(solution.objective().abs() < 1e-9);
    }
}
