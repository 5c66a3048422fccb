//! SAT driver: one bounded check per attempt.
//!
//! varisat has no deadline API, so the check runs on a worker thread and
//! the driver waits on a channel with the attempt timeout. A timed-out
//! worker is abandoned; it drops the solver state when its check finishes.
//! Each attempt constructs a fresh solver, so nothing leaks across
//! attempts or sessions.

use crate::cnf::Model;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use varisat::{CnfFormula, Solver};

/// Result of one bounded check.
#[derive(Debug)]
pub enum CheckOutcome {
    Sat(Model),
    Unsat,
    /// Timeout or solver-internal failure; diagnostics go to the log.
    Unknown,
}

enum WorkerOutcome {
    Sat(Model),
    Unsat,
    Failed(String),
}

/// Check `formula` within `timeout` wall-clock time.
pub fn check(formula: CnfFormula, timeout: Duration) -> CheckOutcome {
    let var_count = formula.var_count();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut solver = Solver::new();
        solver.add_formula(&formula);
        let outcome = match solver.solve() {
            Ok(true) => match solver.model() {
                Some(lits) => WorkerOutcome::Sat(Model::from_lits(var_count, &lits)),
                None => WorkerOutcome::Failed("sat result carried no model".into()),
            },
            Ok(false) => WorkerOutcome::Unsat,
            Err(err) => WorkerOutcome::Failed(err.to_string()),
        };
        // The receiver may have given up on us; nothing to do then.
        let _ = tx.send(outcome);
    });

    match rx.recv_timeout(timeout) {
        Ok(WorkerOutcome::Sat(model)) => CheckOutcome::Sat(model),
        Ok(WorkerOutcome::Unsat) => CheckOutcome::Unsat,
        Ok(WorkerOutcome::Failed(reason)) => {
            log::warn!("solver failed: {reason}");
            CheckOutcome::Unknown
        }
        Err(_) => {
            log::info!("check timed out after {:?}", timeout);
            CheckOutcome::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::{neg, pos, Formula};

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    fn basic_sat() {
        // (x1 ∨ x2) ∧ (¬x1 ∨ x3)
        let mut f = Formula::new();
        let x1 = f.var();
        let x2 = f.var();
        let x3 = f.var();
        f.add(&[pos(x1), pos(x2)]);
        f.add(&[neg(x1), pos(x3)]);
        assert!(matches!(check(f.into_cnf(), TIMEOUT), CheckOutcome::Sat(_)));
    }

    #[test]
    fn basic_unsat() {
        // x1 ∧ ¬x1
        let mut f = Formula::new();
        let x1 = f.var();
        f.add(&[pos(x1)]);
        f.add(&[neg(x1)]);
        assert!(matches!(check(f.into_cnf(), TIMEOUT), CheckOutcome::Unsat));
    }

    #[test]
    fn model_values_are_readable() {
        // x1 must be true, x2 must be false
        let mut f = Formula::new();
        let x1 = f.var();
        let x2 = f.var();
        f.add(&[pos(x1)]);
        f.add(&[neg(x2)]);
        match check(f.into_cnf(), TIMEOUT) {
            CheckOutcome::Sat(model) => {
                assert!(model.is_true(x1));
                assert!(!model.is_true(x2));
            }
            other => panic!("expected sat, got {other:?}"),
        }
    }

    #[test]
    fn empty_formula_is_sat() {
        let f = Formula::new();
        assert!(matches!(check(f.into_cnf(), TIMEOUT), CheckOutcome::Sat(_)));
    }
}
