//! Clause-emission toolkit over a varisat CNF formula.
//!
//! The encoders speak in small constraint idioms (implication, at-most-one,
//! exactly-one); this module names them once so the encoding reads like the
//! constraint list it implements. Variables are allocated here and handed
//! back as plain [`Var`] handles the extractor can look up in a [`Model`].

use varisat::{CnfFormula, ExtendFormula, Lit, Var};

/// Positive literal of `var`.
pub fn pos(var: Var) -> Lit {
    Lit::from_dimacs(var.to_dimacs())
}

/// Negative literal of `var`.
pub fn neg(var: Var) -> Lit {
    !pos(var)
}

/// A CNF formula under construction plus its variable pool.
pub struct Formula {
    cnf: CnfFormula,
}

impl Formula {
    pub fn new() -> Formula {
        Formula { cnf: CnfFormula::new() }
    }

    /// Allocate a fresh variable.
    pub fn var(&mut self) -> Var {
        self.cnf.new_var()
    }

    pub fn add(&mut self, lits: &[Lit]) {
        self.cnf.add_clause(lits);
    }

    /// Mark the formula trivially unsatisfiable (empty clause).
    pub fn contradiction(&mut self) {
        self.cnf.add_clause(&[]);
    }

    /// `a → b`.
    pub fn implies(&mut self, a: Lit, b: Lit) {
        self.cnf.add_clause(&[!a, b]);
    }

    /// `a → (b₁ ∨ b₂ ∨ …)`.
    pub fn implies_any(&mut self, a: Lit, bs: &[Lit]) {
        let mut clause = Vec::with_capacity(bs.len() + 1);
        clause.push(!a);
        clause.extend_from_slice(bs);
        self.cnf.add_clause(&clause);
    }

    /// `a ∧ b → c`.
    pub fn implies2(&mut self, a: Lit, b: Lit, c: Lit) {
        self.cnf.add_clause(&[!a, !b, c]);
    }

    /// At most one of `lits` is true (pairwise encoding).
    pub fn at_most_one(&mut self, lits: &[Lit]) {
        for (i, &a) in lits.iter().enumerate() {
            for &b in &lits[i + 1..] {
                self.cnf.add_clause(&[!a, !b]);
            }
        }
    }

    /// Under `guard`, at most one of `lits` is true.
    pub fn at_most_one_if(&mut self, guard: Lit, lits: &[Lit]) {
        for (i, &a) in lits.iter().enumerate() {
            for &b in &lits[i + 1..] {
                self.cnf.add_clause(&[!guard, !a, !b]);
            }
        }
    }

    /// Exactly one of `lits` is true. An empty slice is a contradiction,
    /// which is the intended reading: no candidate exists.
    pub fn exactly_one(&mut self, lits: &[Lit]) {
        self.cnf.add_clause(lits);
        self.at_most_one(lits);
    }

    pub fn var_count(&self) -> usize {
        self.cnf.var_count()
    }

    pub fn clause_count(&self) -> usize {
        self.cnf.len()
    }

    pub fn into_cnf(self) -> CnfFormula {
        self.cnf
    }
}

/// Truth assignment extracted from a satisfying solver run.
#[derive(Debug)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    /// Build from the solver's model literals.
    pub fn from_lits(var_count: usize, lits: &[Lit]) -> Model {
        let mut values = vec![false; var_count];
        for &lit in lits {
            let idx = lit.var().index();
            if idx < var_count {
                values[idx] = lit.is_positive();
            }
        }
        Model { values }
    }

    pub fn is_true(&self, var: Var) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }
}
