//! Integer constraint model.
//!
//! A deliberately narrow modelling surface: bounded integer variables,
//! linear (in)equalities, all-different, max-equality, and a per-value
//! capacity constraint. Any CP/ILP engine that can express these can back
//! [`CpSolver`](super::CpSolver).

use std::collections::HashMap;

/// Handle to a variable of a [`CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntVar(usize);

impl IntVar {
    /// Position of the variable in the model.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Variable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDef {
    /// Debug name.
    pub name: String,
    /// Inclusive lower bound.
    pub lb: i64,
    /// Inclusive upper bound.
    pub ub: i64,
}

/// `Σ coef * var + constant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    /// `(coefficient, variable)` pairs.
    pub terms: Vec<(i64, IntVar)>,
    /// Constant offset.
    pub constant: i64,
}

impl LinearExpr {
    /// The zero expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coef * var`.
    pub fn term(mut self, coef: i64, var: IntVar) -> Self {
        self.terms.push((coef, var));
        self
    }

    /// Adds a constant.
    pub fn plus(mut self, constant: i64) -> Self {
        self.constant += constant;
        self
    }

    /// Negated expression.
    pub fn negated(&self) -> Self {
        Self {
            terms: self.terms.iter().map(|&(c, v)| (-c, v)).collect(),
            constant: -self.constant,
        }
    }

    /// Value under a complete assignment.
    pub fn evaluate(&self, values: &[i64]) -> i64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|&(c, v)| c * values[v.index()])
                .sum::<i64>()
    }
}

impl From<IntVar> for LinearExpr {
    fn from(var: IntVar) -> Self {
        Self::new().term(1, var)
    }
}

/// Comparison of a linear expression against a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `expr == rhs`
    Eq,
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
}

/// A model constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpConstraint {
    /// `expr <relation> rhs`.
    Linear {
        expr: LinearExpr,
        relation: Relation,
        rhs: i64,
    },
    /// Pairwise distinct values.
    AllDifferent(Vec<IntVar>),
    /// `target == max(vars)`.
    MaxEquality { target: IntVar, vars: Vec<IntVar> },
    /// For every value `t`: `|{v in vars : v == t}| <= capacity`.
    ///
    /// Equivalent to one indicator literal `v == t` per variable/value pair
    /// and a capacity sum per value.
    ValueCapacity { vars: Vec<IntVar>, capacity: usize },
}

impl CpConstraint {
    /// Whether a complete assignment satisfies this constraint.
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        match self {
            Self::Linear {
                expr,
                relation,
                rhs,
            } => {
                let lhs = expr.evaluate(values);
                match relation {
                    Relation::Eq => lhs == *rhs,
                    Relation::Le => lhs <= *rhs,
                    Relation::Ge => lhs >= *rhs,
                }
            }
            Self::AllDifferent(vars) => {
                let mut seen = std::collections::HashSet::with_capacity(vars.len());
                vars.iter().all(|v| seen.insert(values[v.index()]))
            }
            Self::MaxEquality { target, vars } => {
                match vars.iter().map(|v| values[v.index()]).max() {
                    Some(max) => values[target.index()] == max,
                    None => true,
                }
            }
            Self::ValueCapacity { vars, capacity } => {
                let mut counts: HashMap<i64, usize> = HashMap::new();
                vars.iter().all(|v| {
                    let count = counts.entry(values[v.index()]).or_insert(0);
                    *count += 1;
                    *count <= *capacity
                })
            }
        }
    }
}

/// Optimisation direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Objective {
    /// Minimise the expression.
    Minimize(LinearExpr),
    /// Maximise the expression.
    Maximize(LinearExpr),
}

impl Objective {
    /// The expression as a minimisation target.
    pub fn as_minimization(&self) -> LinearExpr {
        match self {
            Self::Minimize(expr) => expr.clone(),
            Self::Maximize(expr) => expr.negated(),
        }
    }
}

/// Order in which a branching variable's values are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrder {
    /// Smallest value first.
    #[default]
    Ascending,
    /// Largest value first.
    Descending,
}

/// An integer constraint model.
#[derive(Debug, Clone)]
pub struct CpModel {
    name: String,
    vars: Vec<VarDef>,
    constraints: Vec<CpConstraint>,
    objective: Option<Objective>,
    branching: Vec<(IntVar, ValueOrder)>,
    hints: Vec<(IntVar, i64)>,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            branching: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a variable with domain `[lb, ub]`.
    pub fn new_int_var(&mut self, lb: i64, ub: i64, name: impl Into<String>) -> IntVar {
        self.vars.push(VarDef {
            name: name.into(),
            lb,
            ub,
        });
        IntVar(self.vars.len() - 1)
    }

    /// Adds `expr <relation> rhs`.
    pub fn add_linear(&mut self, expr: LinearExpr, relation: Relation, rhs: i64) {
        self.constraints.push(CpConstraint::Linear {
            expr,
            relation,
            rhs,
        });
    }

    /// Adds `expr == rhs`.
    pub fn add_equality(&mut self, expr: LinearExpr, rhs: i64) {
        self.add_linear(expr, Relation::Eq, rhs);
    }

    /// Requires pairwise distinct values.
    pub fn add_all_different(&mut self, vars: Vec<IntVar>) {
        self.constraints.push(CpConstraint::AllDifferent(vars));
    }

    /// Requires `target == max(vars)`.
    pub fn add_max_equality(&mut self, target: IntVar, vars: Vec<IntVar>) {
        self.constraints
            .push(CpConstraint::MaxEquality { target, vars });
    }

    /// Requires every value to be taken by at most `capacity` of `vars`.
    pub fn add_value_capacity(&mut self, vars: Vec<IntVar>, capacity: usize) {
        self.constraints
            .push(CpConstraint::ValueCapacity { vars, capacity });
    }

    /// Sets a minimisation objective.
    pub fn minimize(&mut self, expr: impl Into<LinearExpr>) {
        self.objective = Some(Objective::Minimize(expr.into()));
    }

    /// Sets a maximisation objective.
    pub fn maximize(&mut self, expr: impl Into<LinearExpr>) {
        self.objective = Some(Objective::Maximize(expr.into()));
    }

    /// Variables to branch on first, with their value order.
    pub fn set_branching(&mut self, branching: Vec<(IntVar, ValueOrder)>) {
        self.branching = branching;
    }

    /// Suggests a value for a variable; solvers may start from it.
    pub fn add_hint(&mut self, var: IntVar, value: i64) {
        self.hints.push((var, value));
    }

    /// Variable declarations.
    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    /// Declaration of one variable.
    pub fn var(&self, var: IntVar) -> &VarDef {
        &self.vars[var.index()]
    }

    /// Constraints.
    pub fn constraints(&self) -> &[CpConstraint] {
        &self.constraints
    }

    /// Objective, if any.
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Branching order.
    pub fn branching(&self) -> &[(IntVar, ValueOrder)] {
        &self.branching
    }

    /// Hints.
    pub fn hints(&self) -> &[(IntVar, i64)] {
        &self.hints
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether a complete assignment respects every bound and constraint.
    pub fn is_feasible(&self, values: &[i64]) -> bool {
        values.len() == self.vars.len()
            && self
                .vars
                .iter()
                .zip(values)
                .all(|(def, &v)| def.lb <= v && v <= def.ub)
            && self.constraints.iter().all(|c| c.is_satisfied(values))
    }
}
