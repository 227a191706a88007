//! Solver interface and the built-in branch-and-bound search.
//!
//! # Algorithm
//!
//! `SearchSolver` runs a depth-first search over finite domains:
//!
//! 1. Propagate every constraint to a fixpoint: bounds consistency for
//!    linear and max constraints, forward checking for all-different and
//!    value capacity (values taken by fixed variables are removed from the
//!    others, wherever they sit in the domain).
//! 2. Pick the first unfixed branching variable and try the values still
//!    in its domain in the requested order.
//! 3. Each solution tightens the objective bound (`obj <= best - 1`),
//!    which is propagated like any other linear constraint.
//!
//! Domains are bit sets; very wide domains fall back to bounds only. The
//! wall clock is checked every 64 nodes. When the time or node budget runs
//! out, the best incumbent is returned as [`SolveStatus::Feasible`].
//!
//! # Reference
//! - Rossi, van Beek, Walsh (2006), "Handbook of Constraint Programming", Ch. 3-4
//! - Land, Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::model::{
    CpConstraint, CpModel, IntVar, LinearExpr, Objective, Relation, ValueOrder,
};

/// Search limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock budget. `None` = search to completion.
    pub time_limit: Option<Duration>,
    /// Node budget. `None` = unlimited.
    pub node_limit: Option<u64>,
}

impl SolverConfig {
    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the node budget.
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }
}

/// Outcome of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Best possible solution found (or any solution, without objective).
    Optimal,
    /// A solution was found but the search was cut short.
    Feasible,
    /// The search proved that no solution exists.
    Infeasible,
    /// The search was cut short before finding any solution.
    Unknown,
}

/// Result of a solve call.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Outcome.
    pub status: SolveStatus,
    /// Variable values, indexed by [`IntVar::index`]. Empty without solution.
    pub values: Vec<i64>,
    /// Objective value in the model's direction.
    pub objective: Option<i64>,
    /// Search nodes visited.
    pub nodes: u64,
    /// Time spent.
    pub elapsed: Duration,
}

impl CpSolution {
    /// Whether `values` holds a solution.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    /// Value of a variable in the solution.
    pub fn value(&self, var: IntVar) -> Option<i64> {
        self.values.get(var.index()).copied()
    }
}

/// A constraint solver backend.
pub trait CpSolver {
    /// Solves `model` within the limits of `config`.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

/// Depth-first branch-and-bound solver with domain propagation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchSolver;

impl SearchSolver {
    /// The clock is read whenever `nodes & CLOCK_CHECK_MASK == 0`.
    const CLOCK_CHECK_MASK: u64 = 0x3F;

    /// Creates a solver.
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for SearchSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let mut search = Search {
            model,
            config,
            objective: model.objective().map(|o| o.as_minimization()),
            best: None,
            nodes: 0,
            stopped: false,
            satisfied: false,
            started: Instant::now(),
        };
        search.run();

        let complete = !search.stopped;
        let status = match (&search.best, complete) {
            (Some(_), true) => SolveStatus::Optimal,
            (Some(_), false) => SolveStatus::Feasible,
            (None, true) => SolveStatus::Infeasible,
            (None, false) => SolveStatus::Unknown,
        };

        let values = search.best.map(|(_, values)| values).unwrap_or_default();
        let objective = match (model.objective(), values.is_empty()) {
            (Some(Objective::Minimize(expr) | Objective::Maximize(expr)), false) => {
                Some(expr.evaluate(&values))
            }
            _ => None,
        };

        debug!(
            model = model.name(),
            ?status,
            ?objective,
            nodes = search.nodes,
            "search finished"
        );

        CpSolution {
            status,
            values,
            objective,
            nodes: search.nodes,
            elapsed: search.started.elapsed(),
        }
    }
}

/// Domains wider than this keep bounds only.
const MAX_BITSET_WIDTH: i64 = 1 << 16;

/// Bit layout shared by every copy of a domain store.
#[derive(Debug)]
struct Layout {
    /// Value of bit 0, per variable.
    base: Vec<i64>,
    /// Variable `i` owns words `words[i]..words[i + 1]`.
    words: Vec<usize>,
}

/// Finite domains: bounds plus a bit set of the values left in between.
#[derive(Debug, Clone)]
struct Domains {
    layout: Rc<Layout>,
    bounds: Vec<(i64, i64)>,
    bits: Vec<u64>,
}

impl Domains {
    fn new(model: &CpModel) -> Self {
        let vars = model.vars();
        let mut base = Vec::with_capacity(vars.len());
        let mut words = Vec::with_capacity(vars.len() + 1);
        let mut bounds = Vec::with_capacity(vars.len());
        let mut total = 0usize;
        words.push(total);
        for def in vars {
            let width = def.ub.saturating_sub(def.lb).saturating_add(1);
            if width > 0 && width <= MAX_BITSET_WIDTH {
                total += ((width + 63) / 64) as usize;
            }
            base.push(def.lb);
            words.push(total);
            bounds.push((def.lb, def.ub));
        }

        let mut bits = vec![u64::MAX; total];
        for (i, def) in vars.iter().enumerate() {
            let end = words[i + 1];
            if end > words[i] {
                let tail = (def.ub - def.lb + 1) % 64;
                if tail != 0 {
                    bits[end - 1] = (1u64 << tail) - 1;
                }
            }
        }

        Self {
            layout: Rc::new(Layout { base, words }),
            bounds,
            bits,
        }
    }

    fn lb(&self, var: IntVar) -> i64 {
        self.bounds[var.index()].0
    }

    fn ub(&self, var: IntVar) -> i64 {
        self.bounds[var.index()].1
    }

    fn is_fixed(&self, var: IntVar) -> bool {
        let (lb, ub) = self.bounds[var.index()];
        lb == ub
    }

    fn is_empty(&self) -> bool {
        self.bounds.iter().any(|&(lb, ub)| lb > ub)
    }

    /// Word index and mask of `value`, for a value within the initial bounds.
    fn bit(&self, var: IntVar, value: i64) -> Option<(usize, u64)> {
        let i = var.index();
        let (start, end) = (self.layout.words[i], self.layout.words[i + 1]);
        if start == end {
            return None;
        }
        let offset = (value - self.layout.base[i]) as usize;
        Some((start + offset / 64, 1u64 << (offset % 64)))
    }

    fn contains(&self, var: IntVar, value: i64) -> bool {
        let (lb, ub) = self.bounds[var.index()];
        if value < lb || value > ub {
            return false;
        }
        self.bit(var, value)
            .map_or(true, |(word, mask)| self.bits[word] & mask != 0)
    }

    /// Raises the lower bound to the first value `>= lb` still present.
    /// `None` if the domain becomes empty.
    fn tighten_lb(&mut self, var: IntVar, lb: i64) -> Option<bool> {
        let (current, ub) = self.bounds[var.index()];
        if lb <= current {
            return Some(false);
        }
        let mut value = lb;
        while value <= ub && !self.contains(var, value) {
            value += 1;
        }
        self.bounds[var.index()].0 = value;
        (value <= ub).then_some(true)
    }

    /// Lowers the upper bound to the last value `<= ub` still present.
    fn tighten_ub(&mut self, var: IntVar, ub: i64) -> Option<bool> {
        let (lb, current) = self.bounds[var.index()];
        if ub >= current {
            return Some(false);
        }
        let mut value = ub;
        while value >= lb && !self.contains(var, value) {
            value -= 1;
        }
        self.bounds[var.index()].1 = value;
        (lb <= value).then_some(true)
    }

    fn fix(&mut self, var: IntVar, value: i64) -> Option<bool> {
        let raised = self.tighten_lb(var, value)?;
        let lowered = self.tighten_ub(var, value)?;
        Some(raised || lowered)
    }

    /// Removes one value. `None` if it was the last one.
    fn remove(&mut self, var: IntVar, value: i64) -> Option<bool> {
        if !self.contains(var, value) {
            return Some(false);
        }
        let (lb, ub) = self.bounds[var.index()];
        if lb == ub {
            return None;
        }
        if value == lb {
            return self.tighten_lb(var, value + 1);
        }
        if value == ub {
            return self.tighten_ub(var, value - 1);
        }
        match self.bit(var, value) {
            Some((word, mask)) => {
                self.bits[word] &= !mask;
                Some(true)
            }
            None => Some(false),
        }
    }

    /// Value of every variable; meaningful once all are fixed.
    fn values(&self) -> Vec<i64> {
        self.bounds.iter().map(|&(lb, _)| lb).collect()
    }
}

struct Search<'m> {
    model: &'m CpModel,
    config: &'m SolverConfig,
    /// Objective in minimisation form.
    objective: Option<LinearExpr>,
    /// Incumbent `(minimisation value, values)`.
    best: Option<(i64, Vec<i64>)>,
    nodes: u64,
    stopped: bool,
    /// Satisfaction problem solved; no need to continue.
    satisfied: bool,
    started: Instant,
}

impl Search<'_> {
    fn run(&mut self) {
        let mut root = Domains::new(self.model);
        if root.is_empty() || !self.propagate(&mut root) {
            return;
        }

        self.try_hints(&root);
        self.dfs(root);
    }

    /// Installs the hinted assignment as first incumbent if it is complete.
    fn try_hints(&mut self, root: &Domains) {
        let hints = self.model.hints();
        if hints.is_empty() {
            return;
        }

        let mut domains = root.clone();
        for &(var, value) in hints {
            if !domains.contains(var, value) || domains.fix(var, value).is_none() {
                debug!(var = %self.model.var(var).name, value, "hint outside domain, ignored");
                return;
            }
        }

        if !self.propagate(&mut domains)
            || (0..domains.bounds.len()).any(|i| !domains.is_fixed(IntVar::from_index(i)))
        {
            debug!("hint does not determine a solution, ignored");
            return;
        }
        self.install(domains.values());
    }

    fn dfs(&mut self, domains: Domains) {
        let Some((var, order)) = self.select_var(&domains) else {
            self.install(domains.values());
            return;
        };

        let (lb, ub) = (domains.lb(var), domains.ub(var));
        for k in 0..=(ub - lb) {
            let value = match order {
                ValueOrder::Ascending => lb + k,
                ValueOrder::Descending => ub - k,
            };
            if !domains.contains(var, value) {
                continue;
            }
            if self.should_stop() {
                return;
            }
            self.nodes = self.nodes.wrapping_add(1);

            let mut child = domains.clone();
            if child.fix(var, value).is_some() && self.propagate(&mut child) {
                self.dfs(child);
            }
        }
    }

    fn should_stop(&mut self) -> bool {
        if self.stopped || self.satisfied {
            return true;
        }
        if let Some(limit) = self.config.node_limit {
            if self.nodes >= limit {
                self.stopped = true;
            }
        }
        if let Some(limit) = self.config.time_limit {
            if self.nodes & SearchSolver::CLOCK_CHECK_MASK == 0
                && self.started.elapsed() >= limit
            {
                debug!(nodes = self.nodes, "time limit reached");
                self.stopped = true;
            }
        }
        self.stopped
    }

    /// First unfixed branching variable, then first unfixed variable.
    fn select_var(&self, domains: &Domains) -> Option<(IntVar, ValueOrder)> {
        let unfixed = |v: &IntVar| !domains.is_fixed(*v);
        self.model
            .branching()
            .iter()
            .copied()
            .find(|(v, _)| unfixed(v))
            .or_else(|| {
                (0..self.model.vars().len())
                    .map(IntVar::from_index)
                    .find(unfixed)
                    .map(|v| (v, ValueOrder::Ascending))
            })
    }

    fn install(&mut self, values: Vec<i64>) {
        if !self.model.is_feasible(&values) {
            return;
        }
        match &self.objective {
            Some(objective) => {
                let value = objective.evaluate(&values);
                if self.best.as_ref().map_or(true, |(best, _)| value < *best) {
                    trace!(value, nodes = self.nodes, "new incumbent");
                    self.best = Some((value, values));
                }
            }
            None => {
                self.best = Some((0, values));
                self.satisfied = true;
            }
        }
    }

    /// Runs every propagator to a fixpoint. `false` on a wipe-out.
    fn propagate(&self, domains: &mut Domains) -> bool {
        let bound = self
            .objective
            .as_ref()
            .zip(self.best.as_ref())
            .map(|(expr, (best, _))| (expr, best - 1));

        loop {
            let mut changed = false;
            for constraint in self.model.constraints() {
                match propagate_constraint(constraint, domains) {
                    Some(c) => changed |= c,
                    None => return false,
                }
            }
            if let Some((expr, limit)) = bound {
                match propagate_le(&expr.terms, 1, limit - expr.constant, domains) {
                    Some(c) => changed |= c,
                    None => return false,
                }
            }
            if !changed {
                return true;
            }
        }
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a < 0) == (b < 0)) {
        q + 1
    } else {
        q
    }
}

fn propagate_constraint(constraint: &CpConstraint, domains: &mut Domains) -> Option<bool> {
    match constraint {
        CpConstraint::Linear {
            expr,
            relation,
            rhs,
        } => {
            let bound = rhs - expr.constant;
            match relation {
                Relation::Le => propagate_le(&expr.terms, 1, bound, domains),
                Relation::Ge => propagate_le(&expr.terms, -1, -bound, domains),
                Relation::Eq => {
                    let upper = propagate_le(&expr.terms, 1, bound, domains)?;
                    let lower = propagate_le(&expr.terms, -1, -bound, domains)?;
                    Some(upper || lower)
                }
            }
        }
        CpConstraint::AllDifferent(vars) => propagate_value_capacity(vars, 1, domains),
        CpConstraint::MaxEquality { target, vars } => propagate_max(*target, vars, domains),
        CpConstraint::ValueCapacity { vars, capacity } => {
            propagate_value_capacity(vars, *capacity, domains)
        }
    }
}

/// Bounds propagation for `Σ sign * coef * var <= bound`.
fn propagate_le(
    terms: &[(i64, IntVar)],
    sign: i64,
    bound: i64,
    domains: &mut Domains,
) -> Option<bool> {
    let term_min = |coef: i64, var: IntVar, domains: &Domains| {
        if coef > 0 {
            coef * domains.lb(var)
        } else {
            coef * domains.ub(var)
        }
    };

    let min_sum: i64 = terms
        .iter()
        .map(|&(c, v)| term_min(sign * c, v, domains))
        .sum();
    if min_sum > bound {
        return None;
    }

    let mut changed = false;
    for &(c, var) in terms {
        let coef = sign * c;
        if coef == 0 {
            continue;
        }
        // coef * var <= slack
        let slack = bound - (min_sum - term_min(coef, var, domains));
        changed |= if coef > 0 {
            domains.tighten_ub(var, floor_div(slack, coef))?
        } else {
            domains.tighten_lb(var, ceil_div(slack, coef))?
        };
    }
    Some(changed)
}

fn propagate_max(target: IntVar, vars: &[IntVar], domains: &mut Domains) -> Option<bool> {
    if vars.is_empty() {
        return Some(false);
    }
    let max_lb = vars.iter().map(|&v| domains.lb(v)).max()?;
    let max_ub = vars.iter().map(|&v| domains.ub(v)).max()?;

    let mut changed = domains.tighten_lb(target, max_lb)?;
    changed |= domains.tighten_ub(target, max_ub)?;

    let (target_lb, target_ub) = (domains.lb(target), domains.ub(target));
    for &var in vars {
        changed |= domains.tighten_ub(var, target_ub)?;
    }

    // Only one variable can still reach the target: it must.
    let mut supports = vars.iter().filter(|&&v| domains.ub(v) >= target_lb);
    let first = *supports.next()?;
    if supports.next().is_none() {
        changed |= domains.tighten_lb(first, target_lb)?;
    }
    Some(changed)
}

/// At most `capacity` variables share a value.
///
/// Values already taken `capacity` times by fixed variables are removed
/// from every other domain. The unfixed variables must also fit into the
/// room left in the window spanned by their domains.
fn propagate_value_capacity(
    vars: &[IntVar],
    capacity: usize,
    domains: &mut Domains,
) -> Option<bool> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &v in vars {
        if domains.is_fixed(v) {
            let count = counts.entry(domains.lb(v)).or_insert(0);
            *count += 1;
            if *count > capacity {
                return None;
            }
        }
    }
    let full: Vec<i64> = counts
        .iter()
        .filter(|&(_, &count)| count >= capacity)
        .map(|(&value, _)| value)
        .collect();

    let mut changed = false;
    let mut open = 0i64;
    let (mut low, mut high) = (i64::MAX, i64::MIN);
    for &v in vars {
        if domains.is_fixed(v) {
            continue;
        }
        for &value in &full {
            changed |= domains.remove(v, value)?;
        }
        open += 1;
        low = low.min(domains.lb(v));
        high = high.max(domains.ub(v));
    }

    if open > 0 {
        let used: usize = counts
            .iter()
            .filter(|&(&value, _)| low <= value && value <= high)
            .map(|(_, &count)| count)
            .sum();
        let room = (high - low + 1)
            .saturating_mul(capacity as i64)
            .saturating_sub(used as i64);
        if open > room {
            return None;
        }
    }
    Some(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_rounding() {
        assert_eq!(floor_div(7, 2), 3);
        assert_eq!(floor_div(-7, 2), -4);
        assert_eq!(floor_div(7, -2), -4);
        assert_eq!(ceil_div(7, 2), 4);
        assert_eq!(ceil_div(-7, 2), -3);
        assert_eq!(ceil_div(-7, -2), 4);
    }

    #[test]
    fn test_minimize_linear() {
        // min x + y s.t. x + 2y >= 7, x, y in [0, 10]
        let mut model = CpModel::new("lin");
        let x = model.new_int_var(0, 10, "x");
        let y = model.new_int_var(0, 10, "y");
        model.add_linear(LinearExpr::new().term(1, x).term(2, y), Relation::Ge, 7);
        model.minimize(LinearExpr::new().term(1, x).term(1, y));

        let solution = SearchSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, Some(4));
        assert!(model.is_feasible(&solution.values));
    }

    #[test]
    fn test_maximize() {
        let mut model = CpModel::new("max");
        let x = model.new_int_var(0, 5, "x");
        let y = model.new_int_var(0, 5, "y");
        model.add_linear(LinearExpr::new().term(1, x).term(1, y), Relation::Le, 6);
        model.maximize(LinearExpr::new().term(3, x).term(1, y));

        let solution = SearchSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.value(x), Some(5));
        assert_eq!(solution.value(y), Some(1));
        assert_eq!(solution.objective, Some(16));
    }

    #[test]
    fn test_all_different_infeasible() {
        let mut model = CpModel::new("pigeonhole");
        let vars: Vec<IntVar> = (0..4).map(|i| model.new_int_var(0, 2, format!("v{i}"))).collect();
        model.add_all_different(vars);

        let solution = SearchSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(!solution.is_solution_found());
    }

    #[test]
    fn test_value_capacity_and_max() {
        // Four starters, at most two per minute: the last one starts at >= 1.
        let mut model = CpModel::new("cap");
        let vars: Vec<IntVar> = (0..4).map(|i| model.new_int_var(0, 5, format!("s{i}"))).collect();
        let last = model.new_int_var(0, 5, "last");
        model.add_value_capacity(vars.clone(), 2);
        model.add_max_equality(last, vars);
        model.minimize(last);

        let solution = SearchSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.value(last), Some(1));
    }

    #[test]
    fn test_satisfaction_without_objective() {
        let mut model = CpModel::new("sat");
        let x = model.new_int_var(0, 3, "x");
        let y = model.new_int_var(0, 3, "y");
        model.add_equality(LinearExpr::new().term(1, x).term(1, y), 5);
        model.add_all_different(vec![x, y]);

        let solution = SearchSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, None);
        assert!(model.is_feasible(&solution.values));
    }

    #[test]
    fn test_hint_becomes_incumbent_under_node_limit() {
        let mut model = CpModel::new("hint");
        let x = model.new_int_var(0, 50, "x");
        let y = model.new_int_var(0, 50, "y");
        model.add_all_different(vec![x, y]);
        model.minimize(LinearExpr::new().term(1, x).term(1, y));
        model.add_hint(x, 10);
        model.add_hint(y, 20);

        let config = SolverConfig::default().with_node_limit(0);
        let solution = SearchSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolveStatus::Feasible);
        assert_eq!(solution.objective, Some(30));
    }

    #[test]
    fn test_zero_time_limit_without_solution() {
        let mut model = CpModel::new("timeout");
        let x = model.new_int_var(0, 50, "x");
        model.minimize(x);

        let config = SolverConfig::default().with_time_limit(Duration::ZERO);
        let solution = SearchSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolveStatus::Unknown);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_empty_domain_is_infeasible() {
        let mut model = CpModel::new("empty");
        model.new_int_var(3, 1, "x");
        let solution = SearchSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_all_different_removes_interior_values() {
        let mut model = CpModel::new("holes");
        let x = model.new_int_var(0, 4, "x");
        let y = model.new_int_var(2, 2, "y");
        model.add_all_different(vec![x, y]);

        let mut domains = Domains::new(&model);
        let constraint = &model.constraints()[0];
        assert_eq!(propagate_constraint(constraint, &mut domains), Some(true));
        assert_eq!((domains.lb(x), domains.ub(x)), (0, 4));
        assert!(!domains.contains(x, 2));
        assert!(domains.contains(x, 1) && domains.contains(x, 3));

        // Bounds snap over removed values.
        assert_eq!(domains.tighten_lb(x, 2), Some(true));
        assert_eq!(domains.lb(x), 3);
    }

    #[test]
    fn test_capacity_window_fails_without_search() {
        // Seven starters, two per minute, three minutes: no room.
        let mut model = CpModel::new("window");
        let vars: Vec<IntVar> = (0..7)
            .map(|i| model.new_int_var(0, 2, format!("s{i}")))
            .collect();
        model.add_value_capacity(vars, 2);

        let solution = SearchSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert_eq!(solution.nodes, 0);
    }

    #[test]
    fn test_branching_skips_removed_values() {
        // a takes 1, so x branches on 0 and 2 only.
        let mut model = CpModel::new("skip");
        let a = model.new_int_var(1, 1, "a");
        let x = model.new_int_var(0, 2, "x");
        let z = model.new_int_var(0, 2, "z");
        model.add_all_different(vec![a, x]);
        model.add_equality(LinearExpr::new().term(1, x).term(1, z), 2);
        model.set_branching(vec![(x, ValueOrder::Ascending)]);
        model.minimize(z);

        let solution = SearchSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.value(x), Some(2));
        assert_eq!(solution.nodes, 2);
    }

    #[test]
    fn test_pigeonhole_proof_is_fast() {
        // Twelve distinct values in eleven slots, proved without enumeration.
        let mut model = CpModel::new("pigeonhole");
        let vars: Vec<IntVar> = (0..12)
            .map(|i| model.new_int_var(0, 10, format!("v{i}")))
            .collect();
        model.add_all_different(vars);

        let solution = SearchSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert_eq!(solution.nodes, 0);
    }
}
