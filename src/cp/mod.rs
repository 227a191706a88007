//! Constraint-based slot allocation.
//!
//! Formulates start slot allocation as an integer model and solves it in
//! two phases:
//!
//! 1. **Makespan**: minimise the latest start slot over all courses.
//! 2. **Quality**: with the makespan fixed, maximise
//!    `Σ (count - 1) * interval - Σ offset` (wider spacing per course,
//!    earlier first starts) within a wall-clock budget.
//!
//! # Model
//!
//! Per course with `count` slots:
//! - `interval ∈ [interval_min, interval_max]`
//! - `offset ∈ [0, horizon - (count - 1) * interval_min]`
//! - `slot_k ∈ [0, horizon]` with `slot_k == offset + k * interval`
//!
//! plus all-different over the slots of every conflict group, a per-minute
//! cap of `parallel_max` starts, and `last_start == max(slots)`.
//!
//! `last_start` starts at the largest of three lower bounds: the span of the
//! busiest course, the number of starts over `parallel_max`, and the number
//! of slots in the largest conflict group.
//!
//! The solver is abstracted behind [`CpSolver`]; [`SearchSolver`] is the
//! built-in branch-and-bound engine.
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

mod model;
mod solver;

pub use model::{
    CpConstraint, CpModel, IntVar, LinearExpr, Objective, Relation, ValueOrder, VarDef,
};
pub use solver::{CpSolution, CpSolver, SearchSolver, SolveStatus, SolverConfig};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ScheduleError, SolvePhase};
use crate::models::{AffineSeq, CourseId, Slot, StartConstraints};
use crate::scheduler::{plan_last_start, GreedyAllocator, SlotAllocator, SlotPlan};

/// Parameters of the optimal allocator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalConfig {
    /// Widest interval a course may be stretched to. Raised to the
    /// constraint interval if smaller.
    pub interval_max: Slot,
    /// Latest admissible slot. `None` = makespan of the greedy plan.
    pub horizon: Option<Slot>,
    /// Budget of the quality phase.
    pub timeout: Duration,
    /// Budget of the makespan phase. `None` = same as `timeout`;
    /// `Duration::MAX` searches to completion.
    pub makespan_time_limit: Option<Duration>,
}

impl Default for OptimalConfig {
    fn default() -> Self {
        Self {
            interval_max: 12,
            horizon: None,
            timeout: Duration::from_secs(30),
            makespan_time_limit: None,
        }
    }
}

impl OptimalConfig {
    /// Sets the widest interval.
    pub fn with_interval_max(mut self, interval_max: Slot) -> Self {
        self.interval_max = interval_max;
        self
    }

    /// Fixes the horizon instead of deriving it from the greedy plan.
    pub fn with_horizon(mut self, horizon: Slot) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Sets the quality phase budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bounds the makespan phase.
    pub fn with_makespan_time_limit(mut self, limit: Duration) -> Self {
        self.makespan_time_limit = Some(limit);
        self
    }
}

/// Two-phase constraint optimisation allocator.
///
/// Never produces a later last start than [`GreedyAllocator`] when the
/// horizon is derived from the greedy plan.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use o_schedule::cp::{OptimalAllocator, OptimalConfig};
/// use o_schedule::models::{
///     Category, CategoryId, Course, CourseId, EntryId, Race, Start, StartConstraints,
/// };
/// use o_schedule::scheduler::SlotAllocator;
///
/// let mut category = Category::new(CategoryId(1), "D45", CourseId(1));
/// for id in 1..=4 {
///     category = category.with_start(Start::new(EntryId(id)));
/// }
/// let race = Race::new()
///     .with_course(Course::new(CourseId(1), "B"))
///     .with_category(category);
/// let mut constraints = StartConstraints::new(3);
/// constraints.add_race_courses(&race);
///
/// let config = OptimalConfig::default().with_timeout(Duration::from_secs(1));
/// let allocator = OptimalAllocator::new(config);
/// let plan = allocator.allocate(&constraints).unwrap();
/// assert_eq!(plan[&CourseId(1)].iter().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
/// ```
#[derive(Debug, Clone)]
pub struct OptimalAllocator<S = SearchSolver> {
    config: OptimalConfig,
    solver: S,
}

impl OptimalAllocator<SearchSolver> {
    /// Creates an allocator backed by [`SearchSolver`].
    pub fn new(config: OptimalConfig) -> Self {
        Self {
            config,
            solver: SearchSolver::new(),
        }
    }
}

impl Default for OptimalAllocator<SearchSolver> {
    fn default() -> Self {
        Self::new(OptimalConfig::default())
    }
}

impl<S: CpSolver> OptimalAllocator<S> {
    /// Creates an allocator backed by a custom solver.
    pub fn with_solver(config: OptimalConfig, solver: S) -> Self {
        Self { config, solver }
    }

    /// Allocator parameters.
    pub fn config(&self) -> &OptimalConfig {
        &self.config
    }

    /// Horizon and greedy seed plan.
    fn horizon_and_seed(&self, constraints: &StartConstraints) -> (Slot, Option<SlotPlan>) {
        let seed = match GreedyAllocator::new().allocate(constraints) {
            Ok(plan) => Some(plan),
            Err(err) => {
                debug!(%err, "greedy seed unavailable");
                None
            }
        };

        let horizon = self.config.horizon.unwrap_or_else(|| match &seed {
            Some(plan) => plan_last_start(plan).unwrap_or(0),
            None => constraints
                .course_slot_counts()
                .values()
                .map(|&count| count as Slot * constraints.interval)
                .sum(),
        });
        (horizon, seed)
    }

    fn solve_makespan(
        &self,
        constraints: &StartConstraints,
        horizon: Slot,
        seed: Option<&SlotPlan>,
    ) -> Result<(Slot, Vec<i64>)> {
        let mut start_model = StartModel::build(constraints, self.config.interval_max, horizon);
        start_model.branch(ValueOrder::Ascending);
        if let Some(plan) = seed {
            start_model.hint_plan(plan);
        }
        let last_start = start_model.last_start;
        start_model.model.minimize(last_start);

        let limit = self.config.makespan_time_limit.unwrap_or(self.config.timeout);
        let config = SolverConfig::default().with_time_limit(limit);

        let solution = self.solver.solve(&start_model.model, &config);
        match solution.status {
            SolveStatus::Optimal => {}
            SolveStatus::Feasible => {
                warn!(?limit, "makespan phase stopped early, last start may not be minimal")
            }
            SolveStatus::Infeasible => {
                return Err(ScheduleError::Infeasible {
                    phase: SolvePhase::Makespan,
                })
            }
            SolveStatus::Unknown => {
                return Err(ScheduleError::Timeout {
                    phase: SolvePhase::Makespan,
                })
            }
        }
        let last = solution.values[last_start.index()];
        info!(last_start = last, nodes = solution.nodes, "makespan phase finished");
        Ok((last, start_model.course_values(&solution.values)))
    }

    fn solve_quality(
        &self,
        constraints: &StartConstraints,
        horizon: Slot,
        last_start: Slot,
        hint: &[i64],
    ) -> Result<StartModel> {
        let mut start_model = StartModel::build(constraints, self.config.interval_max, horizon);
        start_model.branch(ValueOrder::Descending);
        start_model.hint_values(hint);
        start_model
            .model
            .add_equality(start_model.last_start.into(), last_start);

        let objective = start_model
            .courses
            .iter()
            .fold(LinearExpr::new(), |expr, course| {
                expr.term(course.count as i64 - 1, course.interval)
                    .term(-1, course.offset)
            });
        start_model.model.maximize(objective);

        let config = SolverConfig::default().with_time_limit(self.config.timeout);
        let solution = self.solver.solve(&start_model.model, &config);
        match solution.status {
            SolveStatus::Optimal | SolveStatus::Feasible => {
                info!(
                    status = ?solution.status,
                    objective = ?solution.objective,
                    nodes = solution.nodes,
                    "quality phase finished"
                );
                start_model.solved = Some(solution.values);
            }
            SolveStatus::Infeasible => {
                return Err(ScheduleError::Infeasible {
                    phase: SolvePhase::Quality,
                })
            }
            SolveStatus::Unknown => {
                warn!("quality phase found no solution in time, keeping makespan solution");
            }
        }
        Ok(start_model)
    }
}

impl<S: CpSolver> SlotAllocator for OptimalAllocator<S> {
    #[instrument(skip_all, fields(timeout = ?self.config.timeout))]
    fn allocate(&self, constraints: &StartConstraints) -> Result<SlotPlan> {
        constraints.check()?;

        let (horizon, seed) = self.horizon_and_seed(constraints);
        debug!(horizon, seeded = seed.is_some(), "building start model");

        let (last_start, makespan_values) =
            self.solve_makespan(constraints, horizon, seed.as_ref())?;
        let quality = self.solve_quality(constraints, horizon, last_start, &makespan_values)?;

        match &quality.solved {
            Some(values) => quality.decode(&quality.course_values(values)),
            None => quality.decode(&makespan_values),
        }
    }
}

/// Smallest last start any plan can reach.
fn makespan_lower_bound(
    constraints: &StartConstraints,
    counts: &BTreeMap<CourseId, usize>,
) -> Slot {
    let span = counts
        .values()
        .map(|&count| (count as Slot - 1) * constraints.interval)
        .max()
        .unwrap_or(0);

    let total: usize = counts.values().sum();
    let crowd = constraints
        .parallel_max
        .map_or(0, |cap| total.div_ceil(cap.max(1)) as Slot - 1);

    let conflict = constraints
        .conflicts
        .iter()
        .map(|group| {
            let members: BTreeSet<CourseId> = group.iter().copied().collect();
            let slots: usize = members.iter().filter_map(|c| counts.get(c)).sum();
            slots as Slot - 1
        })
        .max()
        .unwrap_or(0);

    span.max(crowd).max(conflict).max(0)
}

/// Variables of one course.
#[derive(Debug, Clone)]
struct CourseVars {
    course: CourseId,
    count: usize,
    interval: IntVar,
    offset: IntVar,
}

/// The start slot model with handles to its variables.
#[derive(Debug)]
struct StartModel {
    model: CpModel,
    /// Ascending by course id.
    courses: Vec<CourseVars>,
    last_start: IntVar,
    solved: Option<Vec<i64>>,
}

impl StartModel {
    fn build(constraints: &StartConstraints, interval_max: Slot, horizon: Slot) -> Self {
        let interval_min = constraints.interval;
        let interval_max = interval_max.max(interval_min);

        let mut model = CpModel::new("start-slots");
        let mut courses = Vec::new();
        let mut slots_of: HashMap<CourseId, Vec<IntVar>> = HashMap::new();
        let mut last_slots = Vec::new();

        let counts = constraints.course_slot_counts();
        for (&course, &count) in &counts {
            let n = count as i64;
            let (interval, offset) = if count == 0 {
                (
                    model.new_int_var(interval_min, interval_min, format!("interval_{course}")),
                    model.new_int_var(0, 0, format!("offset_{course}")),
                )
            } else {
                let interval_ub = if count > 1 {
                    interval_max.min(horizon / (n - 1))
                } else {
                    interval_max
                };
                let offset_ub = horizon - (n - 1) * interval_min;
                (
                    model.new_int_var(interval_min, interval_ub, format!("interval_{course}")),
                    model.new_int_var(0, offset_ub, format!("offset_{course}")),
                )
            };

            let slots: Vec<IntVar> = (0..n)
                .map(|k| {
                    let slot = model.new_int_var(0, horizon, format!("slot_{course}_{k}"));
                    model.add_equality(
                        LinearExpr::new()
                            .term(1, offset)
                            .term(k, interval)
                            .term(-1, slot),
                        0,
                    );
                    slot
                })
                .collect();

            // The last slot of a course is its largest.
            if let Some(&last) = slots.last() {
                last_slots.push(last);
            }
            slots_of.insert(course, slots);
            courses.push(CourseVars {
                course,
                count,
                interval,
                offset,
            });
        }

        for group in &constraints.conflicts {
            let members: BTreeSet<CourseId> = group.iter().copied().collect();
            let vars: Vec<IntVar> = members
                .iter()
                .filter_map(|course| slots_of.get(course))
                .flatten()
                .copied()
                .collect();
            if vars.len() > 1 {
                model.add_all_different(vars);
            }
        }

        if let Some(cap) = constraints.parallel_max {
            let all: Vec<IntVar> = slots_of.values().flatten().copied().collect();
            model.add_value_capacity(all, cap);
        }

        let lower = makespan_lower_bound(constraints, &counts);
        let last_start = model.new_int_var(lower, horizon.max(0), "last_start");
        model.add_max_equality(last_start, last_slots);

        debug!(
            vars = model.var_count(),
            constraints = model.constraint_count(),
            "start model built"
        );

        Self {
            model,
            courses,
            last_start,
            solved: None,
        }
    }

    /// Branches on the busiest courses first: all intervals in `interval_order`,
    /// then all offsets ascending.
    fn branch(&mut self, interval_order: ValueOrder) {
        let mut busiest: Vec<&CourseVars> = self.courses.iter().collect();
        busiest.sort_by(|a, b| b.count.cmp(&a.count));

        let intervals = busiest.iter().map(|c| (c.interval, interval_order));
        let offsets = busiest.iter().map(|c| (c.offset, ValueOrder::Ascending));
        let branching = intervals.chain(offsets).collect();
        self.model.set_branching(branching);
    }

    fn hint_plan(&mut self, plan: &SlotPlan) {
        for course in &self.courses {
            if course.count == 0 {
                continue;
            }
            if let Some(seq) = plan.get(&course.course) {
                self.model.add_hint(course.interval, seq.step());
                self.model.add_hint(course.offset, seq.start());
            }
        }
    }

    /// Hints `(interval, offset)` pairs as returned by `course_values`.
    fn hint_values(&mut self, values: &[i64]) {
        for (course, pair) in self.courses.iter().zip(values.chunks_exact(2)) {
            self.model.add_hint(course.interval, pair[0]);
            self.model.add_hint(course.offset, pair[1]);
        }
    }

    /// Flattened `(interval, offset)` per course from a full assignment.
    fn course_values(&self, values: &[i64]) -> Vec<i64> {
        self.courses
            .iter()
            .flat_map(|c| [values[c.interval.index()], values[c.offset.index()]])
            .collect()
    }

    fn decode(&self, course_values: &[i64]) -> Result<SlotPlan> {
        self.courses
            .iter()
            .zip(course_values.chunks_exact(2))
            .map(|(course, pair)| {
                let (interval, offset) = (pair[0], pair[1]);
                let stop = offset + interval * course.count as i64;
                let seq = AffineSeq::new(offset, stop, interval)?;
                debug!(course = %course.course, slots = %seq, "allocated course");
                Ok((course.course, seq))
            })
            .collect()
    }
}
