use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use o_schedule::models::{
    Category, CategoryId, Course, CourseId, Entry, EntryId, OrganisationId, Race, Slot, Start,
    StartConstraints,
};
use o_schedule::cp::{OptimalAllocator, OptimalConfig};
use o_schedule::scheduler::{
    disjoin, fill_slots, plan_last_start, GreedyAllocator, ScheduleStatistics, SlotAllocator,
    SlotOccupancy, SlotPlan,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Courses -> categories -> (starters, guests, vacancies before, vacancies after).
///
/// Guests are non-competitive starters.
type RaceShape = Vec<Vec<(usize, usize, u32, u32)>>;

fn arb_race_shape() -> impl Strategy<Value = RaceShape> {
    prop::collection::vec(
        prop::collection::vec((0usize..6, 0usize..3, 0u32..2, 0u32..2), 1..4),
        1..5,
    )
}

/// Small races the constraint search settles quickly.
fn arb_small_shape() -> impl Strategy<Value = RaceShape> {
    let category = (0usize..5, Just(0), Just(0), Just(0));
    prop::collection::vec(prop::collection::vec(category, 1..2), 1..4)
}

fn make_constraints(
    race: &Race,
    interval: i64,
    parallel_max: Option<usize>,
    conflict_all: bool,
) -> StartConstraints {
    let mut constraints = StartConstraints::new(interval);
    constraints.add_race_courses(race);
    if let Some(cap) = parallel_max {
        constraints = constraints.with_parallel_max(cap);
    }
    if conflict_all {
        constraints.add_conflict_group(race.courses.iter().map(|c| c.id).collect());
    }
    constraints
}

fn check_plan(plan: &SlotPlan, constraints: &StartConstraints) -> Result<(), TestCaseError> {
    let counts = constraints.course_slot_counts();
    let mut occupancy = SlotOccupancy::new();
    for (course, seq) in plan {
        prop_assert_eq!(seq.len(), counts[course]);
        prop_assert!(seq.step() >= constraints.interval);
        prop_assert!(seq.start() >= 0);
        occupancy.occupy(seq);
    }
    if let Some(cap) = constraints.parallel_max {
        prop_assert!(occupancy.peak() <= cap);
    }
    for group in &constraints.conflicts {
        let mut seen = HashSet::new();
        for course in group {
            for slot in &plan[course] {
                prop_assert!(seen.insert(slot), "slot {} used twice", slot);
            }
        }
    }
    Ok(())
}

fn build_race(shape: &RaceShape, clubs: u32) -> Race {
    let mut race = Race::new();
    let mut category_id = 0;
    let mut entry_id = 0;
    for (c, categories) in shape.iter().enumerate() {
        let course = CourseId(c as u32 + 1);
        race = race.with_course(Course::new(course, format!("K{c}")));
        for &(starters, guests, before, after) in categories {
            category_id += 1;
            let name = format!("C{category_id}");
            let mut category =
                Category::new(CategoryId(category_id), name, course).with_vacancies(before, after);
            for k in 0..starters + guests {
                entry_id += 1;
                let entry = Entry::new(EntryId(entry_id), format!("E{entry_id}"))
                    .with_organisation(OrganisationId(entry_id % clubs.max(1)));
                race = race.with_entry(entry);
                let start = if k < starters {
                    Start::new(EntryId(entry_id))
                } else {
                    Start::non_competitive(EntryId(entry_id))
                };
                category = category.with_start(start);
            }
            race = race.with_category(category);
        }
    }
    race
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    #[test]
    fn greedy_respects_capacity_and_conflicts(
        shape in arb_race_shape(),
        interval in 1i64..4,
        parallel_max in prop::option::of(1usize..4),
        conflict_all in any::<bool>(),
    ) {
        let race = build_race(&shape, 3);
        let constraints = make_constraints(&race, interval, parallel_max, conflict_all);

        let plan = GreedyAllocator::new().allocate(&constraints).unwrap();

        check_plan(&plan, &constraints)?;
        prop_assert!(plan.values().all(|seq| seq.step() == interval));
    }

    #[test]
    fn filler_places_every_starter(
        shape in arb_race_shape(),
        interval in 1i64..4,
        clubs in 1u32..4,
        seed in any::<u64>(),
    ) {
        let mut race = build_race(&shape, clubs);
        let mut constraints = StartConstraints::new(interval).with_parallel_max(2);
        constraints.add_race_courses(&race);

        let plan = GreedyAllocator::new().allocate(&constraints).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        fill_slots(&mut race, &constraints, &plan, &mut rng).unwrap();

        for category in &race.categories {
            let seq = plan[&category.course_id];
            let mut slots = HashSet::new();
            for start in &category.starts {
                let slot = Race::absolute_start(category, start);
                prop_assert!(slot.is_some());
                let slot = slot.unwrap();
                prop_assert!(seq.contains(slot));
                prop_assert!(slots.insert(slot));
            }
            // Guests start after every competitive starter of their category.
            let latest_competitive = category
                .starts
                .iter()
                .filter(|s| s.competitive)
                .filter_map(|s| s.time_offset)
                .max();
            for guest in category.starts.iter().filter(|s| !s.competitive) {
                prop_assert!(guest.time_offset > latest_competitive);
            }
        }

        let stats = ScheduleStatistics::calculate(&race);
        prop_assert_eq!(stats.unassigned, 0);
        prop_assert_eq!(stats.entries_total, race.start_count());
        prop_assert!(stats.peak_parallel() <= 2);
    }

    #[test]
    fn disjoin_separates_when_possible(keys in prop::collection::vec(0u8..4, 0..=10)) {
        let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
        for &k in &keys {
            *counts.entry(k).or_insert(0) += 1;
        }
        let most = counts.values().copied().max().unwrap_or(0);
        prop_assume!(most <= keys.len().div_ceil(2));

        let mut items = keys.clone();
        disjoin(&mut items, |k| *k);

        prop_assert!(items.windows(2).all(|w| w[0] != w[1]), "{:?} -> {:?}", keys, items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        let mut expected = keys;
        expected.sort_unstable();
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn disjoin_keeps_items(keys in prop::collection::vec(0u8..3, 0..30)) {
        let mut items: Vec<(u8, usize)> = keys.iter().copied().zip(0..).collect();
        disjoin(&mut items, |(k, _)| *k);
        let mut ids: Vec<usize> = items.iter().map(|&(_, id)| id).collect();
        ids.sort_unstable();
        prop_assert_eq!(ids, (0..keys.len()).collect::<Vec<_>>());
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(32))]

    #[test]
    fn optimal_not_later_than_greedy(
        shape in arb_small_shape(),
        interval in 1i64..3,
        parallel_max in prop::option::of(1usize..3),
        conflict_all in any::<bool>(),
    ) {
        let race = build_race(&shape, 2);
        let constraints = make_constraints(&race, interval, parallel_max, conflict_all);
        let budget = Duration::from_millis(200);
        let config = OptimalConfig::default()
            .with_interval_max(4)
            .with_timeout(budget)
            .with_makespan_time_limit(budget);

        let greedy = GreedyAllocator::new().allocate(&constraints).unwrap();
        let optimal = OptimalAllocator::new(config).allocate(&constraints).unwrap();

        check_plan(&optimal, &constraints)?;
        prop_assert!(
            plan_last_start(&optimal) <= plan_last_start(&greedy),
            "optimal {:?} greedy {:?}",
            optimal,
            greedy
        );
    }
}

#[test]
fn statistics_span_matches_plan() {
    let shape: RaceShape = vec![vec![(3, 0, 0, 0)], vec![(2, 0, 0, 0)]];
    let mut race = build_race(&shape, 2);
    let mut constraints = StartConstraints::new(2).with_parallel_max(1);
    constraints.add_race_courses(&race);

    let plan = GreedyAllocator::new().allocate(&constraints).unwrap();
    fill_slots(&mut race, &constraints, &plan, &mut StdRng::seed_from_u64(1)).unwrap();

    let stats = ScheduleStatistics::calculate(&race);
    let last: Option<Slot> = plan.values().filter_map(|s| s.last()).max();
    assert_eq!(stats.last_start, last);
    assert_eq!(stats.entries_per_slot.get(&1), Some(&5));
}
