//! Propagation engine tests
//!
//! Generation steps and the two-pass driver, on both store realizations.

mod common;

use common::ScriptedRng;
use outbreak_simulator_core_rs::propagation::{generation_step, propagate};
use outbreak_simulator_core_rs::seeding::create_index_case;
use outbreak_simulator_core_rs::{
    Day, EmployeeId, GraphStore, PropagationConfig, RngManager, MINIMAL_INCUBATION,
};
use std::collections::BTreeSet;

fn config(investigation_day: Day) -> PropagationConfig {
    PropagationConfig {
        investigation_day,
        random_factor: 0,
        minimal_incubation: MINIMAL_INCUBATION,
    }
}

fn iteration_of<S: GraphStore>(store: &S, id: EmployeeId) -> Option<u32> {
    store.employee(id).unwrap().and_then(|e| e.iteration())
}

fn edges<S: GraphStore>(store: &S) -> Vec<(EmployeeId, EmployeeId, Day)> {
    let mut edges: Vec<_> = store
        .infection_edges()
        .unwrap()
        .into_iter()
        .map(|edge| (edge.source, edge.target, edge.day))
        .collect();
    edges.sort_unstable();
    edges
}

// ============================================================================
// Generation Step
// ============================================================================

fn check_highest_ids_selected<S: GraphStore>(mut store: S, already_infected: bool) {
    let index = create_index_case(&mut store, 0).unwrap();
    assert_eq!(index.id, 11);

    let mut rng = RngManager::new(1);
    let step = generation_step(&mut store, &mut rng, &config(10), 1, 10, 2).unwrap();

    assert_eq!(iteration_of(&store, 4), Some(2));
    assert_eq!(iteration_of(&store, 3), None);
    if already_infected {
        // 5 was attributed to the index case and still took a slot of the cap
        assert_eq!(iteration_of(&store, 5), Some(1));
        assert_eq!(step.new_infections, 1);
    } else {
        assert_eq!(iteration_of(&store, 5), Some(2));
        assert_eq!(step.new_infections, 2);
        assert_eq!(store.parent_edge_of(5).unwrap(), Some((10, 3)));
    }
    assert_eq!(store.parent_edge_of(4).unwrap(), Some((10, 3)));
    assert_eq!(step.effective_r, 2);
}

#[test]
fn test_step_selects_highest_neighbor_ids() {
    let employees = [(1, false), (2, false), (3, false), (4, false), (5, false), (10, true)];
    let contacts = [(10, 1, 3), (10, 2, 3), (10, 3, 3), (10, 4, 3), (10, 5, 3)];
    check_highest_ids_selected(common::memory(&employees, &contacts), false);
    check_highest_ids_selected(common::sqlite(&employees, &contacts), false);
}

#[test]
fn test_already_infected_neighbor_consumes_cap() {
    let employees = [(1, false), (2, false), (3, false), (4, false), (5, true), (10, true)];
    let contacts = [(10, 1, 3), (10, 2, 3), (10, 3, 3), (10, 4, 3), (10, 5, 3)];
    check_highest_ids_selected(common::memory(&employees, &contacts), true);
    check_highest_ids_selected(common::sqlite(&employees, &contacts), true);
}

fn check_repeated_contacts_use_one_slot<S: GraphStore>(mut store: S) {
    create_index_case(&mut store, 0).unwrap();
    let mut rng = RngManager::new(1);

    let step = generation_step(&mut store, &mut rng, &config(10), 1, 10, 2).unwrap();

    // 4 was met twice in the window and still leaves a slot for 3
    assert_eq!(iteration_of(&store, 4), Some(2));
    assert_eq!(iteration_of(&store, 3), Some(2));
    assert_eq!(iteration_of(&store, 2), None);
    assert_eq!(step.new_infections, 2);
    assert_eq!(step.edges_created, 3);
}

#[test]
fn test_cap_counts_neighbors_not_contacts() {
    let employees = [(1, true), (2, false), (3, false), (4, false)];
    let contacts = [(1, 4, 3), (1, 4, 4), (1, 3, 3), (1, 2, 3)];
    check_repeated_contacts_use_one_slot(common::memory(&employees, &contacts));
    check_repeated_contacts_use_one_slot(common::sqlite(&employees, &contacts));
}

fn check_window_bounds<S: GraphStore>(mut store: S) {
    create_index_case(&mut store, 0).unwrap();
    let mut rng = RngManager::new(1);

    // Parent day 0 + minimal incubation 2 → window [2, 5]
    let step = generation_step(&mut store, &mut rng, &config(10), 1, 5, 10).unwrap();

    let infected: BTreeSet<EmployeeId> = [2, 3, 5]
        .into_iter()
        .filter(|&id| iteration_of(&store, id) == Some(2))
        .collect();
    assert_eq!(infected, BTreeSet::from([2, 3, 5]));
    assert_eq!(iteration_of(&store, 1), None);
    assert_eq!(iteration_of(&store, 4), None);

    // The selected neighbor 5 gets an edge for its out-of-window contact too
    let from_source: Vec<_> = edges(&store)
        .into_iter()
        .filter(|&(source, _, _)| source == 10)
        .collect();
    assert_eq!(
        from_source,
        vec![(10, 2, 2), (10, 3, 5), (10, 5, 3), (10, 5, 9)]
    );
    assert_eq!(step.new_infections, 3);
    assert_eq!(step.edges_created, 4);
}

#[test]
fn test_window_is_inclusive_and_edges_use_every_contact() {
    let employees = [(1, false), (2, false), (3, false), (4, false), (5, false), (10, true)];
    let contacts = [(10, 1, 1), (10, 2, 2), (3, 10, 5), (10, 4, 6), (10, 5, 3), (5, 10, 9)];
    check_window_bounds(common::memory(&employees, &contacts));
    check_window_bounds(common::sqlite(&employees, &contacts));
}

fn check_reads_see_pre_step_state<S: GraphStore>(mut store: S) {
    create_index_case(&mut store, 0).unwrap();
    let mut rng = RngManager::new(1);

    let step = generation_step(&mut store, &mut rng, &config(10), 1, 10, 1).unwrap();

    assert_eq!(step.sources, 2);
    assert_eq!(step.new_infections, 1);
    assert_eq!(step.edges_created, 2);
    assert_eq!(iteration_of(&store, 3), Some(2));
    assert_eq!(
        edges(&store)
            .into_iter()
            .filter(|&(_, target, _)| target == 3)
            .collect::<Vec<_>>(),
        vec![(1, 3, 4), (2, 3, 3)]
    );
}

#[test]
fn test_target_reached_by_two_sources_gets_two_edges() {
    let employees = [(1, true), (2, true), (3, false)];
    let contacts = [(1, 3, 4), (2, 3, 3)];
    check_reads_see_pre_step_state(common::memory(&employees, &contacts));
    check_reads_see_pre_step_state(common::sqlite(&employees, &contacts));
}

fn check_zero_cap<S: GraphStore>(mut store: S) {
    create_index_case(&mut store, 0).unwrap();
    let mut rng = RngManager::new(1);

    let outcome = propagate(&mut store, &mut rng, &config(10), -1).unwrap();

    assert_eq!(outcome.generations, 1);
    assert_eq!(outcome.bound_pass.len(), 1);
    assert_eq!(outcome.replay_pass.len(), 1);
    assert_eq!(outcome.bound_pass_infections() + outcome.replay_pass_infections(), 0);
    assert_eq!(iteration_of(&store, 2), None);
}

#[test]
fn test_non_positive_r_means_no_growth() {
    let employees = [(1, true), (2, false)];
    let contacts = [(1, 2, 5)];
    check_zero_cap(common::memory(&employees, &contacts));
    check_zero_cap(common::sqlite(&employees, &contacts));
}

// ============================================================================
// Two-Pass Driver
// ============================================================================

/// 1, 2, 3 infected and seeded on day 3, investigation day 10
const CHAIN_EMPLOYEES: [(EmployeeId, bool); 7] = [
    (1, true),
    (2, true),
    (3, true),
    (4, false),
    (5, false),
    (6, false),
    (7, false),
];
const CHAIN_CONTACTS: [(EmployeeId, EmployeeId, Day); 6] =
    [(1, 2, 5), (1, 3, 6), (2, 4, 6), (4, 5, 8), (3, 6, 9), (6, 7, 10)];

fn check_two_passes<S: GraphStore>(mut store: S) {
    create_index_case(&mut store, 3).unwrap();
    let config = PropagationConfig {
        random_factor: 1,
        ..config(10)
    };
    let mut rng = ScriptedRng::new(vec![1]);

    let outcome = propagate(&mut store, &mut rng, &config, 1).unwrap();

    // Bound pass (day 8): 2 → 4 on day 6, 4 → 5 on day 8, then a dry step
    assert_eq!(outcome.generations, 3);
    assert_eq!(outcome.bound_pass_infections(), 2);
    assert!(outcome.bound_pass.iter().all(|step| step.day_bound == 8));
    assert_eq!(outcome.bound_pass[2].new_infections, 0);

    // Replay pass (day 10): 3 → 6 on day 9 becomes reachable
    assert_eq!(outcome.replay_pass.len(), 3);
    let replayed: Vec<u32> = outcome.replay_pass.iter().map(|s| s.generation).collect();
    assert_eq!(replayed, vec![1, 2, 3]);
    assert!(outcome.replay_pass.iter().all(|step| step.day_bound == 10));
    assert_eq!(outcome.replay_pass_infections(), 1);

    assert_eq!(iteration_of(&store, 4), Some(2));
    assert_eq!(iteration_of(&store, 5), Some(3));
    assert_eq!(iteration_of(&store, 6), Some(2));
    assert_eq!(iteration_of(&store, 7), None);

    // One jitter draw per step of either pass
    assert_eq!(rng.draws, 6);
}

#[test]
fn test_bound_pass_then_replay_pass() {
    check_two_passes(common::memory(&CHAIN_EMPLOYEES, &CHAIN_CONTACTS));
    check_two_passes(common::sqlite(&CHAIN_EMPLOYEES, &CHAIN_CONTACTS));
}

fn check_equal_bounds<S: GraphStore>(mut store: S) {
    create_index_case(&mut store, 0).unwrap();
    let config = PropagationConfig {
        minimal_incubation: 0,
        ..config(10)
    };
    let mut rng = RngManager::new(1);

    let outcome = propagate(&mut store, &mut rng, &config, 1).unwrap();

    assert_eq!(outcome.generations, 4);
    assert_eq!(outcome.bound_pass_infections(), 3);
    assert_eq!(outcome.replay_pass.len(), 4);
    assert_eq!(outcome.replay_pass_infections(), 0);
    assert_eq!(iteration_of(&store, 4), Some(4));
}

#[test]
fn test_replay_adds_nothing_when_bounds_coincide() {
    let employees = [(1, true), (2, false), (3, false), (4, false)];
    let contacts = [(1, 2, 4), (2, 3, 5), (3, 4, 7)];
    check_equal_bounds(common::memory(&employees, &contacts));
    check_equal_bounds(common::sqlite(&employees, &contacts));
}
