//! Monte-Carlo play simulator: rolls candidate plays forward a fixed number
//! of plies against a resampled opponent rack, accumulating win%/equity/score
//! statistics per play until a stopping condition fires or `max_iterations`
//! is reached.
//!
//! Concurrency uses native OS threads, one pool per call, with workers
//! polling a shared halt flag rather than yielding cooperatively: a
//! `rayon::ThreadPoolBuilder` pool with one `scope.spawn` per thread, each
//! running its own iteration loop against a `Mutex<Vec<SimmedPlay>>`.

use crate::control::{HaltStatus, ThreadControl};
use crate::game::{Game, Move, MoveRecordType, PASS_MOVE_EQUITY};
use crate::movegen::{generate_moves, GenerationInput};
use crate::simulate::stats::{SimmedPlay, WinPctTable};
use crate::{z_value, MAX_THREADS};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Minimum samples a play must have before it's eligible for dominance
/// pruning or for the stopping-condition win to be declared — otherwise an
/// early lucky/unlucky streak could falsely halt the run.
const MIN_SAMPLES_BEFORE_JUDGING: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoppingCondition {
    None,
    P95,
    P98,
    P99,
}

impl StoppingCondition {
    fn z(self) -> Option<f32> {
        match self {
            StoppingCondition::None => None,
            StoppingCondition::P95 => Some(z_value::Z95),
            StoppingCondition::P98 => Some(z_value::Z98),
            StoppingCondition::P99 => Some(z_value::Z99),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of plies rolled out per iteration, counting the candidate play
    /// itself as ply 1.
    pub plies: usize,
    pub max_iterations: usize,
    pub stopping_condition: StoppingCondition,
    pub num_threads: usize,
    pub seed: u64,
    pub print_info_interval: usize,
    pub check_stopping_condition_interval: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            plies: 2,
            max_iterations: 100_000,
            stopping_condition: StoppingCondition::None,
            num_threads: 1,
            seed: 0,
            print_info_interval: 10_000,
            check_stopping_condition_interval: 16,
        }
    }
}

pub struct SimResults {
    /// Sorted descending by mean win percentage.
    pub plays: Vec<SimmedPlay>,
    pub iterations_run: usize,
    pub halt_status: HaltStatus,
}

/// Runs the simulation. `candidates` is typically the output of
/// [`crate::movegen::generate_moves`] for the player on turn; plays that are
/// "similar" (per [`Move::is_similar_to`]) to an earlier candidate are merged
/// before simulation starts, since rolling out near-duplicate plays wastes
/// iterations without narrowing the ranking (an explicit simplification of
/// a continuous similar-play dedup, recorded in DESIGN.md).
pub fn simulate(game: &Game, candidates: Vec<Move>, config: &SimConfig) -> SimResults {
    let deduped = dedup_similar(candidates);
    let win_pct_table = WinPctTable::synthetic(game.ld.total_tiles());
    let plays: Mutex<Vec<SimmedPlay>> = Mutex::new(deduped.into_iter().map(SimmedPlay::new).collect());
    let iterations_run = AtomicUsize::new(0);
    let control = ThreadControl::new(config.print_info_interval, config.check_stopping_condition_interval);
    let num_threads = config.num_threads.clamp(1, MAX_THREADS);
    let z = config.stopping_condition.z();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .expect("failed to build simulator thread pool");

    pool.scope(|scope| {
        for worker_id in 0..num_threads {
            let plays_ref = &plays;
            let control_ref = &control;
            let iterations_ref = &iterations_run;
            let win_pct_table_ref = &win_pct_table;
            scope.spawn(move |_| loop {
                if control_ref.is_halted() {
                    break;
                }
                let iter = iterations_ref.fetch_add(1, Ordering::SeqCst) + 1;
                if iter > config.max_iterations {
                    control_ref.halt(HaltStatus::MaxIterations);
                    break;
                }
                run_one_iteration(game, plays_ref, config, worker_id, iter, win_pct_table_ref);

                if let Some(z) = z {
                    if control_ref.should_check_stopping_condition(iter) && control_ref.try_claim_stop_check() {
                        if dominance_check(plays_ref, z) {
                            control_ref.halt(HaltStatus::Probabilistic);
                        }
                        control_ref.release_stop_check();
                    }
                }
                if control_ref.should_print_info(iter) {
                    log::info!("simulate: {iter} iterations completed");
                }
            });
        }
    });

    let mut plays = plays.into_inner().expect("simulator mutex poisoned");
    plays.sort_by(|a, b| b.win_pct.mean().partial_cmp(&a.win_pct.mean()).unwrap_or(std::cmp::Ordering::Equal));
    SimResults {
        plays,
        iterations_run: iterations_run.load(Ordering::SeqCst),
        halt_status: control.status(),
    }
}

fn dedup_similar(candidates: Vec<Move>) -> Vec<Move> {
    let mut out: Vec<Move> = Vec::with_capacity(candidates.len());
    for mv in candidates {
        if !out.iter().any(|kept| kept.is_similar_to(&mv)) {
            out.push(mv);
        }
    }
    out
}

/// Resamples `opponent`'s rack from the pool of tiles not visible to the
/// player on turn (the current bag plus the opponent's own rack), via the
/// bag's own return/draw primitives so the result stays consistent with
/// [`crate::tiles::Bag`]'s deterministic draw order.
fn resample_opponent_rack(game: &mut Game, opponent: usize) {
    let held = game.players[opponent].rack.len();
    let counts = game.players[opponent].rack.counts().to_vec();
    for (ml, &c) in counts.iter().enumerate() {
        for _ in 0..c {
            game.bag.return_tile(ml as u8, opponent);
        }
    }
    game.players[opponent].rack = crate::tiles::Rack::empty(game.ld.size());
    for _ in 0..held {
        if let Some(drawn) = game.bag.draw_random(opponent) {
            let _ = game.players[opponent].rack.add(drawn);
        }
    }
}

/// The single best move for whoever is on turn in `game`, used to roll out
/// plies beyond the candidate under simulation. Built from a throwaway copy
/// of that player with `RecordBest` forced, independent of whatever record
/// type they're actually configured with.
fn best_move_for_current_player(game: &Game) -> Move {
    let on_turn = game.player_on_turn;
    let opponent = game.opponent();
    let mut player = game.players[on_turn].clone();
    player.move_record_type = MoveRecordType::RecordBest;
    let input = GenerationInput {
        board: &game.board,
        ld: &game.ld,
        player: &player,
        bag_size: game.bag.tiles_remaining(),
        opponent_rack_score: game.players[opponent].rack.score(&game.ld),
        num_plays: 1,
    };
    generate_moves(&input).into_iter().next().unwrap_or_else(|| Move::pass(PASS_MOVE_EQUITY))
}

fn run_one_iteration(
    template: &Game,
    plays: &Mutex<Vec<SimmedPlay>>,
    config: &SimConfig,
    worker_id: usize,
    iter: usize,
    win_pct_table: &WinPctTable,
) {
    let mut base_game = template.clone();
    base_game.bag.seed_for_worker(config.seed.wrapping_add(worker_id as u64), iter);
    base_game.bag.shuffle();
    let sim_player = base_game.player_on_turn;
    let opponent = base_game.opponent();
    resample_opponent_rack(&mut base_game, opponent);

    let snapshot: Vec<(usize, Move, bool)> = {
        let guard = plays.lock().expect("simulator mutex poisoned");
        guard.iter().enumerate().map(|(i, p)| (i, p.play.clone(), p.dead)).collect()
    };

    let mut updates = Vec::with_capacity(snapshot.len());
    for (idx, play, dead) in snapshot {
        if dead {
            continue;
        }
        let mut g = base_game.clone();
        let before = g.players[sim_player].score;
        g.play_move(&play);
        let mut plies_done = 1;
        while plies_done < config.plies && !g.is_game_over() {
            let mv = best_move_for_current_player(&g);
            g.play_move(&mv);
            plies_done += 1;
        }
        let spread = g.players[sim_player].score - g.players[opponent].score;
        let tiles_unseen = g.bag.tiles_remaining() + g.players[opponent].rack.len();
        let win = win_pct_table.get(spread, tiles_unseen, g.is_game_over());
        let score_gained = (g.players[sim_player].score - before) as f32;
        updates.push((idx, win, spread as f32, score_gained));
    }

    let mut guard = plays.lock().expect("simulator mutex poisoned");
    for (idx, win, equity, score) in updates {
        guard[idx].record_iteration(win, equity, score);
    }
}

/// A play is pruned once its upper confidence bound falls below the current
/// leader's lower confidence bound, with both sides requiring
/// [`MIN_SAMPLES_BEFORE_JUDGING`] samples. Returns `true` once at most one
/// live play remains, the stopping condition for the simulation as a whole.
fn dominance_check(plays: &Mutex<Vec<SimmedPlay>>, z: f32) -> bool {
    let mut guard = plays.lock().expect("simulator mutex poisoned");
    let leader_idx = guard
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.dead && p.win_pct.num_samples() >= MIN_SAMPLES_BEFORE_JUDGING)
        .max_by(|(_, a), (_, b)| a.win_pct.mean().partial_cmp(&b.win_pct.mean()).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i);

    let Some(leader_idx) = leader_idx else {
        return false;
    };
    let leader_lower = guard[leader_idx].win_pct.mean() - z as f64 * guard[leader_idx].win_pct.stderr();

    for i in 0..guard.len() {
        if i == leader_idx || guard[i].dead {
            continue;
        }
        if guard[i].win_pct.num_samples() < MIN_SAMPLES_BEFORE_JUDGING {
            continue;
        }
        let upper = guard[i].win_pct.mean() + z as f64 * guard[i].win_pct.stderr();
        if upper < leader_lower {
            guard[i].dead = true;
        }
    }
    guard.iter().filter(|p| !p.dead).count() <= 1
}
