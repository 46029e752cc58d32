//! Thin CLI entry point: parses a [`Config`], builds a [`Game`], and
//! dispatches to `genmoves`/`sim`/`infer`. Everything past argument parsing
//! delegates to the library — this binary stands in for a UCGI console
//! loop without implementing the protocol itself, dispatching a single
//! invocation rather than looping over stdin since there's no client
//! connection to hold open between commands.

use clap::Parser;
use crossword_engine::config::Config;
use crossword_engine::game::{Game, Move};
use crossword_engine::infer::{infer, InferenceInput};
use crossword_engine::lexicon::{Klv, Kwg, KwgBuilder};
use crossword_engine::movegen::{generate_moves, GenerationInput};
use crossword_engine::simulate::{simulate, SimConfig};
use crossword_engine::tiles::LetterDistribution;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    crossword_engine::init_logging();
    let config = Config::parse();
    let ld = Arc::new(letter_distribution_for(&config.ld));
    let kwg = Arc::new(synthetic_kwg());
    let klv = Arc::new(Klv::synthetic(&ld, 3));

    let mut game = match &config.cgp {
        Some(cgp) => Game::from_cgp(cgp, ld.clone(), [kwg.clone(), kwg.clone()], [klv.clone(), klv.clone()], config.seed)?,
        None => {
            use crossword_engine::game::Player;
            let p0 = Player::new("p0", ld.size(), kwg.clone(), klv.clone());
            let p1 = Player::new("p1", ld.size(), kwg.clone(), klv.clone());
            let mut game = Game::new(ld.clone(), config.seed, [p0, p1], 0);
            game.recompute_all();
            game
        }
    };
    game.players[0].move_sort_type = Config::move_sort_type(&config.s1);
    game.players[1].move_sort_type = Config::move_sort_type(&config.s2);
    game.players[0].move_record_type = Config::move_record_type(&config.r1);
    game.players[1].move_record_type = Config::move_record_type(&config.r2);

    match config.mode.as_str() {
        "genmoves" => run_genmoves(&game, &config),
        "sim" => run_sim(&game, &config),
        "infer" => run_infer(&game, &config)?,
        other => anyhow::bail!("unknown mode '{other}', expected genmoves, sim, or infer"),
    }
    Ok(())
}

fn run_genmoves(game: &Game, config: &Config) {
    let on_turn = game.player_on_turn;
    let opponent = game.opponent();
    let input = GenerationInput {
        board: &game.board,
        ld: &game.ld,
        player: &game.players[on_turn],
        bag_size: game.bag.tiles_remaining(),
        opponent_rack_score: game.players[opponent].rack.score(&game.ld),
        num_plays: config.numplays,
    };
    let rack_str = game.players[on_turn].rack.to_string(&game.ld);
    for mv in generate_moves(&input) {
        println!("{}", mv.to_ucgi(&game.ld, &rack_str));
    }
}

fn run_sim(game: &Game, config: &Config) {
    let on_turn = game.player_on_turn;
    let opponent = game.opponent();
    let input = GenerationInput {
        board: &game.board,
        ld: &game.ld,
        player: &game.players[on_turn],
        bag_size: game.bag.tiles_remaining(),
        opponent_rack_score: game.players[opponent].rack.score(&game.ld),
        num_plays: config.numplays,
    };
    let candidates: Vec<Move> = generate_moves(&input);
    let sim_config = SimConfig {
        plies: config.plies,
        max_iterations: config.iterations,
        stopping_condition: config.stopping_condition(),
        num_threads: config.thread_count(),
        seed: config.seed,
        ..SimConfig::default()
    };
    let results = simulate(game, candidates, &sim_config);
    println!("ran {} iterations, halt: {:?}", results.iterations_run, results.halt_status);
    let rack_str = game.players[on_turn].rack.to_string(&game.ld);
    for simmed in &results.plays {
        println!(
            "{}  win%={:.3} equity={:.2} n={}",
            simmed.play.to_ucgi(&game.ld, &rack_str),
            simmed.win_pct.mean(),
            simmed.equity.mean(),
            simmed.win_pct.num_samples(),
        );
    }
}

fn run_infer(game: &Game, config: &Config) -> anyhow::Result<()> {
    let observed_str = config.observed.as_ref().ok_or_else(|| anyhow::anyhow!("--observed is required in infer mode"))?;
    let observed = Move::from_ucgi(observed_str, &game.ld)?;
    let input = InferenceInput {
        game,
        observed,
        equity_margin: config.infer_equity_margin,
        max_candidates: config.infer_max_candidates,
    };
    let results = infer(&input)?;
    println!("candidates considered: {}", results.candidates_considered);
    println!("total weight: {:.3}", results.total_weight());
    for ml in 0..results.alphabet_size() as u8 {
        let p = results.marginal_probability(ml);
        if p > 0.0 {
            println!("{}: P(present)={:.3} E[count]={:.3}", game.ld.ml_to_string(ml), p, results.expected_count(ml));
        }
    }
    Ok(())
}

/// Only the English distribution ships with this crate; loading a named
/// distribution from disk is outside its scope.
fn letter_distribution_for(name: &str) -> LetterDistribution {
    if name.to_lowercase() != "english" {
        log::warn!("letter distribution '{name}' is not built in, falling back to english");
    }
    LetterDistribution::english()
}

/// Builds a tiny synthetic KWG from a handful of common short words so the
/// console binary runs out of the box without a real lexicon file; real
/// KWG construction from a `.kwg`/wordlist file is outside this crate's
/// scope.
fn synthetic_kwg() -> Kwg {
    let ld = LetterDistribution::english();
    let mut builder = KwgBuilder::new();
    for w in [
        "AA", "AT", "TA", "AN", "AND", "ANT", "ANTS", "CAT", "CATS", "CAB", "CABS", "DOG", "DOGS", "DO", "GO", "GOD",
        "EAT", "EATS", "TEA", "TEAS", "SEA", "SEAT", "EASE", "RATE", "RATES", "STARE", "TEARS", "RESTART",
    ] {
        builder.add_word(&ld.parse_str(w, false).unwrap());
    }
    builder.build()
}
