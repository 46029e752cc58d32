criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        generating_moves_on_an_empty_board,
        generating_moves_through_existing_tiles,
        scoring_a_single_placement,
        simulating_a_small_candidate_set,
}

fn generating_moves_on_an_empty_board(c: &mut criterion::Criterion) {
    let (game, _kwg, _klv) = setup(&["CAT", "CATS", "CAB", "AT", "TA", "AA", "RATE", "STARE"]);
    let player = &game.players[0];
    c.bench_function("generate moves from an opening rack", |b| {
        b.iter(|| {
            let input = GenerationInput {
                board: &game.board,
                ld: &game.ld,
                player,
                bag_size: game.bag.tiles_remaining(),
                opponent_rack_score: 0,
                num_plays: 15,
            };
            generate_moves(&input)
        })
    });
}

fn generating_moves_through_existing_tiles(c: &mut criterion::Criterion) {
    let (mut game, _kwg, _klv) = setup(&["CAT", "CATS", "CAB", "AT", "TA", "AA", "RATE", "STARE"]);
    let tiles = game.ld.parse_str("CAT", false).unwrap();
    game.board.set_letter(7, 7, tiles[0]);
    game.board.set_letter(7, 8, tiles[1]);
    game.board.set_letter(7, 9, tiles[2]);
    game.recompute_all();
    let player = &game.players[0];
    c.bench_function("generate moves through a placed word", |b| {
        b.iter(|| {
            let input = GenerationInput {
                board: &game.board,
                ld: &game.ld,
                player,
                bag_size: game.bag.tiles_remaining(),
                opponent_rack_score: 0,
                num_plays: 15,
            };
            generate_moves(&input)
        })
    });
}

fn scoring_a_single_placement(c: &mut criterion::Criterion) {
    let (game, _kwg, _klv) = setup(&["CAT"]);
    let tiles = game.ld.parse_str("CAT", false).unwrap();
    c.bench_function("score a three-tile horizontal placement", |b| {
        b.iter(|| crossword_engine::movegen::recursive::score_move(&game.board, &game.ld, Direction::Horizontal, 7, 7, &tiles, 0))
    });
}

fn simulating_a_small_candidate_set(c: &mut criterion::Criterion) {
    let (mut game, _kwg, _klv) = setup(&["CAT", "CATS", "CAB", "AT", "TA", "DOG", "AA"]);
    game.players[0].rack = Rack::set_from_string(&game.ld, "CAT").unwrap();
    game.players[1].rack = Rack::set_from_string(&game.ld, "DOG").unwrap();
    let tiles = game.ld.parse_str("CAT", false).unwrap();
    let candidates = vec![
        Move::pass(PASS_MOVE_EQUITY),
        Move::Placement { row: 7, col: 7, dir: Direction::Horizontal, tiles, tiles_played: 3, score: 10, equity: 10.0 },
    ];
    let config = SimConfig { max_iterations: 200, num_threads: 1, seed: 11, ..SimConfig::default() };
    c.bench_function("simulate two candidates for 200 iterations", |b| {
        b.iter(|| simulate(&game, candidates.clone(), &config))
    });
}

fn setup(words: &[&str]) -> (Game, Arc<Kwg>, Arc<Klv>) {
    let ld = Arc::new(LetterDistribution::english());
    let mut builder = KwgBuilder::new();
    for w in words {
        builder.add_word(&ld.parse_str(w, false).unwrap());
    }
    let kwg = Arc::new(builder.build());
    let klv = Arc::new(Klv::synthetic(&ld, 3));
    let p0 = Player::new("p0", ld.size(), kwg.clone(), klv.clone());
    let p1 = Player::new("p1", ld.size(), kwg.clone(), klv.clone());
    let mut game = Game::new(ld, 1, [p0, p1], 0);
    game.players[0].rack = Rack::set_from_string(&game.ld, "CATS").unwrap();
    game.recompute_all();
    (game, kwg, klv)
}

use crossword_engine::board::Direction;
use crossword_engine::game::{Game, Move, Player, PASS_MOVE_EQUITY};
use crossword_engine::lexicon::{Klv, Kwg, KwgBuilder};
use crossword_engine::movegen::{generate_moves, GenerationInput};
use crossword_engine::simulate::{simulate, SimConfig};
use crossword_engine::tiles::{LetterDistribution, Rack};
use std::sync::Arc;
