//! Quick board-generation profiler, for running under `perf` or similar where the
//! criterion harness gets in the way.

use std::hint::black_box;
use std::time::Instant;

use sapeur_core::{Board, GameConfig, Xoshiro256StarStar};

fn main() {
    let rounds: u32 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10_000);

    let mut rng = Xoshiro256StarStar::new(0x5EED);

    for (name, config) in [
        ("easy", GameConfig::easy()),
        ("medium", GameConfig::medium()),
        ("hard", GameConfig::hard()),
    ] {
        let safe = (config.size.0 / 2, config.size.1 / 2);

        let started = Instant::now();
        for _ in 0..rounds {
            let mut board = Board::new(config.size);
            board
                .generate(&mut rng, config.mines, safe)
                .expect("preset fits its board");
            board.explore(safe);
            black_box(&board);
        }
        let elapsed = started.elapsed();

        println!(
            "{name}: {rounds} boards in {elapsed:?} ({:.2} us/board)",
            elapsed.as_secs_f64() * 1e6 / f64::from(rounds)
        );
    }
}
