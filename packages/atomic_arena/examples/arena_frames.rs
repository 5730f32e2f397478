//! Per-frame reuse of an arena shared by worker threads.
//!
//! Every frame, a set of worker threads fills the arena with particles concurrently. Between
//! frames the main thread regains exclusive access and resets the arena. Run with
//! `RUST_LOG=trace` to see the arena log its construction and resets.

use std::thread;

use atomic_arena::{Arena, ResetPolicy};

#[derive(Debug)]
struct Particle {
    worker: usize,
    position: [f32; 2],
}

const WORKERS: usize = 4;
const PARTICLES_PER_WORKER: usize = 250;
const FRAMES: usize = 3;

fn main() {
    tracing_subscriber::fmt::init();

    let mut arena = Arena::<Particle>::builder()
        .capacity(WORKERS * PARTICLES_PER_WORKER)
        .reset_policy(ResetPolicy::DropValues)
        .build()
        .unwrap();

    for frame in 0..FRAMES {
        thread::scope(|s| {
            for worker in 0..WORKERS {
                let arena = &arena;

                s.spawn(move || {
                    for i in 0..PARTICLES_PER_WORKER {
                        #[expect(
                            clippy::cast_precision_loss,
                            reason = "example values are small"
                        )]
                        let position = [i as f32, frame as f32];

                        arena.alloc(Particle { worker, position }).unwrap();
                    }
                });
            }
        });

        let per_worker = (0..WORKERS)
            .map(|worker| {
                arena
                    .iter()
                    .filter(|particle| particle.worker == worker)
                    .count()
            })
            .collect::<Vec<_>>();

        println!(
            "Frame {frame}: {} particles ({:?}), per worker {per_worker:?}",
            arena.len(),
            arena.state()
        );

        if let Some(last) = arena.peek(arena.len() - 1) {
            println!("Last particle of frame {frame}: {last:?}");
        }

        // All workers have finished, so we have exclusive access again.
        arena.reset();
    }
}
