//! Batch logging with the zero-copy `Arena::reserve()` path.
//!
//! Log entries are formatted directly into reserved arena slots. The batch becomes visible to
//! readers only once the reservation is completed.

use atomic_arena::Arena;

#[derive(Debug)]
struct LogEntry {
    level: &'static str,
    message: String,
}

const BATCH_SIZE: usize = 8;

fn main() {
    let mut arena = Arena::<LogEntry>::new(BATCH_SIZE).unwrap();

    let messages = [("INFO", "Start work"), ("WARN", "Low memory")];

    let mut reservation = arena.reserve(messages.len()).unwrap();
    println!(
        "Reserved slots {}..{}",
        reservation.start(),
        reservation.start() + reservation.len()
    );

    for (offset, (level, message)) in messages.into_iter().enumerate() {
        reservation.write(
            offset,
            LogEntry {
                level,
                message: message.to_string(),
            },
        );
    }

    // Nothing is visible until the reservation is completed.
    assert!(arena.peek(0).is_none());

    // SAFETY: Every reserved slot was written above.
    let entries = unsafe { reservation.assume_init() };

    println!("-- Log batch --");

    for entry in entries {
        println!("[{}] {}", entry.level, entry.message);
    }

    // The rest of the arena is filled from a closure.
    let remaining = arena.remaining();
    let progress = arena.reserve(remaining).unwrap().fill_with(|i| LogEntry {
        level: "DEBUG",
        message: format!("step {i} done"),
    });

    println!("Appended {} progress entries", progress.len());

    match arena.reserve(1) {
        Ok(_) => unreachable!("the arena is full"),
        Err(error) => println!("Next batch must wait: {error}"),
    }

    arena.reset();
    println!("Log arena reset.");
}
