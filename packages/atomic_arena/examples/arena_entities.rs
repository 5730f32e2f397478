//! Entity pooling with `Arena`.
//!
//! This example spawns entities into a small arena, falls back to the heap once the arena is full
//! and resets the arena at the end of the frame so the slots can be reused.

use atomic_arena::Arena;

#[derive(Debug)]
struct Entity {
    x: f64,
    y: f64,
}

const MAX_ENTITIES: usize = 3;

fn main() {
    let mut arena = Arena::<Entity>::new(MAX_ENTITIES).unwrap();
    let mut overflow = Vec::new();

    println!("-- Spawning entities --");

    for i in 0..5_u32 {
        let entity = Entity {
            x: f64::from(i),
            y: f64::from(i) * 2.0,
        };

        match arena.alloc(entity) {
            Ok(entity) => println!("Entity {i} in arena at ({:.0}, {:.0})", entity.x, entity.y),
            Err(rejected) => {
                println!("Entity {i} overflowed: {}", rejected.error());

                // The arena hands the entity back, so nothing is lost.
                overflow.push(Box::new(rejected.into_inner()));
            }
        }
    }

    println!(
        "{} entities in arena ({:?}), {} on the heap",
        arena.len(),
        arena.state(),
        overflow.len()
    );

    for entity in &overflow {
        println!("Heap entity: {entity:?}");
    }

    // End of frame.
    arena.reset();

    println!("Entity arena reset, next alloc() starts from slot 0 again.");

    let entity = arena.alloc(Entity { x: 9.0, y: 9.0 }).unwrap();
    println!("Reused slot 0 for {entity:?}");
    assert_eq!(arena.len(), 1);
}
