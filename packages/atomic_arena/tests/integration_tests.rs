//! Integration tests for `atomic_arena`, exercising the public API the way an application would.

use atomic_arena::{Arena, ArenaState, Error, LockedArena, ResetPolicy, RingArena};

#[test]
fn fill_overflow_reset_refill() {
    let mut arena = Arena::<i32>::new(5).unwrap();

    for value in [0, 10, 20, 30, 40] {
        arena.alloc(value).unwrap();
    }

    for (index, expected) in [0, 10, 20, 30, 40].iter().enumerate() {
        assert_eq!(arena.peek(index), Some(expected));
    }

    let rejected = arena.alloc(50).unwrap_err();
    assert!(rejected.error().is_arena_full());
    assert_eq!(rejected.into_inner(), 50);
    assert_eq!(arena.len(), 5);

    arena.reset();

    assert_eq!(*arena.alloc(99).unwrap(), 99);
    assert_eq!(arena.peek(0), Some(&99));
    assert!(arena.peek(1).is_none());
}

#[test]
fn bulk_reservation_is_all_or_nothing() {
    let arena = Arena::<i32>::new(3).unwrap();

    let first = arena.append_many([1, 2]).unwrap();
    assert_eq!(first, &[1, 2]);
    assert_eq!(arena.peek(0), Some(&1));
    assert_eq!(arena.peek(1), Some(&2));

    let rejected = arena.append_many([3, 4]).unwrap_err();
    assert!(matches!(
        rejected.error(),
        Error::ArenaFull {
            requested: 2,
            available: 1,
            capacity: 3,
        }
    ));
    assert_eq!(arena.len(), 2);

    let second = arena.append_many([3]).unwrap();
    assert_eq!(second, &[3]);
    assert_eq!(arena.peek(2), Some(&3));

    assert!(arena.append_many([4]).is_err());
    assert_eq!(arena.state(), ArenaState::Full);
}

#[test]
fn zero_copy_reserve_follows_same_rules() {
    let arena = Arena::<i32>::new(3).unwrap();

    let first = arena.reserve(2).unwrap().clone_from_slice(&[1, 2]);
    assert_eq!(first, &[1, 2]);

    let error = arena.reserve(2).unwrap_err();
    assert!(error.is_arena_full());
    assert_eq!(arena.remaining(), 1);

    let mut last = arena.reserve(1).unwrap();
    assert_eq!(last.start(), 2);
    last.write(0, 3);
    // SAFETY: The only slot was written above.
    let last = unsafe { last.assume_init() };
    assert_eq!(last, &[3]);

    assert!(arena.reserve(1).is_err());
}

#[test]
fn exactly_capacity_allocations_succeed() {
    const CAPACITY: usize = 37;

    let arena = Arena::<usize>::new(CAPACITY).unwrap();

    let successes = (0..CAPACITY * 2)
        .filter(|&value| arena.alloc(value).is_ok())
        .count();

    assert_eq!(successes, CAPACITY);
    assert!(arena.iter().copied().eq(0..CAPACITY));
}

#[test]
fn reset_clears_everything_below_high_water_mark() {
    let mut arena = Arena::<String>::new(4).unwrap();

    for round in 0..3 {
        for index in 0..4 {
            let value = format!("round {round} value {index}");
            assert_eq!(*arena.alloc(value.clone()).unwrap(), value);
        }

        assert!(arena.is_full());

        arena.reset();

        for index in 0..4 {
            assert!(arena.peek(index).is_none());
        }
    }
}

#[test]
fn overflow_falls_back_to_heap() {
    #[derive(Debug, PartialEq)]
    struct Particle {
        position: [f32; 3],
        velocity: [f32; 3],
    }

    let arena = Arena::<Particle>::new(8).unwrap();
    let mut overflow = Vec::new();

    for i in 0..10_u8 {
        let particle = Particle {
            position: [f32::from(i); 3],
            velocity: [1.0; 3],
        };

        if let Err(rejected) = arena.alloc(particle) {
            overflow.push(Box::new(rejected.into_inner()));
        }
    }

    assert_eq!(arena.len(), 8);
    assert_eq!(overflow.len(), 2);
    assert_eq!(overflow[0].position, [8.0; 3]);
    assert!(arena.iter().all(|particle| particle.velocity == [1.0; 3]));
}

#[test]
fn reset_policies_are_honored_through_builder() {
    for policy in [
        ResetPolicy::DropValues,
        ResetPolicy::ScrubValues,
        ResetPolicy::ForgetValues,
    ] {
        let mut arena = Arena::<Vec<u8>>::builder()
            .capacity(2)
            .reset_policy(policy)
            .build()
            .unwrap();

        arena.alloc(vec![1, 2, 3]).unwrap();
        arena.reset();

        assert_eq!(arena.reset_policy(), policy);
        assert!(arena.is_empty());
        assert_eq!(*arena.alloc(vec![4]).unwrap(), vec![4]);
    }
}

#[test]
fn byte_budget_sizing() {
    let arena = Arena::<[u8; 100]>::with_byte_budget(1000).unwrap();
    assert_eq!(arena.capacity(), 10);

    let error = Arena::<[u8; 100]>::with_byte_budget(99).unwrap_err();
    assert!(matches!(error, Error::InvalidCapacity { .. }));
}

#[test]
fn locked_and_ring_variants_are_selected_explicitly() {
    let locked = LockedArena::<u32>::new(1).unwrap();
    drop(locked.alloc(1).unwrap());
    assert!(locked.alloc(2).is_err());
    locked.reset();
    assert!(locked.alloc(3).is_ok());

    let ring = RingArena::<u32>::new(1).unwrap();
    ring.alloc(1);
    ring.alloc(2);
    assert_eq!(ring.peek(0).as_deref(), Some(&2));
}
