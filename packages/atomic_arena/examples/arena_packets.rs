//! Packet buffering with `Arena::append_many()`.
//!
//! Each batch of packets is placed into the arena as one contiguous range. A batch that does not
//! fit is rejected as a whole and handed back for the caller to deal with.

use atomic_arena::Arena;

#[derive(Debug)]
struct Packet {
    data: Vec<u8>,
}

impl Packet {
    fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

const MAX_PACKETS: usize = 4;

fn main() {
    let mut arena = Arena::<Packet>::new(MAX_PACKETS).unwrap();

    let first = arena
        .append_many([Packet::new(b"foo"), Packet::new(b"barbaz")])
        .unwrap();

    println!("-- Buffered packets --");

    for (i, packet) in first.iter().enumerate() {
        println!("Packet {i} length={}", packet.data.len());
    }

    let batch = vec![
        Packet::new(b"one"),
        Packet::new(b"two"),
        Packet::new(b"three"),
    ];

    match arena.append_many(batch) {
        Ok(packets) => println!("Buffered {} more packets", packets.len()),
        Err(rejected) => {
            println!("Batch rejected: {}", rejected.error());

            let packets: Vec<Packet> = rejected.into_inner().collect();
            println!("Sending {} packets unbuffered instead", packets.len());
        }
    }

    println!("{} of {} slots used", arena.len(), arena.capacity());

    // Flush and reuse.
    arena.reset();

    let second = arena
        .append_many((0..MAX_PACKETS).map(|i| Packet::new(&[u8::try_from(i).unwrap(); 16])))
        .unwrap();

    println!("Packet arena reset, buffered a full batch of {}", second.len());
    assert!(arena.is_full());
}
