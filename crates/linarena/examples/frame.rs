// Per-frame scratch memory.
//
// A long-lived arena holds level data; each frame opens a scope for its
// temporaries, which vanish when the scope ends. Run with
// `LINARENA_LOG=debug` to watch blocks being reserved and reused.

use linarena::{ArenaConfig, Result};

#[derive(Debug, Clone, Copy)]
struct Particle {
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
}

fn main() -> Result<()> {
    if let Err(err) = linarena_log::init_from_env() {
        eprintln!("ignoring {}: {err}", linarena_log::ENV_VAR);
    }

    let mut arena = ArenaConfig::new(4096).with_alignment(16).build()?;

    let level_name = arena.alloc_str("caverns")?;
    let level = arena.position();

    for frame in 0..4usize {
        let mut scratch = arena.scope();

        let count = 64 << frame;
        let particles: Vec<_> = (0..count)
            .map(|i| {
                let t = i as f32;
                scratch.alloc(Particle {
                    x: t,
                    y: -t,
                    dx: 0.5,
                    dy: 0.25,
                })
            })
            .collect::<Result<_>>()?;

        let mut sum = 0.0;
        for particle in &particles {
            // SAFETY: each pointer was just written by `alloc` and the scope
            // is still open.
            let p = unsafe { &mut *particle.as_ptr() };
            p.x += p.dx;
            p.y += p.dy;
            sum += p.x + p.y;
        }

        let stats = scratch.stats();
        println!(
            "frame {frame}: {count} particles, sum {sum}, {} bytes in {} blocks",
            stats.used, stats.block_count
        );
    }

    assert_eq!(arena.position(), level);
    // SAFETY: allocated before `level` and never popped.
    println!("level {} still intact", unsafe { level_name.as_ref() });

    let stats = arena.stats();
    println!(
        "kept {} bytes of capacity for the next level",
        stats.total_capacity
    );

    arena.release();
    Ok(())
}
