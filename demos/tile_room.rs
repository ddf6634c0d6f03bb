//! Drops a player into a small tile room with a coin and prints where it settles.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tile_collision::*;

const TILE: f32 = 16.0;

/// Pickup that counts how many ticks something stood on it.
struct Coin {
    bounds: Rect,
    touched: Arc<AtomicUsize>,
}

impl Collidable for Coin {
    fn boundary(&self) -> Rect {
        self.bounds
    }

    fn translate(&mut self, offset: Vec2) {
        self.bounds = self.bounds.translated(offset);
    }

    fn is_static(&self) -> bool {
        true
    }

    fn is_solid(&self) -> bool {
        false
    }

    fn is_trigger(&self) -> bool {
        true
    }

    fn trigger(&mut self, _other: &mut dyn Collidable) {
        self.touched.fetch_add(1, Ordering::Relaxed);
    }
}

fn main() -> Result<(), CollisionError> {
    let level = [
        "##########",
        "#........#",
        "#........#",
        "#....c...#",
        "##########",
    ];

    let mut engine = CollisionEngine::builder().report_ticks(true).build();
    engine.initialize();

    let touched = Arc::new(AtomicUsize::new(0));
    for (row, line) in level.iter().enumerate() {
        for (column, cell) in line.chars().enumerate() {
            let bounds = Rect::new(column as f32 * TILE, row as f32 * TILE, TILE, TILE);
            match cell {
                // level geometry is built before the player exists, so queue it
                '#' => engine.delay_add(share(StaticTile::solid(bounds))),
                'c' => engine.delay_add(share(Coin {
                    bounds,
                    touched: touched.clone(),
                })),
                _ => {}
            }
        }
    }
    println!("registered {} tiles", engine.flush());

    let player = share(
        KineticBody::new(Rect::new(5.0 * TILE + 2.0, TILE, 12.0, 14.0))
            .with_velocity(Vec2::new(0.0, 90.0)),
    );
    engine.add(player.clone())?;

    for _ in 0..60 {
        player.lock().integrate(16);
        engine.update(16);
    }

    let bounds = player.lock().bounds;
    println!(
        "player settled at ({:.2}, {:.2}); coin touched on {} ticks",
        bounds.left(),
        bounds.top(),
        touched.load(Ordering::Relaxed)
    );

    engine.dispose();
    Ok(())
}
