use chrono::Utc;
use jackpot_core::{engine, StateDocument};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    // Spin the preset list a hundred times and print how the wins spread.
    let mut doc = StateDocument::default();
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..100 {
        if let Err(e) = engine::spin(&mut doc, None, &mut rng, Utc::now()) {
            eprintln!("spin failed: {e}");
            return;
        }
    }
    for c in &doc.combinations {
        println!("#{:>2} {:<12} hits={}", c.id, c.combo, c.hits);
    }
    println!("spins={} last={:?}", doc.spin_count(), doc.last_combo_id);
}
