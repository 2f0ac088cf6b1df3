//! Population growth - one Bernoulli trial per eligible settlement per pass

use rand::Rng;

const MIN_HAPPINESS: f32 = 60.0;
const FOOD_PER_CAPITA_RESERVE: f32 = 10.0;

/// Whether a settlement may gain a villager this pass.
///
/// `population` is the civilization-wide count; `residents` and `capacity`
/// are the settlement's own.
pub fn can_grow(residents: usize, capacity: u32, happiness: f32, food: f32, population: u32) -> bool {
    residents < capacity as usize
        && happiness > MIN_HAPPINESS
        && food > FOOD_PER_CAPITA_RESERVE * population as f32
}

/// Draw the growth trial
pub fn roll_growth(rng: &mut impl Rng, chance: f64) -> bool {
    rng.gen_bool(chance.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_capacity_gate() {
        assert!(can_grow(4, 5, 80.0, 100.0, 4));
        assert!(!can_grow(5, 5, 80.0, 100.0, 5));
    }

    #[test]
    fn test_happiness_gate_is_strict() {
        assert!(!can_grow(1, 5, 60.0, 100.0, 1));
        assert!(can_grow(1, 5, 60.5, 100.0, 1));
    }

    #[test]
    fn test_food_gate_uses_global_population() {
        assert!(!can_grow(1, 5, 80.0, 50.0, 5));
        assert!(can_grow(1, 5, 80.0, 51.0, 5));
    }

    #[test]
    fn test_roll_rate_is_roughly_ten_percent() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let hits = (0..10_000).filter(|_| roll_growth(&mut rng, 0.1)).count();
        assert!((800..1200).contains(&hits), "hits = {}", hits);
    }
}
