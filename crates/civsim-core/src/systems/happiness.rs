//! Happiness - periodic target computation blended into the running value

/// Weight kept from the previous value on each pass
pub const SMOOTHING: f32 = 0.9;
/// Weight given to the freshly computed target
pub const TARGET_WEIGHT: f32 = 0.1;

const BASE_HAPPINESS: f32 = 50.0;
const WELL_FED_RATIO: f32 = 20.0;
const HUNGRY_RATIO: f32 = 5.0;
const WELL_FED_BONUS: f32 = 10.0;
const HUNGRY_PENALTY: f32 = 20.0;
const HOUSED_BONUS: f32 = 10.0;
const CROWDED_PENALTY: f32 = 15.0;

/// Aggregate state the happiness target is computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HappinessInputs {
    pub food: f32,
    pub population: u32,
    pub housing_capacity: u32,
    /// Sum of every finished building's happiness effect
    pub building_effects: f32,
}

/// Unsmoothed happiness the civilization is drifting toward
pub fn target_happiness(inputs: &HappinessInputs) -> f32 {
    let population = inputs.population as f32;
    let mut target = BASE_HAPPINESS;

    if inputs.food > WELL_FED_RATIO * population {
        target += WELL_FED_BONUS;
    }
    if inputs.food < HUNGRY_RATIO * population {
        target -= HUNGRY_PENALTY;
    }

    if inputs.housing_capacity >= inputs.population {
        target += HOUSED_BONUS;
    } else {
        target -= CROWDED_PENALTY;
    }

    target + inputs.building_effects
}

/// Exponential smoothing toward `target`, clamped to [0, 100]
pub fn blend(current: f32, target: f32) -> f32 {
    (current * SMOOTHING + target * TARGET_WEIGHT).clamp(0.0, 100.0)
}

/// Starvation penalty applied by the production pass, floored at zero
pub fn apply_starvation(current: f32, penalty: f32) -> f32 {
    (current - penalty).max(0.0)
}
