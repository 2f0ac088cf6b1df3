//! Name generation utilities

use crate::components::Name;
use rand::Rng;

/// Generate a random villager name
pub fn generate_name(rng: &mut impl Rng) -> Name {
    let given = GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())];
    let family = FAMILY_NAMES[rng.gen_range(0..FAMILY_NAMES.len())];

    Name::new(given, family)
}

static GIVEN_NAMES: &[&str] = &[
    "Aldric", "Bran", "Cedric", "Dunstan", "Edric", "Godwin", "Hale", "Ivo", "Jory", "Kenric",
    "Leofric", "Oswin", "Piers", "Rowan", "Tobin", "Wulf",
    "Aelith", "Brynn", "Cwen", "Edith", "Elswyth", "Freya", "Gwen", "Hild", "Isolde", "Maren",
    "Nell", "Odette", "Rhosyn", "Sunniva", "Tamsin", "Wenna",
    "Ash", "Fenn", "Lark", "Moss", "Reed", "Sorrel", "Thorn", "Wren",
];

static FAMILY_NAMES: &[&str] = &[
    // Trades
    "Thatcher", "Mason", "Cooper", "Fletcher", "Tanner", "Miller", "Carter", "Weaver",
    "Potter", "Smith", "Fisher", "Hunter", "Shepherd", "Forester", "Wright", "Sawyer",
    // Places
    "Atwood", "Brook", "Fairfield", "Hill", "Marsh", "Stone", "Underwood", "Westbrook",
    "Ashby", "Dale", "Ford", "Heath", "Lea", "Moor", "Thorpe", "Wells",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generate_name() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let name = generate_name(&mut rng);

        assert!(!name.given.is_empty());
        assert!(!name.family.is_empty());
    }

    #[test]
    fn test_name_variety() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let names: Vec<Name> = (0..100).map(|_| generate_name(&mut rng)).collect();

        let unique_given: std::collections::HashSet<_> = names.iter().map(|n| &n.given).collect();
        let unique_family: std::collections::HashSet<_> = names.iter().map(|n| &n.family).collect();

        assert!(unique_given.len() > 10);
        assert!(unique_family.len() > 10);
    }

    #[test]
    fn test_seeded_names_repeat() {
        let a = generate_name(&mut ChaCha8Rng::seed_from_u64(9));
        let b = generate_name(&mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
