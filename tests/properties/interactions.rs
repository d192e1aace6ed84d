use leakage_sim::interactions::{bitflip, hamming_weight, popcount_pairs, weighted_term};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

const SAMPLES: usize = 20_000;

fn choose_2(n: u32) -> u32 {
    n * n.saturating_sub(1) / 2
}

#[test]
fn popcount_pairs_is_binomial_of_weight() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    for _ in 0..SAMPLES {
        let v: u32 = rng.random();
        assert_eq!(popcount_pairs(v), choose_2(v.count_ones()), "v = {:#010x}", v);
    }
}

#[test]
fn bitflip_is_symmetric_and_marks_differences() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    for _ in 0..SAMPLES {
        let a: u32 = rng.random();
        let b: u32 = rng.random();
        assert_eq!(bitflip(a, b), bitflip(b, a));
        assert_eq!(bitflip(a, a), 0);
        assert_eq!(bitflip(a, !a), u32::MAX);
        // Hamming distance is the weight of the flip vector.
        let distance = (0..32).filter(|i| (a >> i) & 1 != (b >> i) & 1).count() as u32;
        assert_eq!(hamming_weight(bitflip(a, b)), distance);
    }
}

#[test]
fn weighted_term_is_linear_in_feature() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1234);
    for _ in 0..1_000 {
        let coefficients: Vec<f64> = (0..32).map(|_| rng.random::<f64>() - 0.5).collect();
        let x = rng.random_range(0.0..500.0);
        let y = rng.random_range(0.0..500.0);
        let lhs = weighted_term(&coefficients, x + y);
        let rhs = weighted_term(&coefficients, x) + weighted_term(&coefficients, y);
        assert!((lhs - rhs).abs() < 1e-9 * (1.0 + lhs.abs()));

        let sum: f64 = coefficients.iter().sum();
        assert!((weighted_term(&coefficients, 1.0) - sum).abs() < 1e-12);
    }
}
