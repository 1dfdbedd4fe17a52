use odyssey_core::AssetId;
use rand::Rng;
use rand_distr::StandardNormal;

/// One standard-normal draw, ziggurat sampled via `rand_distr`
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}

/// Independent standard normals, one per asset
pub fn independent_normals<R: Rng + ?Sized>(rng: &mut R) -> [f64; AssetId::COUNT] {
    std::array::from_fn(|_| standard_normal(rng))
}

/// Uniform draw in `[low, high)`; tolerates `low > high` by drawing between them
pub fn uniform_between<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + rng.r#gen::<f64>() * (high - low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_standard_normal_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();

        let mean = draws.iter().sum::<f64>() / n as f64;
        let variance = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;

        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((variance - 1.0).abs() < 0.05, "variance {variance}");
        assert!(draws.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_uniform_between_reversed_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            let x = uniform_between(&mut rng, -0.5, -0.75);
            assert!((-0.75..=-0.5).contains(&x));
        }
    }
}
