//! GKP binning and bit error probabilities.
//!
//! Outcomes are displacements from the ideal position of the zero bit.
//! Binning rounds an outcome to the nearest multiple of sqrt(pi); odd
//! multiples read as a flipped bit.

use libm::erfc;

/// sqrt(pi), the GKP lattice spacing.
pub const SQRT_PI: f64 = 1.772_453_850_905_516;

/// Error probability assigned to a p-squeezed (swapped-out) state.
pub const SWAPPED_ERROR_PROBABILITY: f64 = 0.5;

/// Probabilities below this are clamped so weights stay finite.
const MIN_PROBABILITY: f64 = 1e-300;

/// Above this deviation the odd and even bins carry equal mass to f64
/// precision.
const FLAT_STD: f64 = 10.0 * SQRT_PI;

/// Reads a homodyne outcome as a bit.
pub fn bin_outcome(outcome: f64) -> bool {
    let n = (outcome / SQRT_PI).round() as i64;
    n.rem_euclid(2) == 1
}

/// Standard deviation of the Gaussian shift for noise width `delta`.
pub fn noise_std(delta: f64) -> f64 {
    (delta / 2.0).sqrt()
}

/// Probability that a Gaussian shift of deviation `sigma` lands in an odd
/// bin.
///
/// Sums `P(|x| in [(n - 1/2) sqrt(pi), (n + 1/2) sqrt(pi)])` over odd `n`.
pub fn bit_error_probability_for_std(sigma: f64) -> f64 {
    if sigma.is_nan() || sigma <= 0.0 {
        return MIN_PROBABILITY;
    }
    if sigma > FLAT_STD {
        return SWAPPED_ERROR_PROBABILITY;
    }
    let scale = sigma * core::f64::consts::SQRT_2;
    let mut p = 0.0;
    let mut n = 1.0;
    loop {
        let lo = erfc((n - 0.5) * SQRT_PI / scale);
        if lo == 0.0 {
            break;
        }
        let hi = erfc((n + 0.5) * SQRT_PI / scale);
        p += lo - hi;
        n += 2.0;
    }
    p.clamp(MIN_PROBABILITY, SWAPPED_ERROR_PROBABILITY)
}

/// Bit error probability of a GKP state with noise width `delta`.
pub fn bit_error_probability(delta: f64) -> f64 {
    bit_error_probability_for_std(noise_std(delta))
}

/// Blueprint edge weight `multiplier * ln((1 - p) / p)`, rounded when
/// `integer` is set. Never negative.
pub fn blueprint_weight(p: f64, multiplier: u32, integer: bool) -> f64 {
    let p = p.clamp(MIN_PROBABILITY, SWAPPED_ERROR_PROBABILITY);
    let w = f64::from(multiplier) * ((1.0 - p) / p).ln();
    let w = if integer { w.round() } else { w };
    w.max(0.0)
}
