//! Statistical support functions for the compliance tests.
//!
//! The chi-squared CDF is evaluated through the regularized lower
//! incomplete gamma function P(k/2, x/2). The implementation uses the
//! standard pair of expansions: a power series for x < a + 1 and a
//! Lentz-style continued fraction otherwise, with a Lanczos
//! approximation for ln Γ.

/// Benford's Law expected percentages for leading digits 1–9:
/// P(d) = log10(1 + 1/d) × 100, rounded to one decimal.
pub const BENFORD_PERCENTAGES: [f64; 9] = [30.1, 17.6, 12.5, 9.7, 7.9, 6.7, 5.8, 5.1, 4.6];

/// Returns the Benford expected percentage for digit `d` in 1–9.
///
/// Returns 0.0 for digits outside that range.
pub fn benford_percentage(digit: u8) -> f64 {
    if (1..=9).contains(&digit) {
        BENFORD_PERCENTAGES[digit as usize - 1]
    } else {
        0.0
    }
}

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE_EPS: f64 = 1e-14;
const TINY: f64 = 1e-300;

/// Natural log of the gamma function (Lanczos approximation, g = 7).
///
/// Valid for x > 0, which is the only regime the chi-squared CDF needs.
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    let x = x - 1.0;
    let mut sum = COEFFS[0];
    for (i, c) in COEFFS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Series expansion of P(a, x), convergent for x < a + 1.
fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut term = 1.0 / a;
    let mut sum = term;
    let mut denom = a;
    for _ in 0..MAX_ITERATIONS {
        denom += 1.0;
        term *= x / denom;
        sum += term;
        if term.abs() < sum.abs() * CONVERGENCE_EPS {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Continued-fraction expansion of Q(a, x) = 1 − P(a, x), convergent
/// for x >= a + 1 (modified Lentz method).
fn gamma_q_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITERATIONS {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < CONVERGENCE_EPS {
            break;
        }
    }
    h * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Regularized lower incomplete gamma function P(a, x) for a > 0, x >= 0.
///
/// Out-of-domain inputs clamp to the nearest defined value (0.0), which
/// cannot occur from the chi-squared path but keeps the function total.
pub fn gamma_p(a: f64, x: f64) -> f64 {
    if a <= 0.0 || x < 0.0 || !a.is_finite() || !x.is_finite() {
        return 0.0;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x < a + 1.0 {
        gamma_p_series(a, x)
    } else {
        1.0 - gamma_q_continued_fraction(a, x)
    }
}

/// CDF of the chi-squared distribution with `dof` degrees of freedom,
/// evaluated at `x`: P(dof/2, x/2).
pub fn chi_squared_cdf(x: f64, dof: u32) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    gamma_p(dof as f64 / 2.0, x / 2.0)
}

/// Upper-tail p-value for a chi-squared statistic with `dof` degrees of
/// freedom: 1 − CDF(x; dof), clamped to [0, 1].
pub fn chi_squared_p_value(x: f64, dof: u32) -> f64 {
    (1.0 - chi_squared_cdf(x, dof)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benford_percentages_sum_to_100() {
        let sum: f64 = BENFORD_PERCENTAGES.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_benford_percentage_lookup() {
        assert_eq!(benford_percentage(1), 30.1);
        assert_eq!(benford_percentage(9), 4.6);
        assert_eq!(benford_percentage(0), 0.0);
        assert_eq!(benford_percentage(10), 0.0);
    }

    #[test]
    fn test_ln_gamma_known_values() {
        // Γ(4) = 6, Γ(0.5) = sqrt(pi)
        assert!((ln_gamma(4.0) - 6.0f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-10);
    }

    #[test]
    fn test_gamma_p_boundaries() {
        assert_eq!(gamma_p(4.0, 0.0), 0.0);
        assert!(gamma_p(4.0, 1000.0) > 0.999_999);
    }

    #[test]
    fn test_chi_squared_cdf_at_zero() {
        assert_eq!(chi_squared_cdf(0.0, 8), 0.0);
        assert_eq!(chi_squared_p_value(0.0, 8), 1.0);
    }

    #[test]
    fn test_chi_squared_critical_value_df8() {
        // Standard table: the 0.05 upper critical value for 8 degrees of
        // freedom is 15.507.
        let p = chi_squared_p_value(15.507, 8);
        assert!((p - 0.05).abs() < 1e-3, "p = {p}");
    }

    #[test]
    fn test_chi_squared_cdf_df8_closed_form() {
        // For even dof the CDF has the closed form
        // 1 - exp(-x/2) * sum_{n=0}^{dof/2-1} (x/2)^n / n!.
        for &x in &[1.0, 4.0, 8.0, 13.362, 20.09, 40.0] {
            let half = x / 2.0;
            let mut term = 1.0;
            let mut sum = 1.0;
            for n in 1..4 {
                term *= half / n as f64;
                sum += term;
            }
            let expected = 1.0 - (-half).exp() * sum;
            let got = chi_squared_cdf(x, 8);
            assert!((got - expected).abs() < 1e-10, "x = {x}: {got} vs {expected}");
        }
    }

    #[test]
    fn test_chi_squared_cdf_monotonic() {
        let mut prev = 0.0;
        for i in 1..100 {
            let cdf = chi_squared_cdf(i as f64 * 0.5, 8);
            assert!(cdf >= prev);
            prev = cdf;
        }
    }
}
