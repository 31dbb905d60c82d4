//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n values, then
//! EMA[i] = data[i]*k + EMA[i-1]*(1-k).
//! Warmup: the first (n-1) values are undefined.
//!
//! Leading undefined inputs (e.g. a MACD line still warming up) are skipped:
//! the seed is taken over the first n defined values instead.

use super::undefined;

pub fn calculate_ema(data: &[f64], period: usize) -> Vec<f64> {
    let mut values = undefined(data.len());
    if period == 0 {
        return values;
    }

    let Some(start) = data.iter().position(|v| !v.is_nan()) else {
        return values;
    };
    let seed_index = start + period - 1;
    if seed_index >= data.len() {
        return values;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = data[start..=seed_index].iter().sum::<f64>() / period as f64;
    values[seed_index] = ema;

    for i in seed_index + 1..data.len() {
        ema = data[i] * k + ema * (1.0 - k);
        values[i] = ema;
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn ema_empty() {
        assert!(calculate_ema(&[], 10).is_empty());
    }

    #[test]
    fn ema_warmup_and_seed() {
        let data = [2.0, 4.0, 6.0, 8.0, 10.0];
        let e = calculate_ema(&data, 3);
        assert!(e[0].is_nan());
        assert!(e[1].is_nan());
        // seed = SMA(2,4,6) = 4
        assert_relative_eq!(e[2], 4.0);
        // k = 0.5: 8*0.5 + 4*0.5 = 6
        assert_relative_eq!(e[3], 6.0);
        // 10*0.5 + 6*0.5 = 8
        assert_relative_eq!(e[4], 8.0);
    }

    #[test]
    fn ema_period_one_tracks_input() {
        let data = [3.0, 1.0, 4.0, 1.0, 5.0];
        let e = calculate_ema(&data, 1);
        for (a, b) in e.iter().zip(data.iter()) {
            assert_relative_eq!(*a, *b);
        }
    }

    #[test]
    fn ema_constant_series_stays_constant() {
        let data = vec![42.0; 30];
        let e = calculate_ema(&data, 10);
        for v in &e[9..] {
            assert_relative_eq!(*v, 42.0);
        }
    }

    #[test]
    fn ema_skips_leading_undefined() {
        let data = [f64::NAN, f64::NAN, 1.0, 3.0, 5.0];
        let e = calculate_ema(&data, 2);
        assert!(e[2].is_nan());
        assert_relative_eq!(e[3], 2.0);
        // k = 2/3: 5*2/3 + 2/3 = 4
        assert_relative_eq!(e[4], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn ema_all_undefined() {
        let e = calculate_ema(&[f64::NAN; 5], 2);
        assert!(e.iter().all(|v| v.is_nan()));
    }

    proptest! {
        #[test]
        fn ema_is_deterministic(
            data in prop::collection::vec(1.0f64..1_000.0, 0..80),
            period in 1usize..30,
        ) {
            let a = calculate_ema(&data, period);
            let b = calculate_ema(&data, period);
            prop_assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(b.iter()) {
                prop_assert!(x.to_bits() == y.to_bits());
            }
        }
    }
}
