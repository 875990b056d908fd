#![forbid(unsafe_code)]

//! Random variable values within the editing ranges.
//!
//! Every literal variable has a stepped range picked from its name: names
//! containing `IS` are flags, names containing `CNT` are counts, everything
//! else is a length.

use std::collections::BTreeMap;

use rand::Rng;
use zonage_expr::{VariableMap, is_expression, recompute_variables};

/// A closed, stepped range of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ValueRange {
    /// `0` or `1`.
    pub const FLAG: ValueRange = ValueRange::new(0.0, 1.0, 1.0);
    /// Whole counts from 1 to 20.
    pub const COUNT: ValueRange = ValueRange::new(1.0, 20.0, 1.0);
    /// Lengths from 100 to 5000 in steps of 10.
    pub const LENGTH: ValueRange = ValueRange::new(100.0, 5000.0, 10.0);
    /// Overall document dimensions.
    pub const DIMENSION: ValueRange = ValueRange::new(1000.0, 10_000.0, 100.0);

    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Range used for variable `name`.
    pub fn for_variable(name: &str) -> Self {
        if name.contains("IS") {
            Self::FLAG
        } else if name.contains("CNT") {
            Self::COUNT
        } else {
            Self::LENGTH
        }
    }

    /// Number of steps between `min` and `max`.
    fn steps(&self) -> u32 {
        if self.step <= 0.0 || self.max <= self.min {
            return 0;
        }
        ((self.max - self.min) / self.step).floor() as u32
    }

    /// Uniformly drawn step value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let k = rng.random_range(0..=self.steps());
        self.min + f64::from(k) * self.step
    }

    /// `value` limited to the range and snapped to the nearest step.
    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.min;
        }
        let k = ((value - self.min) / self.step).round().clamp(0.0, f64::from(self.steps()));
        self.min + k * self.step
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Redraw every literal variable, then recompute the expressions.
///
/// Names present in `current` but not defined in `raw` keep their value.
pub fn randomize_variables<R: Rng + ?Sized>(
    raw: &BTreeMap<String, String>,
    current: &VariableMap,
    rng: &mut R,
) -> VariableMap {
    let mut values = current.clone();
    for (name, text) in raw {
        if !is_expression(text) {
            values.insert(name.clone(), ValueRange::for_variable(name).sample(rng));
        }
    }
    tracing::debug!(count = raw.len(), "randomized variables");
    recompute_variables(raw, &values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn ranges_follow_names() {
        assert_eq!(ValueRange::for_variable("ZR_IS_OPEN"), ValueRange::FLAG);
        assert_eq!(ValueRange::for_variable("ZR_CNT"), ValueRange::COUNT);
        assert_eq!(ValueRange::for_variable("ZB_W"), ValueRange::LENGTH);
    }

    #[test]
    fn samples_land_on_steps() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let v = ValueRange::LENGTH.sample(&mut rng);
            assert!(ValueRange::LENGTH.contains(v));
            assert_eq!((v - 100.0) % 10.0, 0.0);

            let flag = ValueRange::FLAG.sample(&mut rng);
            assert!(flag == 0.0 || flag == 1.0);
        }
    }

    #[test]
    fn clamp_snaps() {
        assert_eq!(ValueRange::LENGTH.clamp(123.0), 120.0);
        assert_eq!(ValueRange::LENGTH.clamp(9_999.0), 5000.0);
        assert_eq!(ValueRange::COUNT.clamp(-3.0), 1.0);
        assert_eq!(ValueRange::DIMENSION.clamp(f64::NAN), 1000.0);
    }

    #[test]
    fn expressions_follow_new_literals() {
        let raw = raw(&[("W", "1000"), ("CNT", "2"), ("PART", "$W / $CNT")]);
        let current = zonage_expr::resolve_variables(&raw);
        let mut rng = StdRng::seed_from_u64(42);
        let next = randomize_variables(&raw, &current, &mut rng);
        assert!(ValueRange::LENGTH.contains(next["W"]));
        assert!(ValueRange::COUNT.contains(next["CNT"]));
        assert!((next["PART"] - next["W"] / next["CNT"]).abs() < 1e-9);
    }
}
