use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Easing curve applied to the turn-position term of the success probability.
///
/// Every variant maps a normalized progress value in [0,1] to a biased value
/// in [0,1]. Unrecognized names fall back to `Linear` — that fallback is the
/// documented default for free-form input, not an error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineIn,
    SineOut,
    SineInOut,
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Linear
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Easing::Linear => write!(f, "linear"),
            Easing::QuadIn => write!(f, "quad-in"),
            Easing::QuadOut => write!(f, "quad-out"),
            Easing::QuadInOut => write!(f, "quad-in-out"),
            Easing::CubicIn => write!(f, "cubic-in"),
            Easing::CubicOut => write!(f, "cubic-out"),
            Easing::CubicInOut => write!(f, "cubic-in-out"),
            Easing::SineIn => write!(f, "sine-in"),
            Easing::SineOut => write!(f, "sine-out"),
            Easing::SineInOut => write!(f, "sine-in-out"),
        }
    }
}

impl Easing {
    /// Parse a normalized easing name. Separators (`-`, `_`, spaces) are
    /// ignored, so "quad-in", "quad_in" and "quadin" all resolve.
    /// Returns `None` for anything unrecognized.
    pub fn parse(name: &str) -> Option<Easing> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "linear" => Some(Easing::Linear),
            "quadin" => Some(Easing::QuadIn),
            "quadout" => Some(Easing::QuadOut),
            "quadinout" => Some(Easing::QuadInOut),
            "cubicin" => Some(Easing::CubicIn),
            "cubicout" => Some(Easing::CubicOut),
            "cubicinout" => Some(Easing::CubicInOut),
            "sinein" => Some(Easing::SineIn),
            "sineout" => Some(Easing::SineOut),
            "sineinout" => Some(Easing::SineInOut),
            _ => None,
        }
    }

    /// Parse with the linear fallback for unrecognized names.
    pub fn from_name(name: &str) -> Easing {
        Easing::parse(name).unwrap_or(Easing::Linear)
    }

    /// Evaluate the curve at `t`. Input is clamped to [0,1].
    pub fn ease(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => 0.5 * (1.0 - (t * PI).cos()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Easing] = &[
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for easing in ALL {
            assert!((easing.ease(0.0)).abs() < 1e-9, "{easing} at 0");
            assert!((easing.ease(1.0) - 1.0).abs() < 1e-9, "{easing} at 1");
        }
    }

    #[test]
    fn output_stays_in_unit_interval() {
        for easing in ALL {
            for i in 0..=100 {
                let t = i as f64 / 100.0;
                let v = easing.ease(t);
                assert!((0.0..=1.0).contains(&v), "{easing} at {t} gave {v}");
            }
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::Linear.ease(-0.5), 0.0);
        assert_eq!(Easing::Linear.ease(1.5), 1.0);
    }

    #[test]
    fn quad_in_out_midpoint() {
        assert!((Easing::QuadInOut.ease(0.5) - 0.5).abs() < 1e-9);
        assert!((Easing::CubicInOut.ease(0.5) - 0.5).abs() < 1e-9);
        assert!((Easing::SineInOut.ease(0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn parse_accepts_separator_variants() {
        assert_eq!(Easing::parse("quad-in"), Some(Easing::QuadIn));
        assert_eq!(Easing::parse("quad_in"), Some(Easing::QuadIn));
        assert_eq!(Easing::parse("QuadIn"), Some(Easing::QuadIn));
        assert_eq!(Easing::parse("sineinout"), Some(Easing::SineInOut));
    }

    #[test]
    fn unknown_name_falls_back_to_linear() {
        assert_eq!(Easing::parse("bounce"), None);
        assert_eq!(Easing::from_name("bounce"), Easing::Linear);
        assert_eq!(Easing::from_name(""), Easing::Linear);
    }

    #[test]
    fn round_trips_through_display() {
        for easing in ALL {
            assert_eq!(Easing::parse(&easing.to_string()), Some(*easing));
        }
    }
}
