//! Shared utility functions for dyke crest crates.

/// Radial ray geometry for the narrow-water fetch construction.
///
/// Thirteen rays are drawn from the site, from -45° to +45° around the main
/// wind direction in steps of 7.5°.
pub mod rays {
    use anyhow::Context;

    /// Number of rays in a complete fan
    pub const RAY_COUNT: usize = 13;

    /// Angle of the first ray, degrees
    pub const FIRST_ANGLE_DEG: f64 = -45.0;

    /// Angular spacing between rays, degrees
    pub const ANGLE_STEP_DEG: f64 = 7.5;

    /// Ray angles in degrees, first to last.
    pub fn ray_angles() -> [f64; RAY_COUNT] {
        std::array::from_fn(|i| FIRST_ANGLE_DEG + ANGLE_STEP_DEG * i as f64)
    }

    /// cos(αᵢ) for every ray angle.
    pub fn ray_cosines() -> [f64; RAY_COUNT] {
        ray_angles().map(|angle| angle.to_radians().cos())
    }

    /// Parse a `;`-separated list of ray lengths, e.g. `"2000;2100;1950"`.
    ///
    /// Blank tokens are skipped so a trailing separator is tolerated. The
    /// number of values is not checked here; callers decide what a short fan
    /// means.
    pub fn parse_ray_list(s: &str) -> anyhow::Result<Vec<f64>> {
        s.split(';')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .with_context(|| format!("invalid ray length '{}'", token))
            })
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_ray_angles() {
            let angles = ray_angles();
            assert_eq!(angles[0], -45.0);
            assert_eq!(angles[6], 0.0);
            assert_eq!(angles[12], 45.0);
        }

        #[test]
        fn test_ray_cosines_symmetric() {
            let cosines = ray_cosines();
            for i in 0..RAY_COUNT {
                assert!((cosines[i] - cosines[RAY_COUNT - 1 - i]).abs() < 1e-12);
            }
            assert!((cosines[6] - 1.0).abs() < 1e-12);
        }

        #[test]
        fn test_parse_ray_list() {
            let rays = parse_ray_list("2000; 2100;1950;").unwrap();
            assert_eq!(rays, vec![2000.0, 2100.0, 1950.0]);
            assert!(parse_ray_list("2000;abc").is_err());
            assert!(parse_ray_list("").unwrap().is_empty());
        }
    }
}

/// Cell helpers for the CSV site tables
pub mod cells {
    use anyhow::Context;

    /// Parse an optional numeric cell.
    ///
    /// Empty cells and the usual spreadsheet placeholders ("null", "n/a",
    /// "na", "nan", "-") are read as a missing value.
    pub fn parse_number(s: &str) -> anyhow::Result<Option<f64>> {
        let lowered = s.trim().to_lowercase();
        match lowered.as_str() {
            "" | "null" | "n/a" | "na" | "nan" | "-" => Ok(None),
            other => other
                .parse::<f64>()
                .map(Some)
                .with_context(|| format!("invalid number '{}'", s.trim())),
        }
    }

    /// Format an optional value; missing and non-finite values become an empty cell.
    pub fn format_number(value: Option<f64>, decimals: usize) -> String {
        match value {
            Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
            _ => String::new(),
        }
    }

    /// Normalise a text key for table lookups: trimmed, single-spaced, upper case.
    pub fn normalize_key(s: &str) -> String {
        s.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    }

}
