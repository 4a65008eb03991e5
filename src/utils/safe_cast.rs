//! Checked conversions between floating-point pixel coordinates and image indices

/// Clamp and convert f64 to u32 for pixel coordinates
///
/// Non-finite values map to `min`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamping ensures safe truncation
pub fn f64_to_u32_clamp(value: f64, min: u32, max: u32) -> u32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.clamp(f64::from(min), f64::from(max));
    (clamped as u32).clamp(min, max)
}

/// Round a non-negative floating-point coordinate to the nearest pixel index, clamped to `[0, limit)`
///
/// Returns `None` for an empty axis.
#[must_use]
pub fn round_to_pixel(value: f64, limit: u32) -> Option<u32> {
    if limit == 0 {
        return None;
    }
    Some(f64_to_u32_clamp(value.round(), 0, limit - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_f64_to_u32_clamp() {
        assert_eq!(f64_to_u32_clamp(50.0, 0, 100), 50);
        assert_eq!(f64_to_u32_clamp(-10.0, 0, 100), 0);
        assert_eq!(f64_to_u32_clamp(150.0, 0, 100), 100);
        assert_eq!(f64_to_u32_clamp(f64::NAN, 0, 100), 0);
        assert_eq!(f64_to_u32_clamp(f64::NEG_INFINITY, 3, 100), 3);
        // Swapped bounds are normalised
        assert_eq!(f64_to_u32_clamp(50.0, 100, 0), 50);
    }

    #[test]
    fn test_round_to_pixel() {
        assert_eq!(round_to_pixel(4.6, 10), Some(5));
        assert_eq!(round_to_pixel(12.0, 10), Some(9));
        assert_eq!(round_to_pixel(-3.0, 10), Some(0));
        assert_eq!(round_to_pixel(1.0, 0), None);
    }

    proptest! {
        #[test]
        fn prop_f64_to_u32_clamp_always_within_bounds(
            value in any::<f64>(),
            min in any::<u32>(),
            max in any::<u32>()
        ) {
            let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
            let result = f64_to_u32_clamp(value, min, max);
            prop_assert!(result >= lo);
            prop_assert!(result <= hi);
        }

        #[test]
        fn prop_round_to_pixel_within_axis(value in -1.0e6f64..1.0e6, limit in 1u32..10_000) {
            let px = round_to_pixel(value, limit).unwrap();
            prop_assert!(px < limit);
        }
    }
}
