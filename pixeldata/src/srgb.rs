//! The sRGB transfer function.

/// Encode a linear-light value in `[0, 1]` into its sRGB form.
pub fn linear_to_srgb(x: f64) -> f64 {
    if x <= 0.003_130_8 {
        12.92 * x
    } else {
        1.055 * x.powf(1. / 2.4) - 0.055
    }
}

/// Decode an sRGB-encoded value in `[0, 1]` back into linear light.
pub fn srgb_to_linear(x: f64) -> f64 {
    if x <= 0.040_45 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode a linear-light value into an 8-bit sRGB sample.
pub fn encode_srgb_u8(linear: f64) -> u8 {
    (linear_to_srgb(linear.clamp(0., 1.)) * 255.).round() as u8
}

/// Decode an 8-bit sRGB sample into linear light.
pub fn decode_srgb_u8(value: u8) -> f64 {
    srgb_to_linear(f64::from(value) / 255.)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_endpoints() {
        assert_eq!(linear_to_srgb(0.), 0.);
        assert!((linear_to_srgb(1.) - 1.).abs() < 1e-12);
        assert_eq!(srgb_to_linear(0.), 0.);
        assert!((srgb_to_linear(1.) - 1.).abs() < 1e-12);
    }

    /// The two curve branches meet continuously.
    #[test]
    fn curve_is_continuous_at_the_split() {
        let below = linear_to_srgb(0.0031307);
        let above = linear_to_srgb(0.0031309);
        assert!((below - above).abs() < 1e-4);
    }

    /// Quantizing to 8 bits and back stays within about 1%.
    #[test]
    fn eight_bit_round_trip_is_stable() {
        for value in 0..=255u8 {
            let linear = decode_srgb_u8(value);
            let back = encode_srgb_u8(linear);
            assert!(
                (i16::from(back) - i16::from(value)).abs() <= 1,
                "{} came back as {}",
                value,
                back
            );
        }

        for &linear in &[0., 0.001, 0.01, 0.18, 0.5, 0.9, 1.0] {
            let round_tripped = decode_srgb_u8(encode_srgb_u8(linear));
            assert!(
                (round_tripped - linear).abs() <= 0.01 * linear.max(0.01),
                "{} came back as {}",
                linear,
                round_tripped
            );
        }
    }
}
