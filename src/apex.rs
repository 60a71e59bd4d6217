//! APEX (Additive System of Photographic Exposure) conversions used by Canon's packed records.

use std::f64::consts::LN_2;

#[rustfmt::skip]
const FSTOPS: &[f64] = &[
    0.0, 1.0, 1.1, 1.2, 1.3, 1.4, 1.6, 1.8, 2.0, 2.2, 2.5, 2.8, 3.2, 3.5, 3.6, 4.0, 4.5, 5.0,
    5.7, 6.3, 7.1, 8.0, 9.0, 10.1, 11.0, 12.7, 14.3, 16.0, 18.0, 20.2, 22.0, 25.4, 28.5, 32.0,
    45.0, 64.0, 90.0, 125.0, 180.0,
];

/// Reciprocal shutter speeds: 25 means 1/25 s.
#[rustfmt::skip]
const SHUTTER_SPEEDS: &[f64] = &[
    0.0, 1.0, 2.0, 2.5, 3.2, 4.0, 5.0, 6.4, 8.0, 10.0, 12.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0,
    60.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 320.0, 400.0, 500.0, 640.0, 800.0, 1000.0,
    1250.0, 1600.0, 2000.0,
];

/// Round to a tenth and snap to the closest entry of `table`.
fn snap(value: f64, table: &[f64]) -> f64 {
    let value = (value * 10.0 + 0.5).floor() / 10.0;
    table
        .iter()
        .copied()
        .min_by(|a, b| (a - value).abs().total_cmp(&(b - value).abs()))
        .unwrap_or(value)
}

/// Snap an f-number to the nearest marked stop.
pub fn fix_fstop(fstop: f64) -> f64 {
    snap(fstop, FSTOPS)
}

/// Snap a reciprocal shutter speed to the nearest marked speed.
pub fn fix_shutter_speed(speed: f64) -> f64 {
    snap(speed, SHUTTER_SPEEDS)
}

/// Canon's APEX encoding: 1/32 EV steps, with `0x0C` and `0x14` standing for thirds.
pub fn apex_to_ev(apex: i32) -> f64 {
    let sign = if apex < 0 { -1.0 } else { 1.0 };
    let apex = apex.abs();
    let frac = match apex & 0x1F {
        0x0C => 32.0 / 3.0,
        0x14 => 64.0 / 3.0,
        other => other as f64,
    };
    sign * ((apex & !0x1F) as f64 + frac) / 32.0
}

/// F-number from an APEX aperture.
pub fn fstop_from_apex(apex: i32) -> f64 {
    fix_fstop((apex_to_ev(apex) * LN_2 / 2.0).exp())
}

/// ISO speed from an APEX sensitivity.
pub fn iso_from_apex(apex: i32) -> u32 {
    let n = (apex_to_ev(apex) * LN_2).exp() * 100.0 / 32.0;
    (n + 0.5) as u32
}

/// Exposure time in seconds from an APEX shutter speed, as `(numerator, denominator)`.
pub fn shutter_speed_from_apex(apex: i32) -> (u32, u32) {
    let n = (-apex_to_ev(apex) * LN_2).exp();
    if n > 0.0 && n < 1.0 {
        (1, fix_shutter_speed(1.0 / n) as u32)
    } else {
        ((n * 10.0) as u32, 10)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_apex_to_ev() {
        assert_eq!(apex_to_ev(0), 0.0);
        assert_eq!(apex_to_ev(32), 1.0);
        assert_eq!(apex_to_ev(-64), -2.0);
        assert!((apex_to_ev(0x2C) - (1.0 + 1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_conversions() {
        // 160 / 32 = 5 EV above ISO 3.125
        assert_eq!(iso_from_apex(160), 100);
        assert_eq!(iso_from_apex(192), 200);
        // 3 EV of aperture = f/2.8
        assert_eq!(fstop_from_apex(96), 2.8);
        assert_eq!(fstop_from_apex(128), 4.0);
        // 6 EV = 1/64 s, snapped to 1/60
        assert_eq!(shutter_speed_from_apex(192), (1, 60));
        // -1 EV = 2 s
        assert_eq!(shutter_speed_from_apex(-32), (20, 10));
    }

    #[test]
    fn test_snapping() {
        assert_eq!(fix_fstop(11.3), 11.0);
        assert_eq!(fix_fstop(0.2), 0.0);
        assert_eq!(fix_shutter_speed(124.0), 125.0);
    }
}
