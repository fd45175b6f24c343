//! Mapping from a continuous signal value to a discrete bar meter.

/// Restricts `value` to `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Restricts a signal value to the canonical `[0, 1]` range.
pub fn clamp01(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}

/// Maps a signal in `[0, 1]` to a bar count in `[0, total_bars]`.
///
/// Out-of-range signal is clamped first, so the result is a valid bar index
/// for any input, including `total_bars == 0`.
pub fn bars_from_signal(signal: f64, total_bars: u8) -> u8 {
    let level = (clamp01(signal) * f64::from(total_bars)).round() as i64;
    level.clamp(0, i64::from(total_bars)) as u8
}

/// Renders a signal as a fixed-width meter string for terminal output,
/// e.g. `▮▮▮▯▯` for 3 of 5 bars.
pub fn bar_glyphs(signal: f64, total_bars: u8) -> String {
    let active = bars_from_signal(signal, total_bars);
    let mut meter = String::with_capacity(usize::from(total_bars) * 3);
    for i in 0..total_bars {
        meter.push(if i < active { '▮' } else { '▯' });
    }
    meter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_restricts_to_range() {
        assert_eq!(clamp(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clamp(0.3, 0.0, 1.0), 0.3);
    }

    #[test]
    fn bars_at_range_edges() {
        assert_eq!(bars_from_signal(0.0, 5), 0);
        assert_eq!(bars_from_signal(1.0, 5), 5);
    }

    #[test]
    fn bars_for_out_of_range_signal() {
        assert_eq!(bars_from_signal(-3.0, 5), 0);
        assert_eq!(bars_from_signal(42.0, 5), 5);
        assert_eq!(bars_from_signal(f64::NAN, 5), 0);
    }

    #[test]
    fn bars_with_zero_total() {
        assert_eq!(bars_from_signal(0.9, 0), 0);
    }

    #[test]
    fn bars_always_within_total() {
        for i in 0..=100 {
            let signal = f64::from(i) / 100.0;
            let bars = bars_from_signal(signal, 5);
            assert!(bars <= 5, "signal {signal} produced {bars} bars");
        }
    }

    #[test]
    fn bars_monotonic_in_signal() {
        let mut previous = 0;
        for i in 0..=1000 {
            let bars = bars_from_signal(f64::from(i) / 1000.0, 5);
            assert!(bars >= previous);
            previous = bars;
        }
    }

    #[test]
    fn glyph_meter_has_fixed_width() {
        assert_eq!(bar_glyphs(0.0, 5), "▯▯▯▯▯");
        assert_eq!(bar_glyphs(1.0, 5), "▮▮▮▮▮");
        assert_eq!(bar_glyphs(0.5, 5).chars().count(), 5);
    }
}
