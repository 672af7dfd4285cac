//! Azimuth wrapping against a requested window.
//!
//! Windows may reach beyond `[0, 360)` (up to +/-540 degrees) so a caller can
//! ask for a range straddling north, e.g. `[350, 370]`. Station azimuths are
//! shifted by whole turns until they sit at or below the window maximum and
//! within one turn of it.

pub const FULL_TURN_DEGREES: f64 = 360.0;
pub const AZIMUTH_LIMIT_DEGREES: f64 = 540.0;

/// Returns `azimuth - 360 * ceil((azimuth - window_max) / 360)`: congruent to
/// `azimuth` modulo 360 and in `(window_max - 360, window_max]`.
pub fn normalize_azimuth(azimuth: f64, window_max: f64) -> f64 {
    azimuth - FULL_TURN_DEGREES * ((azimuth - window_max) / FULL_TURN_DEGREES).ceil()
}

#[cfg(test)]
mod tests {
    use super::{FULL_TURN_DEGREES, normalize_azimuth};

    fn is_whole_turn(delta: f64) -> bool {
        let turns = delta / FULL_TURN_DEGREES;
        (turns - turns.round()).abs() < 1.0e-9
    }

    #[test]
    fn azimuths_inside_default_window_are_unchanged() {
        for azimuth in [10.0, 180.0, 359.5, 360.0] {
            assert_eq!(normalize_azimuth(azimuth, 360.0), azimuth);
        }
        // The window is half-open below, so north lands on its upper edge.
        assert_eq!(normalize_azimuth(0.0, 360.0), 360.0);
    }

    #[test]
    fn window_across_north_pulls_small_azimuths_up_one_turn() {
        assert_eq!(normalize_azimuth(5.0, 370.0), 365.0);
        assert_eq!(normalize_azimuth(355.0, 370.0), 355.0);
        assert_eq!(normalize_azimuth(15.0, 370.0), 15.0);
    }

    #[test]
    fn negative_windows_pull_azimuths_down() {
        assert_eq!(normalize_azimuth(350.0, 10.0), -10.0);
        assert_eq!(normalize_azimuth(5.0, 10.0), 5.0);
        assert_eq!(normalize_azimuth(200.0, -170.0), -520.0);
    }

    #[test]
    fn normalized_azimuth_is_bounded_and_congruent() {
        let azimuths = [-540.0, -361.5, -90.0, 0.0, 45.5, 359.999, 360.0, 540.0];
        let maxima = [-180.0, 0.0, 10.0, 200.0, 360.0, 370.0, 540.0];
        for &azimuth in &azimuths {
            for &window_max in &maxima {
                let normalized = normalize_azimuth(azimuth, window_max);
                assert!(normalized <= window_max, "{azimuth} -> {normalized} > {window_max}");
                assert!(normalized > window_max - FULL_TURN_DEGREES);
                assert!(is_whole_turn(normalized - azimuth));
            }
        }
    }
}
