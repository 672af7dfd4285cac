use crate::domain::Profile;
use std::collections::BTreeSet;
use std::fmt::Write;

/// Plain-text overview of a set of profiles: one header line, then one line
/// per profile in the order given.
pub fn render_profile_summary(profiles: &[Profile]) -> String {
    let runs: BTreeSet<&str> = profiles
        .iter()
        .map(|profile| profile.run_name.as_str())
        .collect();

    let mut summary = format!(
        "{} profile{} from {} run{}\n",
        profiles.len(),
        plural(profiles.len()),
        runs.len(),
        plural(runs.len())
    );
    for profile in profiles {
        // Writing into a String cannot fail.
        let _ = writeln!(
            summary,
            "{} cluster {} ({} {}): {} stations, distance span {:.3} deg, azimuth span {:.3} deg, \
             slowness {} s/deg, corrected {} {} s/deg, decay {} /deg",
            profile.run_name,
            profile.cluster_id,
            profile.phase,
            if profile.is_synthetic { "synthetic" } else { "data" },
            profile.station_count(),
            profile.distance_span,
            profile.azimuth_span,
            estimate(profile.slowness, profile.slowness_error),
            profile.corrected_frame().label(),
            estimate(profile.corrected_slowness, profile.corrected_slowness_error),
            estimate(profile.decay_rate, profile.decay_rate_error),
        );
    }
    summary
}

fn estimate(value: f64, error: Option<f64>) -> String {
    match error {
        Some(error) => format!("{value:.4} +/- {error:.4}"),
        None => format!("{value:.4}"),
    }
}

const fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
