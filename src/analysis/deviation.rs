//! Deviation of actual trajectory from planned targets.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::types::ProjectPoint;
use crate::units::Meters;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeviationStatistics {
    pub max_deviation: Meters,
    pub max_deviation_depth: Meters,
    pub max_deviation_target: Option<String>,
    pub mean_deviation: Meters,
    /// Sample standard deviation; zero with fewer than two targets.
    pub std_deviation: Meters,
    pub within_tolerance: usize,
    /// Targets with actuals.
    pub total: usize,
    /// Targets the trajectory could not reach.
    pub unresolved: usize,
}

pub fn deviation_statistics(targets: &[ProjectPoint]) -> DeviationStatistics {
    let resolved: Vec<(&ProjectPoint, f64)> = targets
        .iter()
        .filter_map(|t| t.actual.as_ref().map(|a| (t, a.deviation.0)))
        .collect();
    let mut stats = DeviationStatistics {
        total: resolved.len(),
        unresolved: targets.len() - resolved.len(),
        ..DeviationStatistics::default()
    };
    if resolved.is_empty() {
        return stats;
    }

    let deviations: Vec<f64> = resolved.iter().map(|(_, d)| *d).collect();
    stats.mean_deviation = Meters(deviations.iter().mean());
    if deviations.len() > 1 {
        stats.std_deviation = Meters(deviations.iter().std_dev());
    }
    stats.within_tolerance = resolved
        .iter()
        .filter(|(t, _)| t.actual.as_ref().is_some_and(|a| a.within_tolerance))
        .count();

    for (target, d) in &resolved {
        if stats.max_deviation_target.is_none() || *d > stats.max_deviation.0 {
            stats.max_deviation = Meters(*d);
            stats.max_deviation_depth = target.actual.as_ref().map_or(Meters(0.0), |a| a.depth);
            stats.max_deviation_target = Some(target.name.clone());
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActualPoint;

    fn target(name: &str, depth: f64, deviation: Option<f64>, radius: f64) -> ProjectPoint {
        let mut t = ProjectPoint::at_depth(name, 0.0, 0.0, depth, radius);
        t.actual = deviation.map(|d| ActualPoint {
            depth: Meters(depth),
            deviation: Meters(d),
            within_tolerance: d <= radius,
            ..ActualPoint::default()
        });
        t
    }

    #[test]
    fn test_deviation_statistics() {
        let targets = vec![
            target("A", 1000.0, Some(2.0), 5.0),
            target("B", 1500.0, Some(8.0), 5.0),
            target("C", 2000.0, Some(5.0), 5.0),
            target("D", 9000.0, None, 5.0),
        ];
        let s = deviation_statistics(&targets);
        assert_eq!(s.total, 3);
        assert_eq!(s.unresolved, 1);
        assert_eq!(s.within_tolerance, 2);
        assert_eq!(s.max_deviation, Meters(8.0));
        assert_eq!(s.max_deviation_depth, Meters(1500.0));
        assert_eq!(s.max_deviation_target.as_deref(), Some("B"));
        assert!((s.mean_deviation.0 - 5.0).abs() < 1e-12);
        assert!((s.std_deviation.0 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_actuals() {
        let s = deviation_statistics(&[target("X", 100.0, None, 1.0)]);
        assert_eq!(s.total, 0);
        assert_eq!(s.mean_deviation, Meters(0.0));
    }
}
