//! Derived views over heatmap and trend data

use crate::culture::{HeatmapPoint, TrendPoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A heatmap sample with its affinity scaled into [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub latitude: f64,
    pub longitude: f64,
    pub geohash: String,
    pub intensity: f64,
    pub popularity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSummary {
    /// Every point, in upstream order
    pub points: Vec<Hotspot>,
    /// Strongest points first
    pub hotspots: Vec<Hotspot>,
    pub max_affinity: f64,
}

impl HeatmapSummary {
    /// Scale affinities by the maximum and keep the `top` strongest points
    pub fn from_points(points: &[HeatmapPoint], top: usize) -> Self {
        let max_affinity = points
            .iter()
            .map(|p| p.query.affinity)
            .filter(|a| a.is_finite())
            .fold(0.0_f64, f64::max);

        let scaled: Vec<Hotspot> = points
            .iter()
            .map(|p| {
                let intensity = if max_affinity > 0.0 && p.query.affinity.is_finite() {
                    (p.query.affinity / max_affinity).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                Hotspot {
                    latitude: p.location.latitude,
                    longitude: p.location.longitude,
                    geohash: p.location.geohash.clone(),
                    intensity,
                    popularity: p.query.popularity,
                }
            })
            .collect();

        let mut hotspots = scaled.clone();
        hotspots.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
        hotspots.truncate(top);

        Self {
            points: scaled,
            hotspots,
            max_affinity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Placeholder heatmap: a 5x5 grid around the requested point whose
/// affinity falls off with distance from the centre
pub fn demo_heatmap(longitude: f64, latitude: f64) -> Vec<HeatmapPoint> {
    use crate::culture::models::{GeoLocation, HeatmapQuery};

    const STEP: f64 = 0.01;
    let mut points = Vec::with_capacity(25);
    for dy in -2_i32..=2 {
        for dx in -2_i32..=2 {
            let ring = dx.abs().max(dy.abs()) as f64;
            points.push(HeatmapPoint {
                location: GeoLocation {
                    latitude: latitude + dy as f64 * STEP,
                    longitude: longitude + dx as f64 * STEP,
                    geohash: String::new(),
                },
                query: HeatmapQuery {
                    affinity: 1.0 / (1.0 + ring),
                    affinity_rank: 1.0 / (1.0 + ring),
                    popularity: 0.5,
                },
            });
        }
    }
    points
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    /// Points in date order
    pub points: Vec<TrendPoint>,
    pub peak_date: Option<NaiveDate>,
    pub peak_popularity: f64,
    pub mean_popularity: f64,
    /// First rank minus last rank; positive means the entity climbed
    pub net_rank_change: i64,
    pub direction: TrendDirection,
}

impl TrendSummary {
    pub fn from_points(points: &[TrendPoint]) -> Self {
        let mut points = points.to_vec();
        points.sort_by_key(|p| p.date);

        let peak = points
            .iter()
            .filter(|p| p.popularity.is_finite())
            .fold(None::<&TrendPoint>, |best, p| match best {
                Some(b) if b.popularity >= p.popularity => Some(b),
                _ => Some(p),
            });

        let finite: Vec<f64> = points.iter().map(|p| p.popularity).filter(|v| v.is_finite()).collect();
        let mean_popularity = if finite.is_empty() {
            0.0
        } else {
            finite.iter().sum::<f64>() / finite.len() as f64
        };

        let net_rank_change = match (points.first(), points.last()) {
            (Some(first), Some(last)) => first.rank.saturating_sub(last.rank),
            _ => 0,
        };
        let direction = match net_rank_change {
            n if n > 0 => TrendDirection::Rising,
            n if n < 0 => TrendDirection::Falling,
            _ => TrendDirection::Flat,
        };

        Self {
            peak_date: peak.map(|p| p.date),
            peak_popularity: peak.map(|p| p.popularity).unwrap_or(0.0),
            mean_popularity,
            net_rank_change,
            direction,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::models::{GeoLocation, HeatmapQuery};

    fn point(lat: f64, lng: f64, affinity: f64) -> HeatmapPoint {
        HeatmapPoint {
            location: GeoLocation { latitude: lat, longitude: lng, geohash: format!("g{}", lat) },
            query: HeatmapQuery { affinity, affinity_rank: 0.0, popularity: 0.1 },
        }
    }

    fn trend(day: u32, popularity: f64, rank: i64) -> TrendPoint {
        TrendPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            popularity,
            rank,
            rank_delta: 0,
            population_percent_delta: 0.0,
        }
    }

    #[test]
    fn test_heatmap_intensity_normalized() {
        let summary = HeatmapSummary::from_points(
            &[point(1.0, 1.0, 0.2), point(2.0, 2.0, 0.8), point(3.0, 3.0, 0.4)],
            2,
        );

        assert_eq!(summary.max_affinity, 0.8);
        let intensities: Vec<f64> = summary.points.iter().map(|p| p.intensity).collect();
        assert_eq!(intensities, vec![0.25, 1.0, 0.5]);
        assert_eq!(summary.hotspots.len(), 2);
        assert_eq!(summary.hotspots[0].latitude, 2.0);
        assert_eq!(summary.hotspots[1].latitude, 3.0);
    }

    #[test]
    fn test_heatmap_all_zero() {
        let summary = HeatmapSummary::from_points(&[point(1.0, 1.0, 0.0)], 5);
        assert_eq!(summary.points[0].intensity, 0.0);
        assert!(HeatmapSummary::from_points(&[], 5).is_empty());
    }

    #[test]
    fn test_demo_heatmap_peaks_at_centre() {
        let summary = HeatmapSummary::from_points(&demo_heatmap(-73.99, 40.73), 1);
        assert_eq!(summary.points.len(), 25);
        assert_eq!(summary.hotspots[0].latitude, 40.73);
        assert_eq!(summary.hotspots[0].intensity, 1.0);
    }

    #[test]
    fn test_trend_summary() {
        let summary = TrendSummary::from_points(&[trend(15, 0.4, 80), trend(1, 0.2, 120), trend(8, 0.9, 95)]);

        assert_eq!(summary.points[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(summary.peak_date, NaiveDate::from_ymd_opt(2024, 3, 8));
        assert_eq!(summary.peak_popularity, 0.9);
        assert!((summary.mean_popularity - 0.5).abs() < 1e-12);
        assert_eq!(summary.net_rank_change, 40);
        assert_eq!(summary.direction, TrendDirection::Rising);
    }

    #[test]
    fn test_extreme_ranks_saturate() {
        let summary = TrendSummary::from_points(&[trend(1, 0.1, i64::MIN), trend(2, 0.2, i64::MAX)]);
        assert_eq!(summary.net_rank_change, i64::MIN);
        assert_eq!(summary.direction, TrendDirection::Falling);

        let summary = TrendSummary::from_points(&[trend(1, 0.1, i64::MAX), trend(2, 0.2, -5)]);
        assert_eq!(summary.net_rank_change, i64::MAX);
        assert_eq!(summary.direction, TrendDirection::Rising);
    }

    #[test]
    fn test_empty_trend() {
        let summary = TrendSummary::from_points(&[]);
        assert_eq!(summary.peak_date, None);
        assert_eq!(summary.direction, TrendDirection::Flat);
    }
}
