//! Circular binning of wind observations.
//!
//! Sector `k` covers `[k * width, (k + 1) * width)` degrees. Directions are
//! reduced modulo 360 first, so 360 lands in the first sector together with
//! 0 and nothing is counted twice at the wrap.

use crate::config::{AnalysisConfig, Normalization};
use crate::error::Result;
use crate::schema::{WD, WS, numeric_values, require_columns};
use crate::types::{AnalysisWarning, WindExclusions, WindRose, WindSector};
use crate::utils::linspace;
use polars::prelude::*;
use tracing::{debug, warn};

const COMPONENT: &str = "wind rose";

/// Parameters for a wind rose, taken from [`AnalysisConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindRoseParams {
    pub sectors: usize,
    pub speed_bins: Option<usize>,
    pub normalization: Normalization,
    pub opening: f64,
}

impl From<&AnalysisConfig> for WindRoseParams {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            sectors: config.wind_sectors,
            speed_bins: config.wind_speed_bins,
            normalization: config.wind_normalization,
            opening: config.wind_opening,
        }
    }
}

impl Default for WindRoseParams {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

/// Bin the dataset's `WD`/`WS` columns into a wind rose.
pub fn wind_rose(df: &DataFrame, params: WindRoseParams) -> Result<WindRose> {
    require_columns(df, &[WD, WS])?;
    let directions = numeric_values(df, WD)?;
    let speeds = numeric_values(df, WS)?;
    bin_wind(&directions, &speeds, params)
}

/// Map a direction in degrees to its sector index.
///
/// The result agrees with the reported bounds: sector `k` holds exactly the
/// reduced directions in `[width * k, width * (k + 1))`.
pub fn sector_index(direction: f64, sectors: usize) -> usize {
    let width = 360.0 / sectors as f64;
    let reduced = direction.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if sectors <= 1 || reduced >= 360.0 {
        return 0;
    }
    let mut index = ((reduced / width).floor() as usize).min(sectors - 1);
    // Correct for rounding so the edge comparison is authoritative.
    if index > 0 && reduced < width * index as f64 {
        index -= 1;
    } else if index + 1 < sectors && reduced >= width * (index + 1) as f64 {
        index += 1;
    }
    index
}

/// Bin paired direction/speed observations.
pub fn bin_wind(
    directions: &[Option<f64>],
    speeds: &[Option<f64>],
    params: WindRoseParams,
) -> Result<WindRose> {
    let config = AnalysisConfig {
        wind_sectors: params.sectors,
        wind_speed_bins: params.speed_bins,
        wind_opening: params.opening,
        ..AnalysisConfig::default()
    };
    config.validate()?;

    let mut excluded = WindExclusions::default();
    let mut observations = Vec::with_capacity(directions.len());
    for (direction, speed) in directions.iter().zip(speeds.iter()) {
        match (direction, speed) {
            (None, _) => excluded.missing_direction += 1,
            (_, None) => excluded.missing_speed += 1,
            (Some(_), Some(s)) if *s < 0.0 => excluded.negative_speed += 1,
            (Some(d), Some(s)) => observations.push((*d, *s)),
        }
    }
    if excluded.total() > 0 {
        warn!(
            "Wind rose excluded {} rows ({} missing direction, {} missing speed, {} negative speed)",
            excluded.total(),
            excluded.missing_direction,
            excluded.missing_speed,
            excluded.negative_speed
        );
    }

    let speed_edges = match params.speed_bins {
        Some(bins) if !observations.is_empty() => {
            let (min, max) = observations
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, s)| {
                    (lo.min(*s), hi.max(*s))
                });
            linspace(min, max, bins)
        }
        _ => Vec::new(),
    };
    let speed_slots = params.speed_bins.unwrap_or(0);

    let mut counts = vec![0usize; params.sectors];
    let mut speed_counts = vec![vec![0usize; speed_slots]; params.sectors];
    for &(direction, speed) in &observations {
        let sector = sector_index(direction, params.sectors);
        counts[sector] += 1;
        if !speed_edges.is_empty() {
            speed_counts[sector][speed_bin(&speed_edges, speed)] += 1;
        }
    }

    let total = observations.len();
    let mut warnings = Vec::new();
    if total == 0 {
        warnings.push(AnalysisWarning::empty_input(
            COMPONENT,
            "no rows with valid direction and speed",
        ));
    }

    let width = 360.0 / params.sectors as f64;
    let sectors = counts
        .iter()
        .zip(speed_counts)
        .enumerate()
        .map(|(index, (&count, speed_counts))| WindSector {
            index,
            start: width * index as f64,
            end: if index + 1 == params.sectors {
                360.0
            } else {
                width * (index + 1) as f64
            },
            count,
            frequency: params.normalization.apply(count, total),
            speed_frequencies: speed_counts
                .iter()
                .map(|&c| params.normalization.apply(c, total))
                .collect(),
            speed_counts,
        })
        .collect();

    debug!(
        "Binned {} wind observations into {} sectors",
        total, params.sectors
    );

    Ok(WindRose {
        sector_width: width,
        bar_width: width * params.opening,
        normalization: params.normalization,
        speed_edges,
        sectors,
        observations: total,
        excluded,
        warnings,
    })
}

/// Index of the last edge not above `speed`; the top bin is open-ended.
fn speed_bin(edges: &[f64], speed: f64) -> usize {
    edges.partition_point(|edge| *edge <= speed).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(sectors: usize) -> WindRoseParams {
        WindRoseParams {
            sectors,
            speed_bins: None,
            normalization: Normalization::Fraction,
            opening: 0.8,
        }
    }

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    // ==================== sector_index tests ====================

    #[test]
    fn test_sector_index_half_open() {
        assert_eq!(sector_index(0.0, 4), 0);
        assert_eq!(sector_index(89.999, 4), 0);
        assert_eq!(sector_index(90.0, 4), 1);
        assert_eq!(sector_index(359.999, 4), 3);
    }

    #[test]
    fn test_sector_index_wraps() {
        assert_eq!(sector_index(360.0, 4), 0);
        assert_eq!(sector_index(450.0, 4), 1);
        assert_eq!(sector_index(-90.0, 4), 3);
        assert_eq!(sector_index(-1e-20, 4), 0);
    }

    #[test]
    fn test_sector_index_matches_reported_bounds() {
        for sectors in 1..=72 {
            let rose = bin_wind(&[], &[], params(sectors)).unwrap();
            for sector in &rose.sectors {
                assert_eq!(
                    sector_index(sector.start, sectors),
                    sector.index,
                    "{} sectors, start {}",
                    sectors,
                    sector.start
                );
                let just_below_end = sector.end - sector.end.abs() * f64::EPSILON * 4.0;
                assert_eq!(sector_index(just_below_end, sectors), sector.index);
            }
            assert_eq!(rose.sectors[sectors - 1].end, 360.0);
        }
    }

    #[test]
    fn test_uneven_sector_widths_count_starts_in_own_sector() {
        let starts: Vec<f64> = (0..7).map(|k| 360.0 / 7.0 * k as f64).collect();
        let speeds = vec![1.0; starts.len()];
        let rose = bin_wind(&some(&starts), &some(&speeds), params(7)).unwrap();
        assert!(rose.sectors.iter().all(|sector| sector.count == 1));
    }

    // ==================== bin_wind tests ====================

    #[test]
    fn test_four_cardinal_directions_equal_share() {
        let rose = bin_wind(
            &some(&[0.0, 90.0, 180.0, 270.0]),
            &some(&[1.0, 1.0, 1.0, 1.0]),
            params(4),
        )
        .unwrap();

        assert_eq!(rose.sectors.len(), 4);
        for sector in &rose.sectors {
            assert_eq!(sector.count, 1);
            assert_eq!(sector.frequency, 0.25);
        }
        assert_eq!(rose.sectors[3].start, 270.0);
        assert_eq!(rose.sectors[3].end, 360.0);
        assert_eq!(rose.sector_width, 90.0);
        assert!((rose.bar_width - 72.0).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_boundary_not_double_counted() {
        let rose = bin_wind(&some(&[0.0, 360.0, 720.0]), &some(&[2.0, 2.0, 2.0]), params(4))
            .unwrap();
        assert_eq!(rose.sectors[0].count, 3);
        assert_eq!(rose.sectors.iter().map(|s| s.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_exclusions_are_reported() {
        let directions = vec![Some(10.0), None, Some(20.0), Some(30.0), None];
        let speeds = vec![Some(1.0), Some(1.0), None, Some(-0.5), None];
        let rose = bin_wind(&directions, &speeds, params(4)).unwrap();

        assert_eq!(rose.observations, 1);
        assert_eq!(rose.excluded.missing_direction, 2);
        assert_eq!(rose.excluded.missing_speed, 1);
        assert_eq!(rose.excluded.negative_speed, 1);
        assert_eq!(rose.excluded.total() + rose.observations, directions.len());
    }

    #[test]
    fn test_percent_and_count_normalization() {
        let dirs = some(&[10.0, 20.0, 100.0, 200.0]);
        let speeds = some(&[1.0, 1.0, 1.0, 1.0]);

        let mut p = params(4);
        p.normalization = Normalization::Percent;
        let rose = bin_wind(&dirs, &speeds, p).unwrap();
        assert_eq!(rose.sectors[0].frequency, 50.0);
        assert!((rose.total_frequency() - 100.0).abs() < 1e-9);

        p.normalization = Normalization::Counts;
        let rose = bin_wind(&dirs, &speeds, p).unwrap();
        assert_eq!(rose.sectors[0].frequency, 2.0);
    }

    #[test]
    fn test_speed_sub_bins() {
        let dirs = some(&[5.0, 5.0, 5.0, 95.0]);
        let speeds = some(&[0.0, 2.0, 4.0, 4.0]);
        let mut p = params(4);
        p.speed_bins = Some(3);

        let rose = bin_wind(&dirs, &speeds, p).unwrap();
        assert_eq!(rose.speed_edges, vec![0.0, 2.0, 4.0]);
        assert_eq!(rose.sectors[0].speed_counts, vec![1, 1, 1]);
        assert_eq!(rose.sectors[1].speed_counts, vec![0, 0, 1]);
        assert_eq!(rose.sectors[2].speed_counts, vec![0, 0, 0]);
        let sub_total: f64 = rose
            .sectors
            .iter()
            .flat_map(|s| s.speed_frequencies.iter())
            .sum();
        assert!((sub_total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input_warns() {
        let rose = bin_wind(&[None], &[Some(1.0)], params(8)).unwrap();
        assert_eq!(rose.observations, 0);
        assert_eq!(rose.total_frequency(), 0.0);
        assert_eq!(rose.warnings.len(), 1);
    }

    #[test]
    fn test_zero_sectors_rejected() {
        let err = bin_wind(&some(&[1.0]), &some(&[1.0]), params(0)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_wind_rose_requires_columns() {
        let df = df!["WD" => [10.0]].unwrap();
        let err = wind_rose(&df, WindRoseParams::default()).unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_infinite_direction_excluded_not_binned() {
        let df = df![
            "WD" => [f64::INFINITY, 90.0],
            "WS" => [3.0, f64::INFINITY],
        ]
        .unwrap();
        let rose = wind_rose(&df, params(4)).unwrap();
        assert_eq!(rose.observations, 0);
        assert_eq!(rose.excluded.missing_direction, 1);
        assert_eq!(rose.excluded.missing_speed, 1);
        assert_eq!(rose.sectors[0].count, 0);
    }

    #[test]
    fn test_wind_rose_from_frame() {
        let df = df![
            "WD" => [Some(0.0), Some(45.0), Some(180.0), None],
            "WS" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
        ]
        .unwrap();
        let rose = wind_rose(&df, params(8)).unwrap();
        assert_eq!(rose.observations, 3);
        assert_eq!(rose.sectors[0].count, 1);
        assert_eq!(rose.sectors[1].count, 1);
        assert_eq!(rose.sectors[4].count, 1);
        assert_eq!(rose.excluded.missing_direction, 1);
    }
}
