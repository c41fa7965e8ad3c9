//! Geometry for the nearby-shelter pipeline: haversine distance, closest-shelter
//! selection, and coordinate-based deduplication.
//!
//! Everything here is pure and allocation-light; result sets are tens of
//! entries, so linear and quadratic scans are fine.

use crate::shelter::{Coordinate, Shelter};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coordinate delta (degrees) under which two shelters are the same place.
pub const DEDUP_TOLERANCE_DEGREES: f64 = 0.0001;

/// Slack absorbing `f64` representation error in degree subtraction.
/// `37.0001 - 37.0` evaluates to `0.00010000000000332`.
const DEGREE_EPSILON: f64 = 1e-9;

/// Smallest cosine used when widening the longitude tolerance near the poles.
const MIN_LATITUDE_COSINE: f64 = 1e-6;

/// Great-circle distance between two points in kilometers (haversine).
///
/// No validation is performed; NaN inputs yield NaN.
#[must_use]
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Return the shelter nearest to `origin`, or `None` for an empty slice.
///
/// Ties keep the earliest shelter (strict `<`). Shelters whose distance is
/// NaN are skipped.
#[must_use]
pub fn find_closest_shelter(origin: Coordinate, shelters: &[Shelter]) -> Option<&Shelter> {
    let mut closest: Option<(&Shelter, f64)> = None;
    for shelter in shelters {
        let distance = distance_km(origin, shelter.coordinate());
        if distance.is_nan() {
            continue;
        }
        match closest {
            Some((_, best)) if distance >= best => {}
            _ => closest = Some((shelter, distance)),
        }
    }
    closest.map(|(shelter, _)| shelter)
}

/// How close two coordinates must be to count as the same shelter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupTolerance {
    /// `|Δlat| < 0.0001` and `|Δlon| < 0.0001`, regardless of latitude.
    ///
    /// East-west this covers ~11 m at the equator but only ~5.5 m at 60°.
    #[default]
    Fixed,
    /// Same latitude threshold; the longitude threshold is divided by
    /// `cos(latitude)` so the east-west distance stays roughly constant.
    LatitudeScaled,
}

impl DedupTolerance {
    fn is_duplicate(self, kept: &Shelter, candidate: &Shelter) -> bool {
        let lat_delta = (kept.latitude - candidate.latitude).abs();
        let lon_delta = (kept.longitude - candidate.longitude).abs();
        let lon_tolerance = match self {
            DedupTolerance::Fixed => DEDUP_TOLERANCE_DEGREES,
            DedupTolerance::LatitudeScaled => {
                let cosine = kept.latitude.to_radians().cos().max(MIN_LATITUDE_COSINE);
                DEDUP_TOLERANCE_DEGREES / cosine
            }
        };
        lat_delta < DEDUP_TOLERANCE_DEGREES + DEGREE_EPSILON
            && lon_delta < lon_tolerance + DEGREE_EPSILON
    }
}

impl std::str::FromStr for DedupTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(DedupTolerance::Fixed),
            "latitude_scaled" => Ok(DedupTolerance::LatitudeScaled),
            other => Err(format!(
                "expected 'fixed' or 'latitude_scaled', got '{other}'"
            )),
        }
    }
}

/// Drop shelters that sit on top of an earlier one.
///
/// The first occurrence wins, so the caller's concatenation order decides
/// which source takes precedence.
#[must_use]
pub fn dedupe_shelters(shelters: Vec<Shelter>, tolerance: DedupTolerance) -> Vec<Shelter> {
    let mut kept: Vec<Shelter> = Vec::with_capacity(shelters.len());
    for candidate in shelters {
        if !kept
            .iter()
            .any(|existing| tolerance.is_duplicate(existing, &candidate))
        {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shelter::ShelterSource;

    fn shelter(id: &str, latitude: f64, longitude: f64) -> Shelter {
        Shelter {
            id: id.to_string(),
            latitude,
            longitude,
            title: None,
            description: String::new(),
            source: ShelterSource::Places,
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        let points = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(32.908_562, 35.284_914),
            Coordinate::new(-89.9, 179.9),
        ];
        for p in points {
            assert!(distance_km(p, p).abs() < f64::EPSILON, "{p}");
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(32.0853, 34.7818);
        let b = Coordinate::new(31.7683, 35.2137);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-12);
    }

    #[test]
    fn distance_matches_known_city_pair() {
        // Tel Aviv -> Jerusalem, ~54 km great-circle.
        let tel_aviv = Coordinate::new(32.0853, 34.7818);
        let jerusalem = Coordinate::new(31.7683, 35.2137);
        let d = distance_km(tel_aviv, jerusalem);
        assert!((d - 54.0).abs() < 1.5, "got {d}");
    }

    #[test]
    fn distance_one_degree_of_latitude() {
        let d = distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn distance_propagates_nan() {
        let d = distance_km(Coordinate::new(f64::NAN, 0.0), Coordinate::new(0.0, 0.0));
        assert!(d.is_nan());
    }

    #[test]
    fn closest_picks_nearest() {
        let shelters = vec![shelter("a", 1.0, 1.0), shelter("b", 0.1, 0.1)];
        let closest = find_closest_shelter(Coordinate::new(0.0, 0.0), &shelters);
        assert_eq!(closest.map(|s| s.id.as_str()), Some("b"));
    }

    #[test]
    fn closest_tie_keeps_first_in_input_order() {
        let shelters = vec![shelter("north", 1.0, 0.0), shelter("south", -1.0, 0.0)];
        let closest = find_closest_shelter(Coordinate::new(0.0, 0.0), &shelters);
        assert_eq!(closest.map(|s| s.id.as_str()), Some("north"));

        let reversed = vec![shelter("south", -1.0, 0.0), shelter("north", 1.0, 0.0)];
        let closest = find_closest_shelter(Coordinate::new(0.0, 0.0), &reversed);
        assert_eq!(closest.map(|s| s.id.as_str()), Some("south"));
    }

    #[test]
    fn closest_of_empty_is_none() {
        assert!(find_closest_shelter(Coordinate::new(0.0, 0.0), &[]).is_none());
    }

    #[test]
    fn closest_skips_nan_shelter() {
        let shelters = vec![shelter("broken", f64::NAN, 0.0), shelter("ok", 5.0, 5.0)];
        let closest = find_closest_shelter(Coordinate::new(0.0, 0.0), &shelters);
        assert_eq!(closest.map(|s| s.id.as_str()), Some("ok"));
    }

    #[test]
    fn dedupe_collapses_neighbours_and_keeps_first() {
        let shelters = vec![
            shelter("first", 37.0, -122.0),
            shelter("second", 37.0001, -122.0001),
            shelter("far", 40.0, -74.0),
        ];
        let deduped = dedupe_shelters(shelters, DedupTolerance::Fixed);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, "first");
        assert!((deduped[0].latitude - 37.0).abs() < f64::EPSILON);
        assert!((deduped[0].longitude + 122.0).abs() < f64::EPSILON);
        assert_eq!(deduped[1].id, "far");
    }

    #[test]
    fn dedupe_requires_both_axes_within_tolerance() {
        let shelters = vec![shelter("a", 10.0, 10.0), shelter("b", 10.00005, 10.001)];
        let deduped = dedupe_shelters(shelters, DedupTolerance::Fixed);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn dedupe_compares_against_every_kept_item() {
        let shelters = vec![
            shelter("a", 0.0, 0.0),
            shelter("b", 1.0, 1.0),
            shelter("a-dup", 0.00002, 0.00002),
            shelter("b-dup", 1.00003, 0.99998),
        ];
        let ids: Vec<String> = dedupe_shelters(shelters, DedupTolerance::Fixed)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn fixed_tolerance_is_not_latitude_corrected() {
        // 0.00015° of longitude at 60°N is ~8 m: physically the same spot,
        // but outside the fixed degree threshold.
        let shelters = vec![shelter("a", 60.0, 10.0), shelter("b", 60.0, 10.00015)];
        let deduped = dedupe_shelters(shelters, DedupTolerance::Fixed);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn latitude_scaled_tolerance_widens_longitude_at_high_latitude() {
        let shelters = vec![shelter("a", 60.0, 10.0), shelter("b", 60.0, 10.00015)];
        let deduped = dedupe_shelters(shelters, DedupTolerance::LatitudeScaled);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, "a");
    }

    #[test]
    fn latitude_scaled_matches_fixed_at_equator() {
        let shelters = vec![shelter("a", 0.0, 10.0), shelter("b", 0.0, 10.00015)];
        let deduped = dedupe_shelters(shelters, DedupTolerance::LatitudeScaled);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn dedup_tolerance_parses_config_values() {
        assert_eq!("fixed".parse(), Ok(DedupTolerance::Fixed));
        assert_eq!(
            "latitude_scaled".parse(),
            Ok(DedupTolerance::LatitudeScaled)
        );
        assert!("nearest".parse::<DedupTolerance>().is_err());
    }
}
