//! Turn-by-turn deep links for a chosen shelter.

use crate::shelter::Coordinate;

const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1";

/// Google Maps directions URL ending at `destination`.
///
/// Maps apps on both mobile platforms open this link directly.
#[must_use]
pub fn navigation_url(destination: Coordinate) -> String {
    format!(
        "{DIRECTIONS_BASE_URL}&destination={},{}",
        destination.latitude, destination.longitude
    )
}
