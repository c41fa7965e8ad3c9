//! The nearby-shelter pipeline: fetch both sources concurrently, normalize,
//! merge (moderated first), deduplicate, and pick the closest.

use futures::future::join;
use serde::Serialize;

use saferoute_core::{
    dedupe_shelters, find_closest_shelter, AppConfig, Coordinate, DedupTolerance, FailurePolicy,
    Locale, Shelter, ShelterSource, Translator,
};

use crate::error::{AggregateError, LocatorError};
use crate::normalize::{normalize_places, normalize_stored_shelters};
use crate::places::PlacesClient;
use crate::store::ShelterStoreClient;

/// One lookup request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub origin: Coordinate,
    pub radius_meters: u32,
    pub locale: Locale,
}

impl NearbyQuery {
    /// Query at `origin` using the configured radius and locale.
    #[must_use]
    pub fn from_config(origin: Coordinate, config: &AppConfig) -> Self {
        Self {
            origin,
            radius_meters: config.search_radius_meters,
            locale: config.locale,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatorSettings {
    pub failure_policy: FailurePolicy,
    pub dedup_tolerance: DedupTolerance,
}

impl AggregatorSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            failure_policy: config.failure_policy,
            dedup_tolerance: config.dedup_tolerance,
        }
    }
}

/// Outcome of one source in a single aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Ok { count: usize },
    Failed { error: String },
}

impl SourceStatus {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, SourceStatus::Ok { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub moderated: SourceStatus,
    pub places: SourceStatus,
}

/// Result of a successful aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyShelters {
    /// Deduplicated shelters, moderated entries before place entries.
    pub shelters: Vec<Shelter>,
    pub closest: Option<Shelter>,
    pub sources: SourceReport,
}

impl NearbyShelters {
    /// `true` when a source failed and its shelters are missing.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !(self.sources.moderated.is_ok() && self.sources.places.is_ok())
    }
}

pub struct ShelterAggregator {
    store: ShelterStoreClient,
    places: PlacesClient,
    settings: AggregatorSettings,
}

impl ShelterAggregator {
    #[must_use]
    pub fn new(store: ShelterStoreClient, places: PlacesClient, settings: AggregatorSettings) -> Self {
        Self {
            store,
            places,
            settings,
        }
    }

    /// Runs one aggregation for `query`.
    ///
    /// Both sources are fetched concurrently. Under
    /// [`FailurePolicy::AllOrNothing`] any source failure fails the run; under
    /// [`FailurePolicy::BestEffort`] only a failure of both does.
    ///
    /// # Errors
    ///
    /// - [`AggregateError::InvalidOrigin`] if the origin is outside WGS84 bounds.
    /// - [`AggregateError::SourceFailed`] if one source fails under
    ///   `AllOrNothing`.
    /// - [`AggregateError::AllSourcesFailed`] if both sources fail.
    pub async fn aggregate(&self, query: &NearbyQuery) -> Result<NearbyShelters, AggregateError> {
        let origin = query.origin;
        if !origin.is_valid() {
            return Err(AggregateError::InvalidOrigin {
                latitude: origin.latitude,
                longitude: origin.longitude,
            });
        }

        tracing::debug!(%origin, radius_meters = query.radius_meters, "aggregating nearby shelters");

        let translator = Translator::new(query.locale);
        let (moderated, places) = join(
            self.store.list_approved_near(origin),
            self.places
                .nearby_search(origin, query.radius_meters, query.locale),
        )
        .await;

        let moderated = moderated.map(|records| normalize_stored_shelters(records, &translator));
        let places = places.map(|results| normalize_places(results, &translator));
        let (moderated, places, sources) =
            resolve_sources(self.settings.failure_policy, moderated, places)?;

        let mut merged = moderated;
        merged.extend(places);
        let before_dedup = merged.len();
        let shelters = dedupe_shelters(merged, self.settings.dedup_tolerance);
        let closest = find_closest_shelter(origin, &shelters).cloned();

        tracing::info!(
            %origin,
            merged = before_dedup,
            unique = shelters.len(),
            closest = closest.as_ref().map(|s| s.id.as_str()),
            "nearby shelters aggregated"
        );

        Ok(NearbyShelters {
            shelters,
            closest,
            sources,
        })
    }
}

type Resolved = (Vec<Shelter>, Vec<Shelter>, SourceReport);

/// Applies the failure policy to the two source outcomes.
fn resolve_sources(
    policy: FailurePolicy,
    moderated: Result<Vec<Shelter>, LocatorError>,
    places: Result<Vec<Shelter>, LocatorError>,
) -> Result<Resolved, AggregateError> {
    match (moderated, places) {
        (Ok(moderated), Ok(places)) => {
            let sources = SourceReport {
                moderated: SourceStatus::Ok {
                    count: moderated.len(),
                },
                places: SourceStatus::Ok {
                    count: places.len(),
                },
            };
            Ok((moderated, places, sources))
        }
        (Err(moderated), Err(places)) => {
            tracing::warn!(moderated = %moderated, places = %places, "all shelter sources failed");
            Err(AggregateError::AllSourcesFailed { moderated, places })
        }
        (Err(error), Ok(places)) => {
            let failed = degrade(policy, ShelterSource::Moderated, error)?;
            let sources = SourceReport {
                moderated: failed,
                places: SourceStatus::Ok {
                    count: places.len(),
                },
            };
            Ok((Vec::new(), places, sources))
        }
        (Ok(moderated), Err(error)) => {
            let failed = degrade(policy, ShelterSource::Places, error)?;
            let sources = SourceReport {
                moderated: SourceStatus::Ok {
                    count: moderated.len(),
                },
                places: failed,
            };
            Ok((moderated, Vec::new(), sources))
        }
    }
}

fn degrade(
    policy: FailurePolicy,
    kind: ShelterSource,
    error: LocatorError,
) -> Result<SourceStatus, AggregateError> {
    tracing::warn!(source = %kind, error = %error, ?policy, "shelter source failed");
    match policy {
        FailurePolicy::AllOrNothing => Err(AggregateError::SourceFailed { kind, error }),
        FailurePolicy::BestEffort => Ok(SourceStatus::Failed {
            error: error.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelter(id: &str, source: ShelterSource) -> Shelter {
        Shelter {
            id: id.to_string(),
            latitude: 32.0,
            longitude: 34.0,
            title: None,
            description: String::new(),
            source,
        }
    }

    fn failure() -> LocatorError {
        LocatorError::UnexpectedStatus {
            status: 500,
            url: "http://store.test/api/shelters".to_string(),
        }
    }

    #[test]
    fn both_ok_reports_counts() {
        let (m, p, report) = resolve_sources(
            FailurePolicy::AllOrNothing,
            Ok(vec![shelter("a", ShelterSource::Moderated)]),
            Ok(vec![]),
        )
        .unwrap();
        assert_eq!(m.len(), 1);
        assert!(p.is_empty());
        assert_eq!(report.moderated, SourceStatus::Ok { count: 1 });
        assert_eq!(report.places, SourceStatus::Ok { count: 0 });
    }

    #[test]
    fn all_or_nothing_fails_on_single_source() {
        let err = resolve_sources(
            FailurePolicy::AllOrNothing,
            Ok(vec![shelter("a", ShelterSource::Moderated)]),
            Err(failure()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AggregateError::SourceFailed {
                kind: ShelterSource::Places,
                ..
            }
        ));
    }

    #[test]
    fn best_effort_keeps_surviving_source() {
        let (m, p, report) = resolve_sources(
            FailurePolicy::BestEffort,
            Err(failure()),
            Ok(vec![shelter("p", ShelterSource::Places)]),
        )
        .unwrap();
        assert!(m.is_empty());
        assert_eq!(p.len(), 1);
        assert!(!report.moderated.is_ok());
        assert!(report.places.is_ok());
    }

    #[test]
    fn best_effort_fails_when_both_fail() {
        let err =
            resolve_sources(FailurePolicy::BestEffort, Err(failure()), Err(failure())).unwrap_err();
        assert!(matches!(err, AggregateError::AllSourcesFailed { .. }));
    }

    #[test]
    fn source_status_serializes_tagged() {
        let json = serde_json::to_value(SourceStatus::Ok { count: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "ok", "count": 3 }));
    }
}
