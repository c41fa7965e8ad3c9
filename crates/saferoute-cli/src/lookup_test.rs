use saferoute_core::{Locale, Shelter, ShelterSource};
use saferoute_locator::{LocatorError, SourceReport};

use super::*;

fn shelter(id: &str, latitude: f64, longitude: f64, source: ShelterSource) -> Shelter {
    Shelter {
        id: id.to_string(),
        latitude,
        longitude,
        title: Some("Bomb shelter".to_string()),
        description: format!("{id} street"),
        source,
    }
}

fn success(shelters: Vec<Shelter>, places: SourceStatus) -> NearbyShelters {
    let closest = shelters.first().cloned();
    NearbyShelters {
        shelters,
        closest,
        sources: SourceReport {
            moderated: SourceStatus::Ok { count: 1 },
            places,
        },
    }
}

const ORIGIN: Coordinate = Coordinate::new(32.0853, 34.7818);

#[test]
fn parse_coordinate_accepts_spaces_and_negatives() {
    let c = parse_coordinate(" -33.5 , -70.25 ").unwrap();
    assert!((c.latitude + 33.5).abs() < f64::EPSILON);
    assert!((c.longitude + 70.25).abs() < f64::EPSILON);
}

#[test]
fn parse_coordinate_rejects_missing_comma() {
    let err = parse_coordinate("32.08 34.78").unwrap_err();
    assert!(err.to_string().contains("latitude,longitude"), "{err}");
}

#[test]
fn parse_coordinate_rejects_garbage_and_out_of_range() {
    assert!(parse_coordinate("north,34.78").is_err());
    assert!(parse_coordinate("32.08,east").is_err());
    assert!(parse_coordinate("91.0,34.78").is_err());
    assert!(parse_coordinate("NaN,34.78").is_err());
}

#[test]
fn render_shows_prompt_once_then_only_list() {
    let mut view = NearbySheltersView::new();
    let generation = view.begin();
    view.apply(
        generation,
        Ok(success(
            vec![
                shelter("dizengoff", 32.0753, 34.7750, ShelterSource::Moderated),
                shelter("place-1", 32.09, 34.79, ShelterSource::Places),
            ],
            SourceStatus::Ok { count: 1 },
        )),
    );
    let translator = Translator::new(Locale::En);

    let first = render_view(&mut view, ORIGIN, &translator);
    assert!(first.contains("Closest shelter found"), "{first}");
    assert!(first.contains("The closest shelter is at: dizengoff street"), "{first}");
    assert!(
        first.contains("destination=32.0753,34.775"),
        "navigation link missing: {first}"
    );
    assert!(first.contains("  1. Bomb shelter [moderated] dizengoff street"), "{first}");
    assert!(first.contains("  2. Bomb shelter [places] place-1 street"), "{first}");
    assert!(!first.contains("warning"), "{first}");

    let second = render_view(&mut view, ORIGIN, &translator);
    assert!(!second.contains("Closest shelter found"), "{second}");
    assert!(second.contains("  1. Bomb shelter"), "{second}");
}

#[test]
fn render_warns_about_failed_source() {
    let mut view = NearbySheltersView::new();
    let generation = view.begin();
    view.apply(
        generation,
        Ok(success(
            vec![shelter("dizengoff", 32.0753, 34.7750, ShelterSource::Moderated)],
            SourceStatus::Failed {
                error: "places API returned REQUEST_DENIED".to_string(),
            },
        )),
    );

    let out = render_view(&mut view, ORIGIN, &Translator::new(Locale::En));
    assert!(
        out.contains("warning: places source unavailable: places API returned REQUEST_DENIED"),
        "{out}"
    );
}

#[test]
fn render_empty_result_in_hebrew() {
    let mut view = NearbySheltersView::new();
    let generation = view.begin();
    view.apply(generation, Ok(success(Vec::new(), SourceStatus::Ok { count: 0 })));

    let out = render_view(&mut view, ORIGIN, &Translator::new(Locale::He));
    assert_eq!(out.trim(), "לא נמצאו מקלטים בקרבת מקום");
}

#[test]
fn render_retryable_failure_offers_retry() {
    let mut view = NearbySheltersView::new();
    let generation = view.begin();
    view.apply(
        generation,
        Err(AggregateError::SourceFailed {
            kind: ShelterSource::Moderated,
            error: LocatorError::UnexpectedStatus {
                status: 503,
                url: "http://store.test/api/shelters".to_string(),
            },
        }),
    );

    let out = render_view(&mut view, ORIGIN, &Translator::new(Locale::En));
    assert!(out.starts_with("Could not load shelters."), "{out}");
    assert!(out.contains("503"), "{out}");
}

#[test]
fn render_invalid_origin_has_no_retry_hint() {
    let mut view = NearbySheltersView::new();
    let generation = view.begin();
    view.apply(
        generation,
        Err(AggregateError::InvalidOrigin {
            latitude: 120.0,
            longitude: 0.0,
        }),
    );

    let out = render_view(&mut view, ORIGIN, &Translator::new(Locale::En));
    assert!(out.starts_with("error: origin is not a valid coordinate"), "{out}");
    assert!(!out.contains("retry"), "{out}");
}

#[test]
fn build_query_applies_overrides() {
    let config = saferoute_core::load_app_config_from_env().unwrap();
    let options = LookupOptions {
        radius_meters: Some(750),
        locale: Some("he-IL".to_string()),
        best_effort: false,
    };

    let query = build_query(&config, ORIGIN, &options);
    assert_eq!(query.radius_meters, 750);
    assert_eq!(query.locale, Locale::He);
    assert_eq!(query.origin, ORIGIN);
}

#[tokio::test]
async fn follow_finishes_when_a_lookup_panics() {
    let input: &[u8] = b"1.0,1.0\n2.0,2.0\n";
    let lookup = |origin: Coordinate| async move {
        assert!(origin.latitude > 1.5, "lookup crashed for {origin}");
        Ok::<_, AggregateError>(success(Vec::new(), SourceStatus::Ok { count: 0 }))
    };
    let mut applied = Vec::new();

    tokio::time::timeout(
        std::time::Duration::from_secs(5),
        follow_lines(input, lookup, |_, origin| applied.push(origin)),
    )
    .await
    .expect("follow loop must drain after input ends")
    .expect("follow loop result");

    assert_eq!(applied, [Coordinate::new(2.0, 2.0)]);
}

#[tokio::test]
async fn follow_skips_unparseable_lines() {
    let input: &[u8] = b"\nnot a coordinate\n32.0853,34.7818\n";
    let lookup = |_: Coordinate| async {
        Ok::<_, AggregateError>(success(Vec::new(), SourceStatus::Ok { count: 0 }))
    };
    let mut applied = Vec::new();

    follow_lines(input, lookup, |view, origin| {
        assert!(!view.is_loading());
        applied.push(origin);
    })
    .await
    .unwrap();

    assert_eq!(applied, [ORIGIN]);
}
