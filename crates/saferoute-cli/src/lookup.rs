//! `nearby` and `follow` command handlers.
//!
//! Both run the shelter aggregation and render it through a
//! [`NearbySheltersView`]; `follow` runs one lookup per stdin line and drops
//! results overtaken by a newer position.

use std::fmt::Write as _;
use std::future::Future;
use std::sync::Arc;

use clap::Args;
use saferoute_core::{
    distance_km, navigation::navigation_url, AppConfig, Coordinate, FailurePolicy, Locale,
    Message, Translator,
};
use saferoute_locator::{
    AggregateError, AggregatorSettings, ApplyOutcome, GeocodeClient, Generation, NearbyQuery,
    NearbyShelters, NearbySheltersView, PlacesClient, ShelterAggregator, ShelterStoreClient,
    SourceStatus,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

/// Overrides shared by the lookup commands.
#[derive(Debug, Clone, Default, Args)]
pub struct LookupOptions {
    /// Search radius in meters (defaults to SAFEROUTE_SEARCH_RADIUS_METERS)
    #[arg(long)]
    pub radius_meters: Option<u32>,
    /// Display language, e.g. `en` or `he` (defaults to SAFEROUTE_LOCALE)
    #[arg(long)]
    pub locale: Option<String>,
    /// Show results from whichever source answered when the other fails
    #[arg(long)]
    pub best_effort: bool,
}

type LookupOutcome = (Generation, Coordinate, Result<NearbyShelters, AggregateError>);

pub(crate) fn build_aggregator(
    config: &AppConfig,
    options: &LookupOptions,
) -> anyhow::Result<ShelterAggregator> {
    let api_key = config.require_google_maps_api_key()?;
    let store = ShelterStoreClient::new(
        &config.shelter_api_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let places = PlacesClient::new(
        &config.places_url,
        api_key,
        &config.search_keyword,
        config.request_timeout_secs,
        &config.user_agent,
    )?;

    let mut settings = AggregatorSettings::from_config(config);
    if options.best_effort {
        settings.failure_policy = FailurePolicy::BestEffort;
    }
    Ok(ShelterAggregator::new(store, places, settings))
}

fn build_query(config: &AppConfig, origin: Coordinate, options: &LookupOptions) -> NearbyQuery {
    let mut query = NearbyQuery::from_config(origin, config);
    if let Some(radius) = options.radius_meters {
        query.radius_meters = radius;
    }
    if let Some(tag) = options.locale.as_deref() {
        query.locale = Locale::from_tag(tag);
    }
    query
}

/// Parses `lat,lon` (whitespace around either part is ignored).
pub(crate) fn parse_coordinate(raw: &str) -> anyhow::Result<Coordinate> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("expected 'latitude,longitude', got '{raw}'"))?;
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid latitude '{}': {e}", lat.trim()))?;
    let longitude: f64 = lon
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid longitude '{}': {e}", lon.trim()))?;
    Ok(Coordinate::try_new(latitude, longitude)?)
}

/// Resolves a display address for the user's position. Failures degrade to
/// the localized placeholder.
async fn describe_position(config: &AppConfig, origin: Coordinate, translator: &Translator) -> String {
    let unknown = || translator.text(Message::UnknownLocation).to_string();
    let Some(api_key) = config.google_maps_api_key.as_deref() else {
        return unknown();
    };
    let client = match GeocodeClient::new(
        &config.geocode_url,
        api_key,
        config.request_timeout_secs,
        &config.user_agent,
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "could not build geocode client");
            return unknown();
        }
    };
    match client.reverse_geocode(origin, translator.locale()).await {
        Ok(Some(address)) => address,
        Ok(None) => unknown(),
        Err(e) => {
            tracing::warn!(error = %e, "reverse geocoding failed");
            unknown()
        }
    }
}

/// One-shot lookup at a fixed position.
///
/// # Errors
///
/// Returns an error if the configuration lacks the places API key, the origin
/// is invalid, or the aggregation fails.
pub(crate) async fn run_nearby(
    config: &AppConfig,
    latitude: f64,
    longitude: f64,
    options: &LookupOptions,
    json: bool,
) -> anyhow::Result<()> {
    let origin = Coordinate::try_new(latitude, longitude)?;
    let aggregator = build_aggregator(config, options)?;
    let query = build_query(config, origin, options);
    let translator = Translator::new(query.locale);

    let result = aggregator.aggregate(&query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result?)?);
        return Ok(());
    }

    let position = describe_position(config, origin, &translator).await;
    println!("{position}");

    let mut view = NearbySheltersView::new();
    let generation = view.begin();
    let failed = result.is_err();
    view.apply(generation, result);
    print!("{}", render_view(&mut view, origin, &translator));

    if failed {
        anyhow::bail!("shelter lookup failed");
    }
    Ok(())
}

/// Continuous lookup: every stdin line is a new position.
///
/// Lookups run concurrently; only the newest position's result is shown.
///
/// # Errors
///
/// Returns an error if the configuration lacks the places API key or stdin
/// cannot be read. Per-line parse and lookup failures are reported and skipped.
pub(crate) async fn run_follow(config: &AppConfig, options: &LookupOptions) -> anyhow::Result<()> {
    let aggregator = Arc::new(build_aggregator(config, options)?);
    let locale = build_query(config, Coordinate::new(0.0, 0.0), options).locale;
    let translator = Translator::new(locale);

    let lookup = |origin: Coordinate| {
        let aggregator = Arc::clone(&aggregator);
        let query = build_query(config, origin, options);
        async move { aggregator.aggregate(&query).await }
    };
    follow_lines(
        BufReader::new(tokio::io::stdin()),
        lookup,
        |view, origin| {
            println!("--- {origin}");
            print!("{}", render_view(view, origin, &translator));
        },
    )
    .await
}

/// Drives one lookup per `lat,lon` line of `reader` and calls `on_applied`
/// whenever the newest result lands in the view. Returns once the reader is
/// exhausted and every spawned lookup has finished or failed.
pub(crate) async fn follow_lines<R, F, Fut>(
    reader: R,
    lookup: F,
    mut on_applied: impl FnMut(&mut NearbySheltersView, Coordinate),
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    F: Fn(Coordinate) -> Fut,
    Fut: Future<Output = Result<NearbyShelters, AggregateError>> + Send + 'static,
{
    let mut lines = reader.lines();
    let mut lookups: JoinSet<LookupOutcome> = JoinSet::new();
    let mut view = NearbySheltersView::new();
    let mut input_open = true;

    while input_open || !lookups.is_empty() {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let origin = match parse_coordinate(line) {
                    Ok(origin) => origin,
                    Err(e) => {
                        eprintln!("skipping '{line}': {e:#}");
                        continue;
                    }
                };

                let generation = view.begin();
                let pending = lookup(origin);
                lookups.spawn(async move { (generation, origin, pending.await) });
            }
            Some(joined) = lookups.join_next(), if !lookups.is_empty() => {
                let (generation, origin, result) = match joined {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!(error = %e, "shelter lookup task failed");
                        continue;
                    }
                };
                match view.apply(generation, result) {
                    ApplyOutcome::Applied => on_applied(&mut view, origin),
                    ApplyOutcome::Stale => {
                        tracing::debug!(generation = generation.value(), %origin, "dropped result for superseded position");
                    }
                }
            }
        }
    }

    Ok(())
}

/// Renders the view's current state. Consumes the pending navigation prompt.
pub(crate) fn render_view(
    view: &mut NearbySheltersView,
    origin: Coordinate,
    translator: &Translator,
) -> String {
    let mut out = String::new();

    if let Some(error) = view.error() {
        if error.retryable {
            let _ = writeln!(out, "{}", translator.text(Message::LoadFailedRetry));
            let _ = writeln!(out, "  ({})", error.message);
        } else {
            let _ = writeln!(out, "error: {}", error.message);
        }
        return out;
    }

    if let Some(sources) = view.sources() {
        for (name, status) in [("moderated", &sources.moderated), ("places", &sources.places)] {
            if let SourceStatus::Failed { error } = status {
                let _ = writeln!(out, "warning: {name} source unavailable: {error}");
            }
        }
    }

    if view.shelters().is_empty() {
        let _ = writeln!(out, "{}", translator.text(Message::NoSheltersFound));
        return out;
    }

    if let Some(closest) = view.take_navigation_prompt() {
        let _ = writeln!(
            out,
            "{}: {}",
            translator.text(Message::ClosestShelterFound),
            translator.closest_shelter_at(&closest.description)
        );
        let _ = writeln!(
            out,
            "{}: {}",
            translator.text(Message::Navigate),
            navigation_url(closest.coordinate())
        );
    }

    for (index, shelter) in view.shelters().iter().enumerate() {
        let title = shelter
            .title
            .as_deref()
            .unwrap_or_else(|| translator.text(Message::BombShelter));
        let _ = writeln!(
            out,
            "{:>3}. {title} [{}] {} ({:.2} km)",
            index + 1,
            shelter.source,
            shelter.description,
            distance_km(origin, shelter.coordinate())
        );
    }
    out
}

#[cfg(test)]
#[path = "lookup_test.rs"]
mod tests;
