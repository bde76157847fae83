use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use chrono::{Datelike, Local, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::calendar;
use crate::config::Config;
use crate::model::division::Division;
use crate::model::event::Event;
use crate::model::team::TEAM_ALL_ID;
use crate::render::{self, EventContext, NavSection};
use crate::teamsnap::{EventQuery, TeamSnap, TeamSnapError};

#[derive(Clone)]
pub struct AppState {
    pub teamsnap: TeamSnap,
    pub time_zone: Tz,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        AppState {
            teamsnap: TeamSnap::new(config),
            time_zone: config.time_zone,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Upstream(#[from] TeamSnapError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            other => {
                error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The schedule could not be loaded right now.".to_string(),
                )
            }
        };
        (status, Html(render::error_page(status.as_u16(), &message))).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/events") }))
        .route("/events", get(handle_events_index))
        .route("/events/{year}", get(handle_events_year))
        .route("/events/{year}/{week}", get(handle_events_week))
        .route("/teams", get(handle_teams))
        .route("/teams/{team_id}", get(handle_team))
        .with_state(state)
}

async fn handle_events_index() -> Redirect {
    Redirect::to(&format!("/events/{}", Local::now().year()))
}

#[instrument(level = "info")]
async fn handle_events_year(Path(year): Path<String>) -> Result<Redirect, AppError> {
    let parsed = year
        .parse::<i32>()
        .ok()
        .filter(|y| calendar::is_valid_year(*y));
    let Some(year) = parsed else {
        return Err(AppError::NotFound(format!("Events Year {year} Not Found")));
    };
    let week = calendar::current_week_in_year(year);
    Ok(Redirect::to(&format!("/events/{year}/{week}")))
}

#[instrument(level = "info", skip(state))]
async fn handle_events_week(
    State(state): State<AppState>,
    Path((year, week)): Path<(String, String)>,
) -> Result<Html<String>, AppError> {
    let not_found = || AppError::NotFound(format!("Events Year {year} Week {week} Not Found"));
    let (Ok(y), Ok(w)) = (year.parse::<i32>(), week.parse::<u32>()) else {
        return Err(not_found());
    };
    let window = calendar::start_and_end_of_week(y, w).ok_or_else(not_found)?;
    let (after, before) = window.to_utc(state.time_zone);
    info!(year = y, week = w, %after, %before, "Loading week events");

    let page = run_blocking(&state.teamsnap, move |ts| {
        let frame = load_frame(&ts)?;
        let query = EventQuery {
            started_after: Some(after),
            started_before: Some(before),
            ..Default::default()
        };
        let events = ts.search_events(&query)?;
        let body = events_body(&ts, "All Teams Events", &frame, &events)?;
        Ok(render::layout("All Teams Events", &frame.nav, &body))
    })
    .await?;
    Ok(Html(page))
}

#[instrument(level = "info", skip(state))]
async fn handle_teams(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let page = run_blocking(&state.teamsnap, |ts| {
        let frame = load_frame(&ts)?;
        let teams = ts.get_root_division_teams()?;
        let body = render::teams_page(&frame.root_division, &frame.tree, &teams);
        Ok(render::layout("Teams", &frame.nav, &body))
    })
    .await?;
    Ok(Html(page))
}

/// Upcoming events of one team, or of every root division team for the "All" id.
#[instrument(level = "info", skip(state))]
async fn handle_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let not_found = AppError::NotFound(format!("Team {team_id} Not Found"));
    let Ok(id) = team_id.parse::<i64>() else {
        return Err(not_found);
    };
    let after = calendar::today_start_utc(state.time_zone, Utc::now());

    let page = run_blocking(&state.teamsnap, move |ts| {
        let frame = load_frame(&ts)?;
        let team = if id == TEAM_ALL_ID { Some(ts.team_all()) } else { ts.get_team(id)? };
        let Some(team) = team else {
            return Err(not_found);
        };

        let team_ids: Vec<i64> = if team.is_all() {
            ts.get_root_division_teams()?
                .iter()
                .filter(|t| !t.is_all())
                .map(|t| t.id)
                .collect()
        } else {
            vec![team.id]
        };
        // An empty team filter would match every event upstream.
        let events = if team_ids.is_empty() {
            Vec::new()
        } else {
            ts.search_events(&EventQuery {
                team_ids,
                started_after: Some(after),
                ..Default::default()
            })?
        };

        let heading = if team.is_all() {
            "All Teams Events".to_string()
        } else {
            format!("{} Team Events", team.display_name())
        };
        let body = events_body(&ts, &heading, &frame, &events)?;
        Ok(render::layout(&heading, &frame.nav, &body))
    })
    .await?;
    Ok(Html(page))
}

/// Data every page needs: the root division, its tree, and the menu built from them.
struct Frame {
    root_division: Division,
    tree: Vec<Division>,
    nav: Vec<NavSection>,
}

fn load_frame(ts: &TeamSnap) -> Result<Frame, AppError> {
    let root_division = ts
        .get_root_division()?
        .ok_or_else(|| AppError::NotFound("Root Division Not Found".to_string()))?;
    let tree = ts.get_division_tree(root_division.id)?;
    let teams = ts.get_root_division_teams()?;
    let nav = render::build_nav(&tree, &teams);
    Ok(Frame { root_division, tree, nav })
}

/// Resolve the teams and rinks referenced by `events`, then render them grouped by week.
fn events_body(ts: &TeamSnap, heading: &str, frame: &Frame, events: &[Event]) -> Result<String, AppError> {
    let location_ids = distinct_ids(events.iter().filter_map(|e| e.division_location_id));
    let team_ids = distinct_ids(events.iter().filter_map(|e| e.team_id));
    let locations = ts.search_division_locations(&location_ids)?;
    let teams = ts.search_teams(&team_ids)?;
    info!(
        event_count = events.len(),
        team_count = teams.len(),
        location_count = locations.len(),
        "Rendering events"
    );

    let grouped = calendar::group_events_by_week(events);
    let context = EventContext { teams: &teams, locations: &locations };
    Ok(render::events_page(
        heading,
        frame.root_division.season_name.as_deref(),
        &grouped,
        &context,
    ))
}

fn distinct_ids(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// The TeamSnap client blocks on I/O, so page loads run on the blocking pool.
async fn run_blocking<T, F>(ts: &TeamSnap, f: F) -> Result<T, AppError>
where
    F: FnOnce(TeamSnap) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let ts = ts.clone();
    tokio::task::spawn_blocking(move || f(ts)).await?
}
