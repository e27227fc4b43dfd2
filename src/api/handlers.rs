use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::Session,
    models::{
        Listing, ListingId, RecommendedListing, Reservation, ReservationRequest, Role,
        SearchCriteria,
    },
    services::{
        booking::{self, BookingOutcome},
        images,
        preferences::{self, RequiredField},
        stats::{DEFAULT_PRICE_BUCKETS, MAX_PRICE_BUCKETS},
        ListingStats, PreferenceExtractor, Recommender,
    },
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl From<&Session> for LoginResponse {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token.to_string(),
            username: session.username.clone(),
            name: session.name.clone(),
            role: session.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub count: usize,
    pub results: Vec<RecommendedListing>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub listings: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Criteria gathered from earlier messages
    #[serde(default)]
    pub criteria: SearchCriteria,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub criteria: SearchCriteria,
    pub missing: Vec<RequiredField>,
    /// True once every required field is known
    pub ready: bool,
    pub updated: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub buckets: Option<usize>,
}

/// Runs synchronous file work off the async worker threads
async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {}", e)))?
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Exchange a username/password pair for a session token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let credential = state
        .gate
        .authenticate(&request.username, &request.password)?;
    let session = state.open_session(credential).await;
    Ok(Json(LoginResponse::from(&session)))
}

/// End the current session
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> StatusCode {
    state.close_session(session.token).await;
    tracing::info!(username = %session.username, "Logged out");
    StatusCode::NO_CONTENT
}

/// Rank listings against the submitted criteria and attach images
pub async fn recommend(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(criteria): Json<SearchCriteria>,
) -> AppResult<Json<RecommendationResponse>> {
    criteria.validate()?;

    let snapshot = state.listings.read().await.snapshot();
    let matches: Vec<Listing> = Recommender::new(&snapshot)
        .recommend(&criteria)
        .into_iter()
        .cloned()
        .collect();

    tracing::info!(
        username = %session.username,
        matches = matches.len(),
        "Processed recommendation request"
    );

    let results = images::decorate(state.images.as_ref(), matches).await;

    Ok(Json(RecommendationResponse {
        count: results.len(),
        results,
    }))
}

/// Fold a chat message into the criteria gathered so far
///
/// The reply asks for the first missing required field, then once for the
/// optional preferences.
pub async fn chat(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let snapshot = state.listings.read().await.snapshot();
    let mut criteria = request.criteria;
    let updated = PreferenceExtractor::new(&snapshot).ingest(&request.message, &mut criteria);

    let missing = preferences::missing_fields(&criteria);
    let reply = preferences::next_prompt(&criteria, &missing).to_string();

    tracing::info!(
        username = %session.username,
        updated = ?updated,
        missing = missing.len(),
        "Chat message ingested"
    );

    Ok(Json(ChatResponse {
        reply,
        ready: missing.is_empty(),
        criteria,
        missing,
        updated,
    }))
}

/// Get a single listing by id
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<ListingId>,
) -> AppResult<Json<Listing>> {
    let listings = state.listings.read().await;
    listings
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", id)))
}

/// Confirm a reservation for the logged-in user
pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<ReservationRequest>,
) -> AppResult<(StatusCode, Json<BookingOutcome>)> {
    let listings = state.listings.read().await.clone();
    let log = state.reservations.clone();
    let username = session.username;

    let outcome =
        run_blocking(move || booking::reserve(&listings, &log, &username, request)).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Reservations of the logged-in user, newest first
pub async fn my_reservations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<Vec<Reservation>>> {
    let log = state.reservations.clone();
    let reservations = run_blocking(move || log.for_user(&session.username)).await?;
    Ok(Json(reservations))
}

/// Re-read the listings file into a fresh snapshot
///
/// On failure the previous snapshot stays in place.
pub async fn reload_listings(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<ReloadResponse>> {
    session.require_admin()?;

    let current = state.listings.read().await.clone();
    let fresh = run_blocking(move || current.reload()).await?;
    let response = ReloadResponse {
        listings: fresh.len(),
        loaded_at: fresh.loaded_at(),
    };
    *state.listings.write().await = fresh;

    tracing::info!(
        username = %session.username,
        listings = response.listings,
        "Listings reloaded"
    );

    Ok(Json(response))
}

/// Every reservation in the log, in file order
pub async fn all_reservations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<Vec<Reservation>>> {
    session.require_admin()?;
    let log = state.reservations.clone();
    Ok(Json(run_blocking(move || log.read_all()).await?))
}

/// Truncate the reservation log
pub async fn reset_reservations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<StatusCode> {
    session.require_admin()?;
    let log = state.reservations.clone();
    run_blocking(move || log.reset()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Price histogram and average price per location over the current snapshot
pub async fn listing_stats(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<ListingStats>> {
    session.require_admin()?;

    let buckets = query.buckets.unwrap_or(DEFAULT_PRICE_BUCKETS);
    if buckets == 0 || buckets > MAX_PRICE_BUCKETS {
        return Err(AppError::InvalidInput(format!(
            "buckets must be between 1 and {}",
            MAX_PRICE_BUCKETS
        )));
    }

    let snapshot = state.listings.read().await.snapshot();
    Ok(Json(ListingStats::compute(&snapshot, buckets)))
}
