use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::booking::{BookingErrorKind, BookingOutcome};
use super::domain::{SlotId, WaitlistEntryId, WaitlistStatus};
use super::reporting::{
    AppointmentTypeDemand, DashboardOverview, PractitionerAvailability, SlotFilter, SlotStats,
    WaitlistStats,
};
use super::repository::{BookingStore, WaitlistRepository};
use super::service::WaitlistMatchingService;
use super::views::{
    BookingConfirmationView, EntryMatchesView, MatchListView, PractitionerSlotsView,
    SlotListView, SlotRowView, TopMatchView, WaitlistEntryView, WaitlistListView,
};
use crate::error::AppError;

/// Router builder exposing the matching board, booking, slot, and dashboard endpoints.
pub fn matching_router<R, B>(service: Arc<WaitlistMatchingService<R, B>>) -> Router
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    Router::new()
        .route("/api/v1/matching", get(matches_handler::<R, B>))
        .route(
            "/api/v1/matching/waitlist/:entry_id",
            get(entry_matches_handler::<R, B>),
        )
        .route("/api/v1/matching/book", post(book_handler::<R, B>))
        .route(
            "/api/v1/dashboard/overview",
            get(overview_handler::<R, B>),
        )
        .route(
            "/api/v1/dashboard/top-matches",
            get(top_matches_handler::<R, B>),
        )
        .route(
            "/api/v1/dashboard/practitioners",
            get(practitioners_handler::<R, B>),
        )
        .route(
            "/api/v1/dashboard/appointment-types",
            get(appointment_types_handler::<R, B>),
        )
        .route("/api/v1/waitlist", get(waitlist_handler::<R, B>))
        .route(
            "/api/v1/waitlist/stats",
            get(waitlist_stats_handler::<R, B>),
        )
        .route(
            "/api/v1/waitlist/:entry_id",
            get(waitlist_entry_handler::<R, B>),
        )
        .route("/api/v1/slots", get(slots_handler::<R, B>))
        .route("/api/v1/slots/stats", get(slot_stats_handler::<R, B>))
        .route(
            "/api/v1/slots/by-practitioner",
            get(slots_by_practitioner_handler::<R, B>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BookMatchRequest {
    #[serde(default)]
    pub(crate) waitlist_entry_id: Option<String>,
    #[serde(default)]
    pub(crate) slot_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TopMatchesQuery {
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WaitlistQuery {
    pub(crate) status: Option<String>,
}

fn rejected_booking(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(BookingOutcome::rejected(message)),
    )
        .into_response()
}

pub(crate) async fn matches_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
) -> Result<Json<MatchListView>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    let matches = service.find_matches()?;
    Ok(Json(MatchListView::new(&matches)))
}

pub(crate) async fn entry_matches_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
    Path(entry_id): Path<String>,
) -> Result<Json<EntryMatchesView>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    let entry_id = WaitlistEntryId(entry_id);
    let matches = service.find_matches_for_entry(&entry_id)?;
    Ok(Json(EntryMatchesView::new(entry_id, &matches)))
}

/// Booking failures, malformed bodies included, answer with `{ success: false, error }`.
pub(crate) async fn book_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
    payload: Result<Json<BookMatchRequest>, JsonRejection>,
) -> Response
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected_booking(rejection.body_text()),
    };

    let non_blank = |value: Option<String>| value.filter(|value| !value.trim().is_empty());
    let (Some(entry_id), Some(slot_id)) = (
        non_blank(request.waitlist_entry_id),
        non_blank(request.slot_id),
    ) else {
        return rejected_booking("waitlist_entry_id and slot_id are required");
    };

    match service.book_match(&WaitlistEntryId(entry_id), &SlotId(slot_id)) {
        Ok(appointment) => {
            let view = BookingConfirmationView {
                success: true,
                appointment_id: appointment.id,
                message: "appointment booked from waitlist",
            };
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(error) => {
            let status = match error.kind() {
                BookingErrorKind::NotFound => StatusCode::NOT_FOUND,
                BookingErrorKind::Conflict => StatusCode::CONFLICT,
                BookingErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(BookingOutcome::failed(&error))).into_response()
        }
    }
}

pub(crate) async fn overview_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
) -> Result<Json<DashboardOverview>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    Ok(Json(service.overview()?))
}

pub(crate) async fn top_matches_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
    Query(query): Query<TopMatchesQuery>,
) -> Result<Json<Vec<TopMatchView>>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    let matches = service.top_matches(query.limit)?;
    Ok(Json(matches.iter().map(TopMatchView::from).collect()))
}

pub(crate) async fn practitioners_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
) -> Result<Json<Vec<PractitionerAvailability>>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    Ok(Json(service.practitioner_availability()?))
}

pub(crate) async fn appointment_types_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
) -> Result<Json<Vec<AppointmentTypeDemand>>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    Ok(Json(service.appointment_type_demand()?))
}

pub(crate) async fn waitlist_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
    Query(query): Query<WaitlistQuery>,
) -> Result<Json<WaitlistListView>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    // Unknown status values fall back to the unfiltered list.
    let status = query.status.as_deref().and_then(WaitlistStatus::parse);
    let entries = service.waitlist(status)?;
    Ok(Json(WaitlistListView {
        count: entries.len(),
        entries: entries.iter().map(WaitlistEntryView::from).collect(),
    }))
}

pub(crate) async fn waitlist_entry_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
    Path(entry_id): Path<String>,
) -> Result<Json<WaitlistEntryView>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    let entry = service.entry(&WaitlistEntryId(entry_id))?;
    Ok(Json(WaitlistEntryView::from(&entry)))
}

pub(crate) async fn waitlist_stats_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
) -> Result<Json<WaitlistStats>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    Ok(Json(service.waitlist_stats()?))
}

pub(crate) async fn slots_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
    filter: Result<Query<SlotFilter>, QueryRejection>,
) -> Result<Json<SlotListView>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    let Query(filter) =
        filter.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
    let slots = service.slots(&filter)?;
    Ok(Json(SlotListView {
        count: slots.len(),
        slots: slots.iter().map(SlotRowView::from).collect(),
    }))
}

pub(crate) async fn slot_stats_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
) -> Result<Json<SlotStats>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    Ok(Json(service.slot_stats()?))
}

pub(crate) async fn slots_by_practitioner_handler<R, B>(
    State(service): State<Arc<WaitlistMatchingService<R, B>>>,
) -> Result<Json<Vec<PractitionerSlotsView>>, AppError>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    let rows = service.practitioner_availability()?;
    Ok(Json(rows.iter().map(PractitionerSlotsView::from).collect()))
}
