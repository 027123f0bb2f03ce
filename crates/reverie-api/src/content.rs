use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use reverie_store::StoreError;
use reverie_types::forms::{
    AnnouncementForm, DreamerForm, EventForm, QuestForm, RoleForm, SponsorForm, StudentForm,
};
use reverie_types::models::{
    AcademyStudent, Announcement, Dreamer, Event, Quest, Role, Sponsor, SponsorshipGoal,
};

use crate::AppState;

fn store_failure(e: StoreError) -> StatusCode {
    error!("content action failed: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

// -- Public reads (always served from the installed snapshot) --

pub async fn list_quests(State(state): State<AppState>) -> Json<Vec<Quest>> {
    Json(state.content.snapshot().await.quests.clone())
}

pub async fn list_roles(State(state): State<AppState>) -> Json<Vec<Role>> {
    Json(state.content.snapshot().await.roles.clone())
}

pub async fn list_dreamers(State(state): State<AppState>) -> Json<Vec<Dreamer>> {
    Json(state.content.snapshot().await.dreamers.clone())
}

pub async fn list_sponsors(State(state): State<AppState>) -> Json<Vec<Sponsor>> {
    Json(state.content.snapshot().await.sponsors.clone())
}

pub async fn list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.content.snapshot().await.events.clone())
}

pub async fn list_students(State(state): State<AppState>) -> Json<Vec<AcademyStudent>> {
    Json(state.content.snapshot().await.students.clone())
}

pub async fn get_announcement(State(state): State<AppState>) -> Json<Option<Announcement>> {
    Json(state.content.snapshot().await.announcement.clone())
}

pub async fn list_sponsorships(State(state): State<AppState>) -> Json<Vec<SponsorshipGoal>> {
    Json(state.content.snapshot().await.sponsorships.clone())
}

// -- Admin mutations --

pub async fn create_quest(
    State(state): State<AppState>,
    Json(form): Json<QuestForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let quest = state.content.add_quest(&form).await.map_err(store_failure)?;
    Ok((StatusCode::CREATED, Json(quest)))
}

pub async fn update_quest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<QuestForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let quest = state.content.update_quest(&id, &form).await.map_err(store_failure)?;
    Ok(Json(quest))
}

pub async fn delete_quest(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    state.content.delete_quest(&id).await.map_err(store_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_role(
    State(state): State<AppState>,
    Json(form): Json<RoleForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let role = state.content.add_role(&form).await.map_err(store_failure)?;
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<RoleForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let role = state.content.update_role(&id, &form).await.map_err(store_failure)?;
    Ok(Json(role))
}

pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    state.content.delete_role(&id).await.map_err(store_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_dreamer(
    State(state): State<AppState>,
    Json(form): Json<DreamerForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let dreamer = state.content.add_dreamer(&form).await.map_err(store_failure)?;
    Ok((StatusCode::CREATED, Json(dreamer)))
}

pub async fn update_dreamer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<DreamerForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let dreamer = state.content.update_dreamer(&id, &form).await.map_err(store_failure)?;
    Ok(Json(dreamer))
}

pub async fn delete_dreamer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    state.content.delete_dreamer(&id).await.map_err(store_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_sponsor(
    State(state): State<AppState>,
    Json(form): Json<SponsorForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let sponsor = state.content.add_sponsor(&form).await.map_err(store_failure)?;
    Ok((StatusCode::CREATED, Json(sponsor)))
}

pub async fn update_sponsor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<SponsorForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let sponsor = state.content.update_sponsor(&id, &form).await.map_err(store_failure)?;
    Ok(Json(sponsor))
}

pub async fn delete_sponsor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    state.content.delete_sponsor(&id).await.map_err(store_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(form): Json<EventForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let event = state.content.add_event(&form).await.map_err(store_failure)?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<EventForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let event = state.content.update_event(&id, &form).await.map_err(store_failure)?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    state.content.delete_event(&id).await.map_err(store_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_student(
    State(state): State<AppState>,
    Json(form): Json<StudentForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let student = state.content.add_student(&form).await.map_err(store_failure)?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    state.content.delete_student(&id).await.map_err(store_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn put_announcement(
    State(state): State<AppState>,
    Json(form): Json<AnnouncementForm>,
) -> Result<StatusCode, StatusCode> {
    state.content.update_announcement(&form).await.map_err(store_failure)?;
    Ok(StatusCode::NO_CONTENT)
}
