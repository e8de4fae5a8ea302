use crate::backup::{backup_file_name, export, restore};
use crate::errors::AppError;
use crate::filters::{filter_and_sort, CycleFilter, SortKey};
use crate::models::{
    Category, CategoryRequest, ImportResponse, ListQuery, Reminder, Subscription, SubscriptionForm,
    SummaryResponse, ThemeBody, DEFAULT_CURRENCY,
};
use crate::reminders::due_reminders;
use crate::state::AppState;
use crate::stats::build_summary;
use crate::storage::generate_id;
use crate::ui::{render_index, SERVICE_WORKER_JS};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::{Local, Utc};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    let summary = build_summary(&store.get_all().await, &store.categories().await);
    Html(render_index(&summary, store.theme().await))
}

pub async fn service_worker() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], SERVICE_WORKER_JS)
}

pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Subscription>> {
    let all = state.store.lock().await.get_all().await;
    let filter = CycleFilter::parse(query.cycle.as_deref());
    let sort = SortKey::parse(query.sort.as_deref());
    Json(filter_and_sort(&all, filter, sort))
}

pub async fn save_subscription(
    State(state): State<AppState>,
    payload: Result<Json<SubscriptionForm>, JsonRejection>,
) -> Result<Json<Subscription>, AppError> {
    let Json(form) = payload?;
    let sub = validate(form)?;
    state.store.lock().await.save(&sub).await?;
    info!(id = %sub.id, "saved subscription");
    Ok(Json(sub))
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.lock().await.delete(&id).await?;
    info!(%id, "deleted subscription");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let store = state.store.lock().await;
    Json(build_summary(&store.get_all().await, &store.categories().await))
}

pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.store.lock().await.categories().await)
}

pub async fn add_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Json<Vec<Category>>, AppError> {
    let Json(payload) = payload?;
    let categories = state
        .store
        .lock()
        .await
        .add_category(&payload.name, &payload.color)
        .await?;
    Ok(Json(categories))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.store.lock().await.delete_category(&name).await?;
    Ok(Json(categories))
}

/// Evaluated against today's date on every call.
pub async fn get_reminders(State(state): State<AppState>) -> Json<Vec<Reminder>> {
    let subscriptions = state.store.lock().await.get_all().await;
    Json(due_reminders(&subscriptions))
}

pub async fn export_backup(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let document = export(&*state.store.lock().await, Utc::now()).await;
    let body = serde_json::to_string_pretty(&document).map_err(AppError::internal)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        backup_file_name(Local::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn import_backup(State(state): State<AppState>, body: String) -> Result<Json<ImportResponse>, AppError> {
    let mut store = state.store.lock().await;
    Ok(Json(restore(&mut store, &body).await?))
}

pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeBody> {
    Json(ThemeBody {
        theme: state.store.lock().await.theme().await,
    })
}

pub async fn set_theme(
    State(state): State<AppState>,
    payload: Result<Json<ThemeBody>, JsonRejection>,
) -> Result<Json<ThemeBody>, AppError> {
    let Json(payload) = payload?;
    state.store.lock().await.set_theme(payload.theme).await?;
    Ok(Json(payload))
}

fn validate(form: SubscriptionForm) -> Result<Subscription, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    if !form.price.is_finite() || form.price < 0.0 {
        return Err(AppError::bad_request("price must be a non-negative number"));
    }
    let id = form
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generate_id);
    let currency = form
        .currency
        .map(|currency| currency.trim().to_uppercase())
        .filter(|currency| !currency.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Ok(Subscription {
        id,
        name: name.to_string(),
        price: form.price,
        currency,
        cycle: form.cycle,
        date: form.date,
        category: form.category,
    })
}
