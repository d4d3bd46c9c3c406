use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::domain::{TestDraft, TestId};
use super::import::CsvTestImporter;
use super::report::{build_tier_report, export};
use super::repository::TestRepository;

/// Shared state for the HTTP surface. The repository itself is
/// single-threaded; the mutex is the required exclusion boundary around the
/// CRUD operations and the section-set maintenance they perform.
pub struct TriageState {
    repository: Mutex<TestRepository>,
}

impl TriageState {
    pub fn new(repository: TestRepository) -> Self {
        Self {
            repository: Mutex::new(repository),
        }
    }

    fn repository(&self) -> MutexGuard<'_, TestRepository> {
        // The store stays consistent even if a handler panicked mid-request.
        self.repository
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Deserialize)]
pub struct SectionQuery {
    pub section: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub csv: String,
    #[serde(default)]
    pub replace: bool,
}

/// Router builder exposing the triage engine: CRUD, ranked listings, tier
/// reports, CSV import/export.
pub fn triage_router(state: Arc<TriageState>) -> Router {
    Router::new()
        .route(
            "/api/v1/tests",
            post(add_test_handler)
                .get(list_tests_handler)
                .delete(delete_all_handler),
        )
        .route("/api/v1/tests/lookup", get(lookup_handler))
        .route(
            "/api/v1/tests/:test_id",
            get(get_test_handler)
                .put(update_test_handler)
                .delete(delete_test_handler),
        )
        .route("/api/v1/report", get(report_handler))
        .route("/api/v1/export.csv", get(export_handler))
        .route("/api/v1/import", post(import_handler))
        .with_state(state)
}

pub(crate) async fn add_test_handler(
    State(state): State<Arc<TriageState>>,
    Json(draft): Json<TestDraft>,
) -> Response {
    let record = state.repository().add_test(draft);
    (StatusCode::CREATED, Json(record)).into_response()
}

pub(crate) async fn list_tests_handler(
    State(state): State<Arc<TriageState>>,
    Query(query): Query<SectionQuery>,
) -> Response {
    let tests = state.repository().get_sorted(query.section.as_deref());
    Json(tests).into_response()
}

pub(crate) async fn get_test_handler(
    State(state): State<Arc<TriageState>>,
    Path(test_id): Path<String>,
) -> Response {
    let id = TestId(test_id);
    match state.repository().find_by_id(&id) {
        Some(record) => Json(record.clone()).into_response(),
        None => not_found(&id),
    }
}

pub(crate) async fn lookup_handler(
    State(state): State<Arc<TriageState>>,
    Query(query): Query<NameQuery>,
) -> Response {
    match state.repository().find_id_by_name(&query.name) {
        Some(id) => Json(json!({ "id": id })).into_response(),
        None => {
            let payload = json!({ "error": "no test with that name" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn update_test_handler(
    State(state): State<Arc<TriageState>>,
    Path(test_id): Path<String>,
    Json(draft): Json<TestDraft>,
) -> Response {
    let id = TestId(test_id);
    match state.repository().update_test(&id, draft) {
        Some(record) => Json(record).into_response(),
        None => not_found(&id),
    }
}

pub(crate) async fn delete_test_handler(
    State(state): State<Arc<TriageState>>,
    Path(test_id): Path<String>,
) -> Response {
    let id = TestId(test_id);
    if state.repository().delete_one(&id) {
        Json(json!({ "deleted": true })).into_response()
    } else {
        not_found(&id)
    }
}

pub(crate) async fn delete_all_handler(State(state): State<Arc<TriageState>>) -> Response {
    let purged = state.repository().delete_all();
    Json(json!({ "purged": purged })).into_response()
}

pub(crate) async fn report_handler(
    State(state): State<Arc<TriageState>>,
    Query(query): Query<SectionQuery>,
) -> Response {
    let repository = state.repository();
    let section = query.section.as_deref();
    let tests = repository.get_sorted(section);
    let tiers = repository.priority_tiers(section);
    let report = build_tier_report(&tests, &tiers, repository.catalog());
    Json(report).into_response()
}

pub(crate) async fn export_handler(
    State(state): State<Arc<TriageState>>,
    Query(query): Query<SectionQuery>,
) -> Response {
    let repository = state.repository();
    let tests = repository.get_sorted(query.section.as_deref());
    match export::to_csv(&tests, repository.catalog()) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv")],
            csv,
        )
            .into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn import_handler(
    State(state): State<Arc<TriageState>>,
    Json(request): Json<ImportRequest>,
) -> Response {
    let mut repository = state.repository();
    let reader = Cursor::new(request.csv.into_bytes());
    match CsvTestImporter::from_reader(reader, &mut repository, request.replace) {
        Ok(count) => Json(json!({ "imported": count })).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}

fn not_found(id: &TestId) -> Response {
    let payload = json!({
        "error": "test not found",
        "test_id": id,
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::triage::catalog::{FactorCatalog, FactorKey, GATE_YES};

    fn state() -> Arc<TriageState> {
        let repository = TestRepository::new(Arc::new(FactorCatalog::standard()));
        Arc::new(TriageState::new(repository))
    }

    fn draft(name: &str) -> TestDraft {
        let mut scores = BTreeMap::new();
        scores.insert(FactorKey::automation_gate(), GATE_YES);
        scores.insert(FactorKey::new("regression_frequency"), 5);
        TestDraft {
            name: name.to_string(),
            scores,
            ..TestDraft::default()
        }
    }

    #[tokio::test]
    async fn add_then_fetch_round_trips() {
        let state = state();

        let response = add_test_handler(State(state.clone()), Json(draft("smoke"))).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = get_test_handler(State(state.clone()), Path("1".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get_test_handler(State(state), Path("99".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_all_reports_the_noop() {
        let state = state();

        let response = delete_all_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        add_test_handler(State(state.clone()), Json(draft("one"))).await;
        let response = delete_all_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn import_reports_the_processed_count() {
        let state = state();
        let request = ImportRequest {
            csv: "Test Name,Regression Frequency\nalpha,5\nbeta,oops\n".to_string(),
            replace: false,
        };

        let response = import_handler(State(state.clone()), Json(request)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = list_tests_handler(
            State(state),
            Query(SectionQuery { section: None }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
