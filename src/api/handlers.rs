//! Request handlers. Each handler works on one immutable data snapshot.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use validator::Validate;

use super::AppState;
use crate::core::charts::{
    build_multi_series, build_single_series, resolve_window, shared_date_range, DateWindow,
};
use crate::core::data::{default_test_name, get_results_for_test, get_unique_test_names};
use crate::error::{LabError, Result};
use crate::models::{AllResults, GraphConfig, GraphType};
use crate::ui::ResultsTable;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MultiChartQuery {
    /// Comma separated test names.
    #[serde(default)]
    pub tests: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddGraphsRequest {
    #[serde(rename = "type")]
    pub graph_type: GraphType,
    #[validate(length(min = 1, message = "select at least one test"))]
    pub test_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Deserialize)]
pub struct MoveGraphRequest {
    pub index: usize,
    pub direction: MoveDirection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSelectionRequest {
    pub test_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CommitSelectionRequest {
    #[serde(rename = "type")]
    pub graph_type: GraphType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardView<'a> {
    graphs: &'a [GraphConfig],
    rows: Vec<Vec<&'a str>>,
    date_range: Option<DateWindow>,
}

fn ensure_known_test(data: &AllResults, name: &str) -> Result<()> {
    if data.find_test(name).is_none() && get_results_for_test(data, name).is_empty() {
        return Err(LabError::TestNotFound(name.to_string()));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn get_lab_data(state: web::Data<AppState>) -> Result<HttpResponse> {
    let data = state.context.snapshot().await;
    let status = state.context.status().await;
    Ok(HttpResponse::Ok().json(json!({
        "tests": data.tests,
        "results": data.results,
        "isDemo": status.is_demo(),
        "status": status,
    })))
}

#[instrument(skip(state))]
pub async fn reload_lab_data(state: web::Data<AppState>) -> Result<HttpResponse> {
    let status = state.context.reload().await;
    Ok(HttpResponse::Ok().json(status))
}

#[instrument(skip(state))]
pub async fn get_tests(state: web::Data<AppState>) -> Result<HttpResponse> {
    let data = state.context.snapshot().await;
    Ok(HttpResponse::Ok().json(json!({
        "tests": get_unique_test_names(&data),
        "defaultTest": default_test_name(&data),
    })))
}

#[instrument(skip(state))]
pub async fn get_categories(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.context.test_categories().await))
}

#[instrument(skip(state))]
pub async fn get_test_results(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let data = state.context.snapshot().await;
    let table = ResultsTable::build(&data, &path.into_inner())?;
    Ok(HttpResponse::Ok().json(table))
}

/// Single-test series; `null` when nothing valid falls in the window.
#[instrument(skip(state))]
pub async fn get_test_chart(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse> {
    let name = path.into_inner();
    let data = state.context.snapshot().await;
    ensure_known_test(&data, &name)?;

    let window = resolve_window(
        &data,
        std::slice::from_ref(&name),
        query.start.as_deref(),
        query.end.as_deref(),
    )?;
    Ok(HttpResponse::Ok().json(build_single_series(&data, &name, window)))
}

#[instrument(skip(state))]
pub async fn get_multi_chart(
    state: web::Data<AppState>,
    query: web::Query<MultiChartQuery>,
) -> Result<HttpResponse> {
    let names: Vec<String> = query
        .tests
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();
    if names.is_empty() {
        return Err(LabError::EmptySelection);
    }

    let data = state.context.snapshot().await;
    let window = resolve_window(&data, &names, query.start.as_deref(), query.end.as_deref())?;
    Ok(HttpResponse::Ok().json(build_multi_series(&data, &names, window)))
}

async fn dashboard_response(state: &AppState) -> HttpResponse {
    let data = state.context.snapshot().await;
    let layout = state.dashboard.lock().await;
    let view = DashboardView {
        graphs: layout.graphs(),
        rows: layout
            .layout_rows(state.graphs_per_row)
            .into_iter()
            .map(|row| row.into_iter().map(|graph| graph.id.as_str()).collect())
            .collect(),
        date_range: shared_date_range(&data, &layout.test_names()),
    };
    HttpResponse::Ok().json(view)
}

#[instrument(skip(state))]
pub async fn get_dashboard(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(dashboard_response(&state).await)
}

#[instrument(skip(state))]
pub async fn add_graphs(
    state: web::Data<AppState>,
    body: web::Json<AddGraphsRequest>,
) -> Result<HttpResponse> {
    body.validate()
        .map_err(|e| LabError::InvalidRequest(e.to_string()))?;

    let ids = state
        .dashboard
        .lock()
        .await
        .add(body.graph_type, &body.test_names)?;
    info!("Added {} {:?} graph(s)", ids.len(), body.graph_type);
    Ok(HttpResponse::Created().json(json!({ "ids": ids })))
}

#[instrument(skip(state))]
pub async fn remove_graph(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if !state.dashboard.lock().await.remove(&id) {
        return Err(LabError::GraphNotFound(id));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(state))]
pub async fn toggle_graph(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let expanded = state.dashboard.lock().await.toggle_expanded(&id)?;
    Ok(HttpResponse::Ok().json(json!({ "id": id, "expanded": expanded })))
}

/// Moves at the list ends are accepted and leave the order unchanged.
#[instrument(skip(state))]
pub async fn move_graph(
    state: web::Data<AppState>,
    body: web::Json<MoveGraphRequest>,
) -> Result<HttpResponse> {
    {
        let mut layout = state.dashboard.lock().await;
        if body.index >= layout.graphs().len() {
            return Err(LabError::InvalidRequest(format!(
                "no graph at index {}",
                body.index
            )));
        }
        match body.direction {
            MoveDirection::Up => layout.move_up(body.index),
            MoveDirection::Down => layout.move_down(body.index),
        };
    }
    Ok(dashboard_response(&state).await)
}

#[instrument(skip(state))]
pub async fn get_selection(state: web::Data<AppState>) -> Result<HttpResponse> {
    let selection = state.selection.lock().await;
    Ok(HttpResponse::Ok().json(json!({ "testNames": selection.names() })))
}

#[instrument(skip(state))]
pub async fn toggle_selection(
    state: web::Data<AppState>,
    body: web::Json<ToggleSelectionRequest>,
) -> Result<HttpResponse> {
    let data = state.context.snapshot().await;
    ensure_known_test(&data, &body.test_name)?;

    let mut selection = state.selection.lock().await;
    selection.toggle(&body.test_name);
    Ok(HttpResponse::Ok().json(json!({
        "testNames": selection.names(),
        "selected": selection.contains(&body.test_name),
    })))
}

/// Turns the checklist into graphs and clears it.
#[instrument(skip(state))]
pub async fn commit_selection(
    state: web::Data<AppState>,
    body: web::Json<CommitSelectionRequest>,
) -> Result<HttpResponse> {
    let mut layout = state.dashboard.lock().await;
    let ids = state
        .selection
        .lock()
        .await
        .commit(&mut layout, body.graph_type)?;
    info!("Added {} {:?} graph(s) from selection", ids.len(), body.graph_type);
    Ok(HttpResponse::Created().json(json!({ "ids": ids })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_graphs_request_validation() {
        let request: AddGraphsRequest =
            serde_json::from_value(json!({ "type": "multi", "testNames": [] })).unwrap();
        assert!(request.validate().is_err());

        let request: AddGraphsRequest =
            serde_json::from_value(json!({ "type": "single", "testNames": ["Glucose"] })).unwrap();
        assert!(request.validate().is_ok());
    }
}
