//! Axum routes over a [`GridService`].
//!
//! | Method | Path                 | Operation                                  |
//! |--------|----------------------|--------------------------------------------|
//! | GET    | `/{entity}`          | list a page                                |
//! | POST   | `/{entity}`          | create from a JSON body                    |
//! | PUT    | `/{entity}/{id}`     | update from a JSON body                    |
//! | DELETE | `/{entity}/{id}`     | delete                                     |
//! | POST   | `/{entity}/edit`     | jqGrid `editurl` form post (`oper=...`)    |
//! | GET    | `/{entity}/columns`  | column model                               |
//!
//! Every response is HTTP 200 with a [`ResultEnvelope`] body.

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use hyper::HeaderMap;

use crate::envelope::ResultEnvelope;
use crate::fields::Fields;
use crate::models::{GridQuery, MutationRequest};
use crate::pagination::{calculate_content_range, page_offset};
use crate::service::GridService;

/// Build the grid router. Nest it wherever the grid's urls should live.
pub fn router(service: GridService) -> Router {
    Router::new()
        .route("/{entity}", get(list_records).post(create_record))
        .route("/{entity}/edit", post(edit_record))
        .route("/{entity}/columns", get(column_model))
        .route("/{entity}/{id}", put(update_record).delete(delete_record))
        .with_state(service)
}

#[utoipa::path(
    get,
    path = "/{entity}",
    params(
        ("entity" = String, Path, description = "Registered entity key"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("rows" = Option<u64>, Query, description = "Page size, 0 for all records"),
        ("sidx" = Option<String>, Query, description = "Sort column(s)"),
        ("sord" = Option<String>, Query, description = "Sort direction, asc or desc"),
        ("_search" = Option<bool>, Query, description = "Apply the filters parameter"),
        ("filters" = Option<String>, Query, description = "jqGrid search group as JSON"),
    ),
    responses(
        (status = 200, description = "Page of records, or an error envelope", body = crate::models::PageResult)
    )
)]
pub async fn list_records(
    State(service): State<GridService>,
    Path(entity): Path<String>,
    Query(mut query): Query<GridQuery>,
) -> (HeaderMap, ResultEnvelope) {
    query.entity = entity;
    let envelope = service.grid_list(&query).await;

    let headers = envelope.page_result().map_or_else(HeaderMap::new, |page| {
        let page_size = service.config().effective_page_size(query.rows);
        calculate_content_range(
            page_offset(page.page, page_size),
            page.rows.len() as u64,
            page.total_records,
            &query.entity,
        )
    });
    (headers, envelope)
}

#[utoipa::path(
    post,
    path = "/{entity}",
    params(("entity" = String, Path, description = "Registered entity key")),
    request_body(content = Object, description = "Field values, plus `parent` for tree entities"),
    responses(
        (status = 200, description = "Outcome with the new id", body = crate::envelope::StatusResponse)
    )
)]
pub async fn create_record(
    State(service): State<GridService>,
    Path(entity): Path<String>,
    Json(fields): Json<Fields>,
) -> ResultEnvelope {
    service
        .create_record(&MutationRequest::from_fields(entity, fields))
        .await
}

#[utoipa::path(
    put,
    path = "/{entity}/{id}",
    params(
        ("entity" = String, Path, description = "Registered entity key"),
        ("id" = i32, Path, description = "Record id"),
    ),
    request_body(content = Object, description = "Fields to change"),
    responses(
        (status = 200, description = "Outcome of the update", body = crate::envelope::StatusResponse)
    )
)]
pub async fn update_record(
    State(service): State<GridService>,
    Path((entity, id)): Path<(String, String)>,
    Json(fields): Json<Fields>,
) -> ResultEnvelope {
    let request = MutationRequest::from_fields(entity, fields).with_id(id);
    service.update_record(&request).await
}

#[utoipa::path(
    delete,
    path = "/{entity}/{id}",
    params(
        ("entity" = String, Path, description = "Registered entity key"),
        ("id" = i32, Path, description = "Record id"),
    ),
    responses(
        (status = 200, description = "Outcome of the delete", body = crate::envelope::StatusResponse)
    )
)]
pub async fn delete_record(
    State(service): State<GridService>,
    Path((entity, id)): Path<(String, String)>,
) -> ResultEnvelope {
    let request = MutationRequest::from_fields(entity, Fields::new()).with_id(id);
    service.delete_record(&request).await
}

#[utoipa::path(
    post,
    path = "/{entity}/edit",
    params(("entity" = String, Path, description = "Registered entity key")),
    request_body(
        content = Object,
        content_type = "application/x-www-form-urlencoded",
        description = "jqGrid edit form: `oper` (add, edit, del), `id` and the field values"
    ),
    responses(
        (status = 200, description = "Outcome of the operation", body = crate::envelope::StatusResponse)
    )
)]
pub async fn edit_record(
    State(service): State<GridService>,
    Path(entity): Path<String>,
    Form(fields): Form<Fields>,
) -> ResultEnvelope {
    service
        .edit_record(&MutationRequest::from_fields(entity, fields))
        .await
}

#[utoipa::path(
    get,
    path = "/{entity}/columns",
    params(("entity" = String, Path, description = "Registered entity key")),
    responses(
        (status = 200, description = "Column model of the entity", body = crate::envelope::StatusResponse)
    )
)]
pub async fn column_model(
    State(service): State<GridService>,
    Path(entity): Path<String>,
) -> ResultEnvelope {
    service.columns(&entity)
}
