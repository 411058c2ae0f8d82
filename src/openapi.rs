use utoipa::OpenApi;

use crate::envelope::StatusResponse;
use crate::models::PageResult;
use crate::registry::{EntityDescriptor, GridColumn};
use crate::routes;

/// OpenAPI document of the grid routes.
///
/// ```rust,ignore
/// let doc = gridcrate::openapi::GridApiDoc::openapi();
/// ```
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::list_records,
        routes::create_record,
        routes::update_record,
        routes::delete_record,
        routes::edit_record,
        routes::column_model,
    ),
    components(schemas(PageResult, StatusResponse, GridColumn, EntityDescriptor)),
    tags((name = "grid", description = "Data grid list and edit endpoints"))
)]
pub struct GridApiDoc;
