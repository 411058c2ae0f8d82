//! Paginated list queries.

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::errors::GridError;
use crate::fields::format_row;
use crate::filter::build_condition;
use crate::models::{PageRequest, PageResult};
use crate::pagination::{page_offset, total_pages};
use crate::sort::resolve_sorting;
use crate::traits::GridResource;

/// Run a list request against `R`.
///
/// The count uses the same filters as the page, so `total_records` and `total_pages`
/// describe the filtered set. A page past the end comes back empty with its number kept.
pub async fn list_page<R, C>(db: &C, request: &PageRequest) -> Result<PageResult, GridError>
where
    R: GridResource,
    C: ConnectionTrait,
{
    let condition = build_condition::<R>(&request.filters)?;

    let total_records = R::Entity::find()
        .filter(condition.clone())
        .count(db)
        .await?;

    let mut query = R::Entity::find().filter(condition);
    for (column, order) in resolve_sorting::<R>(&request.sort) {
        query = query.order_by(column, order);
    }
    if request.page_size > 0 {
        query = query
            .offset(page_offset(request.page, request.page_size))
            .limit(request.page_size);
    }

    let rows = query
        .all(db)
        .await?
        .iter()
        .map(format_row::<R>)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        entity = R::ENTITY_KEY,
        page = request.page,
        page_size = request.page_size,
        total_records,
        returned = rows.len(),
        "Listed grid page"
    );

    Ok(PageResult {
        page: request.page,
        total_pages: total_pages(total_records, request.page_size),
        total_records,
        rows,
    })
}
