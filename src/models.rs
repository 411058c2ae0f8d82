use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use utoipa::ToSchema;

use crate::RecordId;
use crate::config::GridConfig;
use crate::errors::GridError;
use crate::fields::{Fields, parse_record_id};
use crate::filter::{FilterGroup, FilterOp, FilterRule};
use crate::sort::{SortSpec, parse_sorting};

/// Request keys jqGrid sends that are neither paging parameters nor filters
const RESERVED_KEYS: [&str; 4] = ["nd", "npage", "totalrows", "oper"];

/// List parameters as jqGrid sends them.
///
/// - `page`, `rows`: 1-based page number and page size (`rows=0` means everything)
/// - `sidx`, `sord`: sort column(s) and direction, e.g. `sidx=name asc, price&sord=desc`
/// - `_search`, `filters`: advanced search group, e.g.
///   `{"groupOp":"AND","rules":[{"field":"price","op":"ge","data":"10"}]}`
/// - `searchField`, `searchOper`, `searchString`: the single-field search dialog
///
/// Every other key is read as a flat filter (`{"name": "chair", "price_gte": 10}`).
/// Numbers and booleans arrive as strings from query strings, so both forms are accepted.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridQuery {
    #[serde(default)]
    pub entity: String,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub page: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub rows: Option<u64>,
    #[serde(default)]
    pub sidx: Option<String>,
    #[serde(default)]
    pub sord: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(rename = "_search")]
    pub search: Option<bool>,
    #[serde(default)]
    pub filters: Option<Json>,
    #[serde(default, rename = "searchField")]
    pub search_field: Option<String>,
    #[serde(default, rename = "searchOper")]
    pub search_oper: Option<String>,
    #[serde(default, rename = "searchString")]
    pub search_string: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl GridQuery {
    #[must_use]
    pub fn for_entity(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    /// Resolve paging defaults and parse filters and sorting.
    pub fn to_page_request(&self, config: &GridConfig) -> Result<PageRequest, GridError> {
        let entity_key = self.entity.trim();
        if entity_key.is_empty() {
            return Err(GridError::invalid("missing 'entity'"));
        }

        let flat = self
            .extra
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.iter().any(|reserved| *reserved == key.as_str()));
        let mut filters = FilterGroup::from_flat(flat);
        if self.search != Some(false) {
            if let Some(rule) = self.single_search()? {
                filters.rules.push(rule);
            }
            if let Some(raw) = &self.filters {
                filters.groups.push(FilterGroup::from_jqgrid(raw)?);
            }
        }

        Ok(PageRequest {
            entity_key: entity_key.to_string(),
            filters,
            sort: parse_sorting(self.sidx.as_deref(), self.sord.as_deref()),
            page: self.page.unwrap_or(1).max(1),
            page_size: config.effective_page_size(self.rows),
        })
    }

    /// Rule posted by the single-field search dialog, if any
    fn single_search(&self) -> Result<Option<FilterRule>, GridError> {
        let Some(field) = self.search_field.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if field.is_empty() {
            return Ok(None);
        }
        let code = self.search_oper.as_deref().unwrap_or("eq");
        let op = FilterOp::from_code(code)
            .ok_or_else(|| GridError::query(format!("unknown operator '{code}'")))?;
        let data = self.search_string.clone().unwrap_or_default();
        Ok(Some(FilterRule::new(field, op, data)))
    }
}

/// A fully resolved list request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub entity_key: String,
    pub filters: FilterGroup,
    pub sort: Vec<SortSpec>,
    /// 1-based
    pub page: u64,
    /// `0` = unbounded
    pub page_size: u64,
}

impl PageRequest {
    #[must_use]
    pub fn new(entity_key: impl Into<String>, page: u64, page_size: u64) -> Self {
        Self {
            entity_key: entity_key.into(),
            filters: FilterGroup::default(),
            sort: Vec::new(),
            page: page.max(1),
            page_size,
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterGroup) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Vec<SortSpec>) -> Self {
        self.sort = sort;
        self
    }
}

/// One page of grid rows, serialized the way jqGrid's JSON reader expects it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PageResult {
    /// Current page (1-based)
    pub page: u64,
    /// Number of pages, never below 1
    #[serde(rename = "total")]
    pub total_pages: u64,
    /// Number of records matching the filters
    #[serde(rename = "records")]
    pub total_records: u64,
    /// Records of this page, reduced to the grid columns
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Json>,
}

/// Create, update or delete request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationRequest {
    pub entity: String,
    /// Raw id as sent, either a number or a numeric string
    pub id: Option<Json>,
    /// jqGrid edit operation (`add`, `edit`, `del`) when posted to the edit url
    pub oper: Option<String>,
    pub fields: Fields,
}

impl MutationRequest {
    /// Split a request mapping into its control keys (`entity`, `id`, `oper`) and fields.
    #[must_use]
    pub fn from_map(mut data: Fields) -> Self {
        let entity = match data.remove("entity") {
            Some(Json::String(entity)) => entity,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let id = data.remove("id");
        let oper = data
            .remove("oper")
            .and_then(|oper| oper.as_str().map(str::to_string));
        Self {
            entity,
            id,
            oper,
            fields: data,
        }
    }

    /// Same as [`Self::from_map`], but the entity comes from the route.
    #[must_use]
    pub fn from_fields(entity: impl Into<String>, fields: Fields) -> Self {
        Self {
            entity: entity.into(),
            ..Self::from_map(fields)
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<Json>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn entity_key(&self) -> Result<&str, GridError> {
        let key = self.entity.trim();
        if key.is_empty() {
            Err(GridError::invalid("missing 'entity'"))
        } else {
            Ok(key)
        }
    }

    pub fn record_id(&self) -> Result<RecordId, GridError> {
        match &self.id {
            None => Err(GridError::invalid("missing 'id'")),
            Some(raw) => parse_record_id(raw)
                .ok_or_else(|| GridError::invalid(format!("'{raw}' is not a record id"))),
        }
    }
}
