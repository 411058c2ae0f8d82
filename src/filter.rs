//! # Filtering
//!
//! Grid filters come in two encodings, both parsed into a [`FilterGroup`]:
//!
//! ```rust,ignore
//! // Flat map: equality by default, comparison suffixes, arrays for IN
//! {"status": "active", "price_gte": 10, "price_lt": 100, "id": [1, 2, 3]}
//!
//! // jqGrid advanced search
//! {"groupOp": "OR", "rules": [
//!     {"field": "name", "op": "bw", "data": "Desk"},
//!     {"field": "price", "op": "le", "data": "20"}
//! ]}
//! ```
//!
//! [`build_condition`] turns the group into a Sea-ORM [`Condition`] for one resource,
//! converting every value to the column's type. Unknown columns, unknown operators and
//! values that do not convert are query errors, never silently dropped.

use sea_orm::{ColumnTrait, Condition, Value, sea_query::SimpleExpr};
use serde::Deserialize;
use serde_json::Value as Json;

use crate::errors::GridError;
use crate::fields::to_db_value;
use crate::traits::GridResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    IsNull,
    NotNull,
    BeginsWith,
    EndsWith,
    Contains,
}

impl FilterOp {
    /// Parse a jqGrid operator code (`eq`, `ne`, `lt`, `le`, `gt`, `ge`, `in`, `nu`, `nn`,
    /// `bw`, `ew`, `cn`).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let op = match code {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "lt" => Self::Lt,
            "le" => Self::Le,
            "gt" => Self::Gt,
            "ge" => Self::Ge,
            "in" => Self::In,
            "nu" => Self::IsNull,
            "nn" => Self::NotNull,
            "bw" => Self::BeginsWith,
            "ew" => Self::EndsWith,
            "cn" => Self::Contains,
            _ => return None,
        };
        Some(op)
    }

    /// Split a flat filter key into field name and operator, e.g. `price_gte`
    fn from_suffix(key: &str) -> (&str, Self) {
        const SUFFIXES: [(&str, FilterOp); 5] = [
            ("_gte", FilterOp::Ge),
            ("_lte", FilterOp::Le),
            ("_gt", FilterOp::Gt),
            ("_lt", FilterOp::Lt),
            ("_neq", FilterOp::Ne),
        ];
        SUFFIXES
            .iter()
            .find_map(|(suffix, op)| key.strip_suffix(suffix).map(|field| (field, *op)))
            .unwrap_or((key, Self::Eq))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    pub field: String,
    pub op: FilterOp,
    pub value: Json,
}

impl FilterRule {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Json>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupOp {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGroup {
    pub group_op: GroupOp,
    pub rules: Vec<FilterRule>,
    pub groups: Vec<FilterGroup>,
}

#[derive(Deserialize)]
struct RawGroup {
    #[serde(rename = "groupOp", default)]
    group_op: Option<String>,
    #[serde(default)]
    rules: Vec<RawRule>,
    #[serde(default)]
    groups: Vec<RawGroup>,
}

#[derive(Deserialize)]
struct RawRule {
    field: String,
    op: String,
    #[serde(default)]
    data: Json,
}

impl TryFrom<RawGroup> for FilterGroup {
    type Error = GridError;

    fn try_from(raw: RawGroup) -> Result<Self, Self::Error> {
        let group_op = match raw.group_op.as_deref().map(str::to_ascii_uppercase) {
            None => GroupOp::And,
            Some(op) if op == "AND" => GroupOp::And,
            Some(op) if op == "OR" => GroupOp::Or,
            Some(op) => return Err(GridError::query(format!("unknown group operator '{op}'"))),
        };
        let rules = raw
            .rules
            .into_iter()
            .map(|rule| {
                FilterOp::from_code(&rule.op)
                    .map(|op| FilterRule::new(rule.field, op, rule.data))
                    .ok_or_else(|| GridError::query(format!("unknown operator '{}'", rule.op)))
            })
            .collect::<Result<_, _>>()?;
        let groups = raw
            .groups
            .into_iter()
            .map(Self::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            group_op,
            rules,
            groups,
        })
    }
}

impl FilterGroup {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.groups.iter().all(Self::is_empty)
    }

    #[must_use]
    pub fn with_rule(mut self, rule: FilterRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parse a flat `{field: value}` map. Blank string values are skipped, which is what an
    /// empty search toolbar cell sends.
    pub fn from_flat<'a>(entries: impl IntoIterator<Item = (&'a String, &'a Json)>) -> Self {
        let mut group = Self::default();
        for (key, value) in entries {
            if matches!(value, Json::String(text) if text.trim().is_empty()) {
                continue;
            }
            let (field, op) = FilterOp::from_suffix(key);
            let op = if value.is_array() && op == FilterOp::Eq {
                FilterOp::In
            } else {
                op
            };
            group.rules.push(FilterRule::new(field, op, value.clone()));
        }
        group
    }

    /// Parse a jqGrid search group, given as a JSON string or an already decoded object.
    pub fn from_jqgrid(raw: &Json) -> Result<Self, GridError> {
        let decoded = match raw {
            Json::Null => return Ok(Self::default()),
            Json::String(text) if text.trim().is_empty() => return Ok(Self::default()),
            Json::String(text) => serde_json::from_str::<RawGroup>(text),
            other => serde_json::from_value::<RawGroup>(other.clone()),
        }
        .map_err(|e| GridError::query(format!("malformed filters: {e}")))?;
        Self::try_from(decoded)
    }
}

/// Build the Sea-ORM condition for `group` against the filterable columns of `R`.
pub fn build_condition<R: GridResource>(group: &FilterGroup) -> Result<Condition, GridError> {
    let columns = R::filterable_columns();
    build_group::<R>(group, &columns)
}

fn build_group<R: GridResource>(
    group: &FilterGroup,
    columns: &[(&'static str, R::Column)],
) -> Result<Condition, GridError> {
    let mut condition = match group.group_op {
        GroupOp::And => Condition::all(),
        GroupOp::Or => Condition::any(),
    };
    for rule in &group.rules {
        let column = columns
            .iter()
            .find(|(name, _)| *name == rule.field)
            .map(|(_, column)| *column)
            .ok_or_else(|| GridError::query(format!("cannot filter on '{}'", rule.field)))?;
        condition = condition.add(build_rule(&column, rule)?);
    }
    for nested in &group.groups {
        if !nested.is_empty() {
            condition = condition.add(build_group::<R>(nested, columns)?);
        }
    }
    Ok(condition)
}

fn build_rule<C: ColumnTrait>(column: &C, rule: &FilterRule) -> Result<SimpleExpr, GridError> {
    let typed = |value: &Json| {
        to_db_value(column, value)
            .map_err(|reason| GridError::query(format!("filter on '{}': {reason}", rule.field)))
    };
    let pattern = || match &rule.value {
        Json::String(text) => Ok(text.clone()),
        Json::Number(number) => Ok(number.to_string()),
        other => Err(GridError::query(format!(
            "filter on '{}': expected text, got {other}",
            rule.field
        ))),
    };

    let expr = match rule.op {
        FilterOp::Eq => match &rule.value {
            Json::Null => column.is_null(),
            value => column.eq(typed(value)?),
        },
        FilterOp::Ne => match &rule.value {
            Json::Null => column.is_not_null(),
            value => column.ne(typed(value)?),
        },
        FilterOp::Lt => column.lt(typed(&rule.value)?),
        FilterOp::Le => column.lte(typed(&rule.value)?),
        FilterOp::Gt => column.gt(typed(&rule.value)?),
        FilterOp::Ge => column.gte(typed(&rule.value)?),
        FilterOp::In => {
            let values = in_list(&rule.value)
                .iter()
                .map(typed)
                .collect::<Result<Vec<Value>, _>>()?;
            column.is_in(values)
        }
        FilterOp::IsNull => column.is_null(),
        FilterOp::NotNull => column.is_not_null(),
        FilterOp::BeginsWith => column.starts_with(pattern()?),
        FilterOp::EndsWith => column.ends_with(pattern()?),
        FilterOp::Contains => column.contains(pattern()?),
    };
    Ok(expr)
}

/// Items of an IN filter: a JSON array or a comma-separated string
fn in_list(value: &Json) -> Vec<Json> {
    match value {
        Json::Array(items) => items.clone(),
        Json::String(text) => text
            .split(',')
            .map(|item| Json::String(item.trim().to_string()))
            .collect(),
        other => vec![other.clone()],
    }
}
