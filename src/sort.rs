use sea_orm::{IdenStatic, Order};

use crate::traits::GridResource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything but `desc` (in any case) sorts ascending
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    #[must_use]
    pub const fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Parse jqGrid's `sidx` and `sord` parameters.
///
/// With multi-column sorting jqGrid sends `sidx=name asc, price` and `sord=desc`: every
/// column except the last carries its own direction and `sord` applies to the last one.
#[must_use]
pub fn parse_sorting(sidx: Option<&str>, sord: Option<&str>) -> Vec<SortSpec> {
    let Some(sidx) = sidx.map(str::trim).filter(|sidx| !sidx.is_empty()) else {
        return Vec::new();
    };
    let last_direction = sord.map(SortDirection::parse).unwrap_or_default();
    let parts: Vec<&str> = sidx.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    let count = parts.len();

    parts
        .into_iter()
        .enumerate()
        .map(|(index, part)| {
            let mut words = part.split_whitespace();
            let field = words.next().unwrap_or_default();
            let direction = match words.next() {
                Some(direction) => SortDirection::parse(direction),
                None if index + 1 == count => last_direction,
                None => SortDirection::Asc,
            };
            SortSpec::new(field, direction)
        })
        .collect()
}

/// Map sort specs onto the sortable columns of `R`.
///
/// Unknown columns are skipped. The id is appended ascending unless already present,
/// which keeps paging stable when the sort columns have duplicates.
#[must_use]
pub fn resolve_sorting<R: GridResource>(specs: &[SortSpec]) -> Vec<(R::Column, Order)> {
    let sortable = R::sortable_columns();
    let mut resolved: Vec<(R::Column, Order)> = specs
        .iter()
        .filter_map(|spec| {
            sortable
                .iter()
                .find(|(name, _)| *name == spec.field)
                .map(|(_, column)| (*column, spec.direction.order()))
        })
        .collect();

    let id = R::ID_COLUMN;
    if !resolved.iter().any(|(column, _)| column.as_str() == id.as_str()) {
        resolved.push((R::ID_COLUMN, Order::Asc));
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_column() {
        let specs = parse_sorting(Some("name"), Some("DESC"));
        assert_eq!(specs, vec![SortSpec::new("name", SortDirection::Desc)]);
    }

    #[test]
    fn test_multi_column() {
        let specs = parse_sorting(Some("category desc, name asc, price"), Some("desc"));
        assert_eq!(
            specs,
            vec![
                SortSpec::new("category", SortDirection::Desc),
                SortSpec::new("name", SortDirection::Asc),
                SortSpec::new("price", SortDirection::Desc),
            ]
        );
    }

    #[test]
    fn test_missing_or_blank() {
        assert!(parse_sorting(None, Some("asc")).is_empty());
        assert!(parse_sorting(Some("  "), None).is_empty());
    }

    #[test]
    fn test_direction_defaults_to_ascending() {
        assert_eq!(SortDirection::parse("sideways"), SortDirection::Asc);
        assert_eq!(parse_sorting(Some("name"), None)[0].direction, SortDirection::Asc);
    }
}
