//! Local evaluation of catalog search filters

use covgrid_core::models::{Item, SearchFilter};
use geo::Intersects;

/// Whether `item` satisfies `filter`.
///
/// Date and numeric filters fail on items that lack the field; a permission
/// filter passes when the item does not list its permissions.
pub fn matches(filter: &SearchFilter, item: &Item) -> bool {
    match filter {
        SearchFilter::AndFilter { config } => config.iter().all(|f| matches(f, item)),
        SearchFilter::OrFilter { config } => config.iter().any(|f| matches(f, item)),
        SearchFilter::NotFilter { config } => !matches(config, item),
        SearchFilter::GeometryFilter { config, .. } => footprint_intersects(item, config),
        SearchFilter::DateRangeFilter { field_name, config } => item
            .properties
            .get(field_name)
            .and_then(|v| v.as_str())
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .is_some_and(|dt| config.contains(dt.with_timezone(&chrono::Utc))),
        SearchFilter::RangeFilter { field_name, config } => {
            item.number(field_name).is_some_and(|v| config.contains(v))
        }
        SearchFilter::StringInFilter { field_name, config } => {
            string_field(item, field_name).is_some_and(|v| config.iter().any(|c| *c == v))
        }
        SearchFilter::PermissionFilter { config } => match item.properties.get("permissions") {
            Some(serde_json::Value::Array(granted)) => config
                .iter()
                .all(|wanted| granted.iter().any(|g| g.as_str().is_some_and(|g| g.starts_with(wanted.as_str())))),
            _ => true,
        },
    }
}

fn string_field(item: &Item, field_name: &str) -> Option<String> {
    match field_name {
        "id" => Some(item.id.clone()),
        "item_type" => Some(item.item_type.to_string()),
        _ => match item.properties.get(field_name)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        },
    }
}

fn footprint_intersects(item: &Item, geometry: &geojson::Geometry) -> bool {
    let footprint = geo::Geometry::<f64>::try_from(item.geometry.clone());
    let area = geo::Geometry::<f64>::try_from(geometry.clone());
    match (footprint, area) {
        (Ok(footprint), Ok(area)) => footprint.intersects(&area),
        _ => {
            tracing::warn!(item = %item.id, "Unreadable geometry, excluding item");
            false
        }
    }
}
