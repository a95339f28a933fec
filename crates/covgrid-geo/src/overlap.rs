//! AOI / footprint intersection in the shared projected system

use crate::models::{Overlap, ProjectedPolygon};
use crate::transform::{transform as project, CoordinateTransform};
use crate::validation::polygon_from_geojson;
use covgrid_core::error::Result;
use covgrid_core::models::Item;
use geo::{Area, BooleanOps, BoundingRect, Rect};

/// Intersect the projected AOI with one projected footprint
pub fn intersect(aoi: &ProjectedPolygon, item_id: &str, footprint: &ProjectedPolygon) -> Overlap {
    let (a, b) = (aoi.as_geo(), footprint.as_geo());

    if b.unsigned_area() <= 0.0 {
        return Overlap::empty(item_id);
    }
    match (a.bounding_rect(), b.bounding_rect()) {
        (Some(ra), Some(rb)) if rects_touch(&ra, &rb) => {}
        _ => return Overlap::empty(item_id),
    }

    Overlap::new(item_id, a.intersection(b))
}

/// Lazily project and intersect each item footprint with the AOI.
///
/// Yields one result per item, in input order. `transform` must be the one
/// the AOI itself was projected with.
pub fn overlaps_for<'a, I>(
    aoi: &'a ProjectedPolygon,
    items: I,
    transform: &'a dyn CoordinateTransform,
) -> impl Iterator<Item = Result<Overlap>> + 'a
where
    I: IntoIterator<Item = &'a Item>,
    I::IntoIter: 'a,
{
    items.into_iter().map(move |item| {
        let footprint = polygon_from_geojson(&item.id, &item.geometry)?;
        let projected = project(&footprint, transform)?;
        let overlap = intersect(aoi, &item.id, &projected);
        tracing::trace!(item = %item.id, area = overlap.area(), "Computed overlap");
        Ok(overlap)
    })
}

fn rects_touch(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x && a.min().y <= b.max().y && b.min().y <= a.max().y
}
