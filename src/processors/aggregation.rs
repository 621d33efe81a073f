use crate::error::{ProcessingError, Result};
use crate::models::{Centroid, HeatPoint, MapViews, MarkerEntry, StationRecord};

/// Derive the renderer views from a filtered record set.
///
/// The centroid falls back to `all_records` when the filter left nothing;
/// when both are empty there is nothing to center on and
/// [`ProcessingError::EmptyDataset`] is returned.
pub fn build_views(filtered: &[StationRecord], all_records: &[StationRecord]) -> Result<MapViews> {
    let centroid = Centroid::mean(filtered)
        .or_else(|| Centroid::mean(all_records))
        .ok_or(ProcessingError::EmptyDataset)?;

    Ok(MapViews {
        heat_points: filtered.iter().map(HeatPoint::from).collect(),
        markers: filtered.iter().map(MarkerEntry::from).collect(),
        centroid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::range_filter::filter_by_range;

    fn records() -> Vec<StationRecord> {
        vec![
            StationRecord::new("A".into(), -13.010079, -38.5, 10.0),
            StationRecord::new("B".into(), -13.0205, -38.6, 0.0),
            StationRecord::new("C".into(), -12.9, -38.45, 7.0),
        ]
    }

    #[test]
    fn test_one_view_entry_per_record() {
        let all = records();
        let filtered = filter_by_range(&all, 5.0, 10.0);
        let views = build_views(&filtered, &all).unwrap();

        assert_eq!(views.heat_points.len(), filtered.len());
        assert_eq!(views.markers.len(), filtered.len());
        assert_eq!(views.heat_points[0].weight, 10.0);
        assert_eq!(views.markers[1].label, "C");
    }

    #[test]
    fn test_centroid_within_filtered_bounds() {
        let all = records();
        let filtered = filter_by_range(&all, 5.0, 10.0);
        let views = build_views(&filtered, &all).unwrap();

        let (min_lat, max_lat) = (-13.010079, -12.9);
        let (min_lon, max_lon) = (-38.5, -38.45);
        assert!(views.centroid.lat >= min_lat && views.centroid.lat <= max_lat);
        assert!(views.centroid.lon >= min_lon && views.centroid.lon <= max_lon);
    }

    #[test]
    fn test_centroid_falls_back_to_all_records() {
        let all = records();
        let views = build_views(&[], &all).unwrap();

        assert!(views.heat_points.is_empty());
        assert!(views.markers.is_empty());
        assert_eq!(views.centroid, Centroid::mean(&all).unwrap());
    }

    #[test]
    fn test_empty_everything_is_an_error() {
        assert!(matches!(
            build_views(&[], &[]),
            Err(ProcessingError::EmptyDataset)
        ));
    }

    #[test]
    fn test_stored_coordinates_not_rounded() {
        let all = vec![StationRecord::new("X".into(), 1.23456789, 2.0, 1.0)];
        let views = build_views(&all, &all).unwrap();

        assert_eq!(views.markers[0].lat, 1.23456789);
        assert!(views.markers[0].display_text.ends_with("1.234568,2.000000"));
    }
}
