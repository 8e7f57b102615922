use crate::{time_label::sort_key, ChartPoint, Series};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Prefix that keeps comparison series apart from primary series of the same name.
pub const COMPARISON_PREFIX: &str = "cmp_";

/// Merges a primary and a comparison series onto one time axis.
///
/// Both series must have been aggregated at the same granularity,
/// otherwise their time labels cannot line up.
///
/// # Errors
///
/// Returns an error if the granularities differ, or a time label
/// cannot be placed in time.
pub fn merge(
    primary: &Series,
    comparison: &Series,
    reference: NaiveDate,
) -> crate::Result<Vec<ChartPoint>> {
    if primary.granularity != comparison.granularity {
        log::warn!(
            "Refusing to merge series at {} with comparison at {}",
            primary.granularity,
            comparison.granularity,
        );

        return Err(crate::Error::GranularityMismatch {
            primary: primary.granularity,
            comparison: comparison.granularity,
        });
    }

    merge_points(
        &primary.points,
        &comparison.points,
        reference,
        COMPARISON_PREFIX,
    )
}

/// Merges two lists of chart points by time label.
///
/// Every primary point is kept with its values unchanged. Comparison values
/// are copied in under `prefix + label`, creating rows for time labels the
/// primary points do not have. Every resulting row carries every column.
///
/// Rows are ordered by the point in time their label names, relative to
/// `reference` (usually the first day of the charted window).
///
/// # Errors
///
/// Returns an error if a time label cannot be placed in time.
pub fn merge_points(
    primary: &[ChartPoint],
    comparison: &[ChartPoint],
    reference: NaiveDate,
    prefix: &str,
) -> crate::Result<Vec<ChartPoint>> {
    let mut rows: crate::HashMap<&str, ChartPoint> = primary
        .iter()
        .map(|point| (point.time.as_str(), point.clone()))
        .collect();

    for point in comparison {
        let row = rows
            .entry(point.time.as_str())
            .or_insert_with(|| ChartPoint::new(point.time.as_str()));

        for (label, value) in &point.values {
            row.values.insert(format!("{prefix}{label}"), *value);
        }
    }

    let columns = rows
        .values()
        .flat_map(|row| row.values.keys().cloned())
        .collect::<BTreeSet<_>>();

    let mut rows = rows
        .into_values()
        .map(|mut row| {
            for column in &columns {
                if !row.values.contains_key(column) {
                    row.values.insert(column.clone(), None);
                }
            }
            sort_key(&row.time, reference).map(|key| (key, row))
        })
        .collect::<crate::Result<Vec<_>>>()?;

    // NOTE: Labels of mixed formats may share a key, the label text breaks ties
    rows.sort_by(|(a, a_row), (b, b_row)| (a, &a_row.time).cmp(&(b, &b_row.time)));

    log::debug!(
        "Merged {} primary and {} comparison points into {} rows",
        primary.len(),
        comparison.len(),
        rows.len(),
    );

    Ok(rows.into_iter().map(|(_, row)| row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures::date, Granularity};

    fn series(granularity: Granularity, points: Vec<ChartPoint>) -> Series {
        Series {
            granularity,
            labels: vec![],
            points,
        }
    }

    #[test_log::test]
    fn merge_namespaces_comparison() -> crate::Result<()> {
        let primary = series(Granularity::Daily, vec![ChartPoint::new("01/01").with("A", Some(1.0))]);
        let comparison = series(Granularity::Daily, vec![ChartPoint::new("01/01").with("A", Some(2.0))]);

        let merged = merge(&primary, &comparison, date(2024, 1, 1))?;

        assert_eq!(1, merged.len());
        assert_eq!(Some(1.0), merged[0].get("A"));
        assert_eq!(Some(2.0), merged[0].get("cmp_A"));

        Ok(())
    }

    #[test_log::test]
    fn merge_preserves_primary_without_comparison() -> crate::Result<()> {
        let points = vec![
            ChartPoint::new("30/10").with("A", Some(1.0)).with("B", None),
            ChartPoint::new("09/11").with("A", None).with("B", Some(3.5)),
        ];
        let primary = series(Granularity::Daily, points.clone());
        let comparison = series(Granularity::Daily, vec![]);

        let merged = merge(&primary, &comparison, date(2024, 10, 30))?;

        assert_eq!(points, merged);

        Ok(())
    }

    #[test_log::test]
    fn merge_adds_comparison_only_rows() -> crate::Result<()> {
        let primary = series(
            Granularity::Daily,
            vec![
                ChartPoint::new("30/10").with("A", Some(1.0)),
                ChartPoint::new("09/11").with("A", Some(2.0)),
            ],
        );
        let comparison = series(
            Granularity::Daily,
            vec![
                ChartPoint::new("01/11").with("A", Some(5.0)),
                ChartPoint::new("09/11").with("A", Some(6.0)),
            ],
        );

        let merged = merge(&primary, &comparison, date(2024, 10, 30))?;

        assert_eq!(
            vec!["30/10", "01/11", "09/11"],
            merged.iter().map(|p| p.time.as_str()).collect::<Vec<_>>(),
        );

        // NOTE: Every row has both columns
        assert_eq!(
            vec![
                ChartPoint::new("30/10").with("A", Some(1.0)).with("cmp_A", None),
                ChartPoint::new("01/11").with("A", None).with("cmp_A", Some(5.0)),
                ChartPoint::new("09/11").with("A", Some(2.0)).with("cmp_A", Some(6.0)),
            ],
            merged,
        );

        Ok(())
    }

    #[test_log::test]
    fn merge_rejects_granularity_mismatch() {
        let primary = series(Granularity::Daily, vec![ChartPoint::new("01/01")]);
        let comparison = series(Granularity::Hours3, vec![ChartPoint::new("01/01 00:00")]);

        assert!(matches!(
            merge(&primary, &comparison, date(2024, 1, 1)),
            Err(crate::Error::GranularityMismatch {
                primary: Granularity::Daily,
                comparison: Granularity::Hours3,
            }),
        ));
    }

    #[test_log::test]
    fn merge_points_mixed_formats_still_merge() -> crate::Result<()> {
        // Misaligned, but nothing is dropped
        let merged = merge_points(
            &[ChartPoint::new("01/01").with("A", Some(1.0))],
            &[ChartPoint::new("01/01 03:00").with("A", Some(2.0))],
            date(2024, 1, 1),
            "other_",
        )?;

        assert_eq!(2, merged.len());
        assert_eq!(Some(1.0), merged[0].get("A"));
        assert_eq!(Some(2.0), merged[1].get("other_A"));

        Ok(())
    }

    #[test_log::test]
    fn merge_points_invalid_label() {
        assert!(merge_points(
            &[ChartPoint::new("yesterday")],
            &[],
            date(2024, 1, 1),
            COMPARISON_PREFIX,
        )
        .is_err());
    }
}
