use std::collections::HashMap;

use serde::Serialize;

use crate::dataset::{year_label, Field, Record};

/// Ordered label/value pairs feeding one chart.
pub type Series = Vec<(String, u64)>;

/// Years drawn on the monthly chart, zero-filled when absent.
pub const TREND_YEARS: [i32; 3] = [2019, 2020, 2021];

/// Sums the count weight per value of `field`. Labels keep the order in
/// which they first appear in `records`.
pub fn group_sum<'a, I>(records: I, field: Field) -> Series
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut index = HashMap::<String, usize>::new();
    let mut series = Series::new();
    for record in records {
        let label = field.value(record);
        match index.get(&label) {
            Some(&pos) => series[pos].1 += record.count(),
            None => {
                index.insert(label.clone(), series.len());
                series.push((label, record.count()));
            }
        }
    }
    series
}

/// Two-field variant of [`group_sum`], keyed by `(outer, inner)`.
pub fn group_sum_pair<'a, I>(records: I, outer: Field, inner: Field) -> Vec<((String, String), u64)>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut index = HashMap::<(String, String), usize>::new();
    let mut series = Vec::<((String, String), u64)>::new();
    for record in records {
        let key = (outer.value(record), inner.value(record));
        match index.get(&key) {
            Some(&pos) => series[pos].1 += record.count(),
            None => {
                index.insert(key.clone(), series.len());
                series.push((key, record.count()));
            }
        }
    }
    series
}

pub fn total<'a, I>(records: I) -> u64
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().map(Record::count).sum()
}

/// Numeric value of a month label with its suffix stripped. Labels without
/// digits sort after every real month.
fn month_number(label: &str) -> u32 {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(u32::MAX)
}

/// Orders month labels by calendar month rather than first appearance.
pub fn sort_month_labels(labels: &mut [String]) {
    labels.sort_by_key(|label| month_number(label));
}

/// Counts per month for each requested year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySeries {
    pub months: Vec<String>,
    pub lines: Vec<(String, Vec<u64>)>,
}

impl MonthlySeries {
    pub fn max_value(&self) -> u64 {
        self.lines
            .iter()
            .flat_map(|(_, values)| values.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Pivots the view into months × years. Months are those present in the view,
/// in calendar order; a year with no records in a month gets 0.
pub fn monthly_series<'a, I>(records: I, years: &[i32]) -> MonthlySeries
where
    I: IntoIterator<Item = &'a Record>,
{
    let pairs = group_sum_pair(records, Field::Year, Field::Month);

    let mut months: Vec<String> = Vec::new();
    for ((_, month), _) in &pairs {
        if !months.contains(month) {
            months.push(month.clone());
        }
    }
    sort_month_labels(&mut months);

    let counts: HashMap<&(String, String), u64> = pairs.iter().map(|(key, v)| (key, *v)).collect();
    let lines = years
        .iter()
        .map(|year| {
            let label = year_label(*year);
            let values = months
                .iter()
                .map(|month| {
                    counts
                        .get(&(label.clone(), month.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect();
            (label, values)
        })
        .collect();

    MonthlySeries { months, lines }
}

/// Percentage share of each label. An empty series yields no shares.
pub fn shares(series: &[(String, u64)]) -> Vec<(String, f64)> {
    let sum: u64 = series.iter().map(|(_, v)| v).sum();
    series
        .iter()
        .map(|(label, v)| {
            let pct = if sum == 0 { 0.0 } else { *v as f64 * 100.0 / sum as f64 };
            (label.clone(), pct)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{record, Sex};
    use crate::filter::{apply, Selection};
    use crate::dataset::Dataset;

    fn sample() -> Vec<Record> {
        vec![
            record("2021-03-02", 34, Sex::Male, "Basic"),
            record("2020-01-15", 41, Sex::Female, "Premium"),
            record("2021-12-24", 45, Sex::Female, "Basic"),
            record("2019-03-09", 29, Sex::Male, "Basic"),
            record("2021-03-30", 52, Sex::Female, "Premium"),
        ]
    }

    #[test]
    fn group_by_sex_keeps_first_appearance() {
        let records = vec![
            record("2021-01-01", 34, Sex::Male, "Basic"),
            record("2021-01-01", 41, Sex::Female, "Basic"),
        ];
        assert_eq!(
            group_sum(&records, Field::Sex),
            vec![("男性".to_string(), 1), ("女性".to_string(), 1)]
        );
        let decades: Vec<String> = records.iter().map(Record::age_decade_label).collect();
        assert_eq!(decades, vec!["30代", "40代"]);
    }

    #[test]
    fn totals_are_conserved() {
        let records = sample();
        for field in [Field::Sex, Field::Product, Field::AgeDecade, Field::Year, Field::Month] {
            let sum: u64 = group_sum(&records, field).iter().map(|(_, v)| v).sum();
            assert_eq!(sum, total(&records));
        }
        let pair_sum: u64 = group_sum_pair(&records, Field::Year, Field::Month)
            .iter()
            .map(|(_, v)| v)
            .sum();
        assert_eq!(pair_sum, 5);
    }

    #[test]
    fn group_sum_over_filtered_view() {
        let dataset = Dataset::from_records(sample());
        let mut selection = Selection::all(&dataset);
        selection.toggle(Field::Product, "Premium");
        let view = apply(dataset.records(), &selection);
        assert_eq!(
            group_sum(view.iter().copied(), Field::AgeDecade),
            vec![("30代".to_string(), 1), ("40代".to_string(), 1), ("20代".to_string(), 1)]
        );
        assert_eq!(total(view.iter().copied()), 3);
    }

    #[test]
    fn month_labels_sort_numerically() {
        let mut labels = vec!["03月".to_string(), "01月".to_string(), "12月".to_string()];
        sort_month_labels(&mut labels);
        assert_eq!(labels, vec!["01月", "03月", "12月"]);
    }

    #[test]
    fn monthly_series_zero_fills() {
        let series = monthly_series(&sample(), &TREND_YEARS);
        assert_eq!(series.months, vec!["01月", "03月", "12月"]);
        assert_eq!(
            series.lines,
            vec![
                ("2019年".to_string(), vec![0, 1, 0]),
                ("2020年".to_string(), vec![1, 0, 0]),
                ("2021年".to_string(), vec![0, 2, 1]),
            ]
        );
        assert_eq!(series.max_value(), 2);
    }

    #[test]
    fn monthly_series_of_empty_view() {
        let series = monthly_series(Vec::<&Record>::new(), &TREND_YEARS);
        assert!(series.months.is_empty());
        assert_eq!(series.lines.len(), 3);
        assert!(series.lines.iter().all(|(_, v)| v.is_empty()));
        assert_eq!(series.max_value(), 0);
    }

    #[test]
    fn shares_are_percentages() {
        let shares = shares(&[("a".to_string(), 1), ("b".to_string(), 3)]);
        assert_eq!(shares, vec![("a".to_string(), 25.0), ("b".to_string(), 75.0)]);
        assert!(super::shares(&[("a".to_string(), 0)]).iter().all(|(_, p)| *p == 0.0));
        assert!(super::shares(&[]).is_empty());
    }
}
