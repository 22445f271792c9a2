use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub const COL_TIMESTAMP: &'static str = "日時";
pub const COL_AGE: &'static str = "年齢";
pub const COL_SEX: &'static str = "性別";
pub const COL_PRODUCT: &'static str = "商品";

const COLUMNS: &'static [&'static str] = &[COL_TIMESTAMP, COL_AGE, COL_SEX, COL_PRODUCT];

const DECADE_SUFFIX: &'static str = "代";
const YEAR_SUFFIX: &'static str = "年";
const MONTH_SUFFIX: &'static str = "月";

pub fn columns() -> Vec<&'static str> {
    Vec::from(COLUMNS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Accepts the dataset's own labels plus the usual short and latin forms.
    pub fn parse(raw: &str) -> Option<Sex> {
        let raw = raw.trim();
        match raw {
            "男性" | "男" => return Some(Sex::Male),
            "女性" | "女" => return Some(Sex::Female),
            _ => {}
        }
        match raw.to_ascii_lowercase().as_str() {
            "m" | "male" => Some(Sex::Male),
            "f" | "female" => Some(Sex::Female),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "男性",
            Sex::Female => "女性",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A product name, trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Product(String);

impl Product {
    pub fn new(raw: &str) -> Option<Product> {
        let name = raw.trim();
        if name.is_empty() {
            None
        } else {
            Some(Product(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One customer-support interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: String,
    pub age: u8,
    pub sex: Sex,
    pub product: Product,
    year: i32,
    month: u32,
}

/// Reads `YYYY-MM` from the start of a timestamp. Anything else is rejected
/// rather than sliced positionally.
pub fn parse_year_month(timestamp: &str) -> Option<(i32, u32)> {
    let prefix = timestamp.trim().get(..7)?;
    let bytes = prefix.as_bytes();
    let digits_ok = bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit);
    if !digits_ok || bytes[4] != b'-' {
        return None;
    }
    let date = NaiveDate::parse_from_str(&format!("{}-01", prefix), "%Y-%m-%d").ok()?;
    Some((date.year(), date.month()))
}

pub fn age_decade(age: u8) -> u8 {
    age / 10 * 10
}

pub fn decade_label(decade: u8) -> String {
    format!("{}{}", decade, DECADE_SUFFIX)
}

pub fn year_label(year: i32) -> String {
    format!("{:04}{}", year, YEAR_SUFFIX)
}

pub fn month_label(month: u32) -> String {
    format!("{:02}{}", month, MONTH_SUFFIX)
}

impl Record {
    /// Returns `None` when the timestamp does not start with `YYYY-MM`.
    pub fn new(timestamp: impl Into<String>, age: u8, sex: Sex, product: Product) -> Option<Record> {
        let timestamp = timestamp.into();
        let (year, month) = parse_year_month(&timestamp)?;
        Some(Record {
            timestamp,
            age,
            sex,
            product,
            year,
            month,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn age_decade(&self) -> u8 {
        age_decade(self.age)
    }

    pub fn age_decade_label(&self) -> String {
        decade_label(self.age_decade())
    }

    pub fn year_label(&self) -> String {
        year_label(self.year)
    }

    pub fn month_label(&self) -> String {
        month_label(self.month)
    }

    /// Aggregation weight.
    pub fn count(&self) -> u64 {
        1
    }
}

/// A column the dashboard can filter or group on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Sex,
    Product,
    AgeDecade,
    Year,
    Month,
}

impl Field {
    /// The four filterable dimensions, in sidebar order.
    pub const FILTERS: [Field; 4] = [Field::Sex, Field::Product, Field::AgeDecade, Field::Year];

    pub fn value(&self, record: &Record) -> String {
        match self {
            Field::Sex => record.sex.label().to_string(),
            Field::Product => record.product.as_str().to_string(),
            Field::AgeDecade => record.age_decade_label(),
            Field::Year => record.year_label(),
            Field::Month => record.month_label(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Field::Sex => "性別",
            Field::Product => "商品",
            Field::AgeDecade => "年代",
            Field::Year => "年",
            Field::Month => "月",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Row counts from a load. Skipped rows never reach the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped_age: usize,
    pub skipped_timestamp: usize,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.skipped_age + self.skipped_timestamp
    }
}

/// The session's loaded records plus the filter options observed in them.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    report: LoadReport,
    options: Vec<(Field, Vec<String>)>,
}

impl Dataset {
    pub fn new(records: Vec<Record>, report: LoadReport) -> Dataset {
        let options = Field::FILTERS
            .iter()
            .map(|field| (*field, distinct_values(&records, *field)))
            .collect();
        Dataset {
            records,
            report,
            options,
        }
    }

    pub fn from_records(records: Vec<Record>) -> Dataset {
        let report = LoadReport {
            loaded: records.len(),
            ..LoadReport::default()
        };
        Dataset::new(records, report)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct values of a filter dimension in order of first appearance.
    pub fn options(&self, field: Field) -> &[String] {
        self.options
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }
}

fn distinct_values(records: &[Record], field: Field) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| field.value(r))
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
pub(crate) fn record(timestamp: &str, age: u8, sex: Sex, product: &str) -> Record {
    Record::new(timestamp, age, sex, Product::new(product).unwrap()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decade_is_stable_within_ten_years() {
        for age in 0u8..=110 {
            let decade = age_decade(age);
            assert_eq!(decade % 10, 0);
            assert!(decade <= age && age - decade <= 9);
            for k in 0..=9u8 {
                assert_eq!(age_decade(decade + k), decade);
            }
        }
    }

    #[test]
    fn derived_labels() {
        let a = record("2021-03-14 10:22:00", 34, Sex::Male, "A");
        let b = record("2019-12-01", 41, Sex::Female, "B");
        assert_eq!(a.age_decade_label(), "30代");
        assert_eq!(b.age_decade_label(), "40代");
        assert_eq!(a.year_label(), "2021年");
        assert_eq!(a.month_label(), "03月");
        assert_eq!(b.month_label(), "12月");
        assert_eq!(a.count(), 1);
    }

    #[test]
    fn malformed_timestamps_are_rejected() {
        assert_eq!(parse_year_month("2020-07-01"), Some((2020, 7)));
        assert_eq!(parse_year_month("2020-07"), Some((2020, 7)));
        assert_eq!(parse_year_month("2020-7-1"), None);
        assert_eq!(parse_year_month("2020-13-01"), None);
        assert_eq!(parse_year_month("2020/07/01"), None);
        assert_eq!(parse_year_month("07/01/2020"), None);
        assert_eq!(parse_year_month("2020"), None);
        assert_eq!(parse_year_month(""), None);
        assert_eq!(parse_year_month("２０２０-07"), None);
    }

    #[test]
    fn sex_parsing() {
        assert_eq!(Sex::parse("男性"), Some(Sex::Male));
        assert_eq!(Sex::parse(" 女性 "), Some(Sex::Female));
        assert_eq!(Sex::parse("M"), Some(Sex::Male));
        assert_eq!(Sex::parse("female"), Some(Sex::Female));
        assert_eq!(Sex::parse("unknown"), None);
        assert_eq!(Sex::Female.to_string(), "女性");
    }

    #[test]
    fn blank_products_are_rejected() {
        assert!(Product::new("   ").is_none());
        assert_eq!(Product::new(" Basic ").unwrap().as_str(), "Basic");
    }

    #[test]
    fn options_keep_first_appearance_order() {
        let dataset = Dataset::from_records(vec![
            record("2020-05-01", 52, Sex::Female, "Premium"),
            record("2019-01-01", 23, Sex::Male, "Basic"),
            record("2020-02-01", 58, Sex::Female, "Basic"),
        ]);
        assert_eq!(dataset.options(Field::Sex), ["女性", "男性"]);
        assert_eq!(dataset.options(Field::Product), ["Premium", "Basic"]);
        assert_eq!(dataset.options(Field::AgeDecade), ["50代", "20代"]);
        assert_eq!(dataset.options(Field::Year), ["2020年", "2019年"]);
        assert!(dataset.options(Field::Month).is_empty());
        assert_eq!(dataset.report().loaded, 3);
    }
}
