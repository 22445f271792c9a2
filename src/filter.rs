use std::collections::HashSet;

use crate::dataset::{Dataset, Field, Record};

/// Allowed values per filter dimension. Dimensions are ANDed together, values
/// within one dimension are ORed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    sets: Vec<(Field, HashSet<String>)>,
}

impl Selection {
    /// Every observed value selected, the dashboard's starting state.
    pub fn all(dataset: &Dataset) -> Selection {
        Selection {
            sets: Field::FILTERS
                .iter()
                .map(|field| (*field, dataset.options(*field).iter().cloned().collect()))
                .collect(),
        }
    }

    /// Nothing selected in any dimension.
    pub fn none() -> Selection {
        Selection {
            sets: Field::FILTERS.iter().map(|field| (*field, HashSet::new())).collect(),
        }
    }

    fn set(&self, field: Field) -> Option<&HashSet<String>> {
        self.sets.iter().find(|(f, _)| *f == field).map(|(_, set)| set)
    }

    fn set_mut(&mut self, field: Field) -> Option<&mut HashSet<String>> {
        self.sets.iter_mut().find(|(f, _)| *f == field).map(|(_, set)| set)
    }

    pub fn contains(&self, field: Field, value: &str) -> bool {
        self.set(field).map_or(false, |set| set.contains(value))
    }

    /// Flips one value. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, field: Field, value: &str) -> bool {
        match self.set_mut(field) {
            Some(set) => {
                if set.remove(value) {
                    false
                } else {
                    set.insert(value.to_string());
                    true
                }
            }
            None => false,
        }
    }

    pub fn select(&mut self, field: Field, values: &[String]) {
        if let Some(set) = self.set_mut(field) {
            set.extend(values.iter().cloned());
        }
    }

    pub fn clear(&mut self, field: Field) {
        if let Some(set) = self.set_mut(field) {
            set.clear();
        }
    }

    /// Selected values of a dimension, listed in the dataset's option order.
    pub fn selected<'a>(&self, field: Field, dataset: &'a Dataset) -> Vec<&'a str> {
        dataset
            .options(field)
            .iter()
            .filter(|v| self.contains(field, v))
            .map(|v| v.as_str())
            .collect()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.sets
            .iter()
            .all(|(field, set)| set.contains(&field.value(record)))
    }
}

/// The filtered view, in source order.
pub fn apply<'a, I>(records: I, selection: &Selection) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().filter(|r| selection.matches(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{record, Sex};

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record("2019-04-01", 34, Sex::Male, "Basic"),
            record("2020-05-01", 41, Sex::Female, "Premium"),
            record("2021-06-01", 38, Sex::Female, "Basic"),
            record("2021-07-01", 67, Sex::Male, "Premium"),
        ])
    }

    #[test]
    fn default_selection_is_identity() {
        let dataset = sample();
        let view = apply(dataset.records(), &Selection::all(&dataset));
        assert_eq!(view.len(), dataset.len());
        assert!(view.iter().zip(dataset.records()).all(|(a, b)| *a == b));
    }

    #[test]
    fn filtering_is_idempotent() {
        let dataset = sample();
        let mut selection = Selection::all(&dataset);
        selection.toggle(Field::Product, "Premium");
        selection.toggle(Field::Year, "2019年");
        let once = apply(dataset.records(), &selection);
        let twice = apply(once.iter().copied(), &selection);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn single_sex_filter() {
        let dataset = Dataset::from_records(vec![
            record("2021-01-01", 34, Sex::Male, "Basic"),
            record("2021-01-01", 41, Sex::Female, "Basic"),
        ]);
        let mut selection = Selection::all(&dataset);
        selection.clear(Field::Sex);
        selection.toggle(Field::Sex, "女性");
        let view = apply(dataset.records(), &selection);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].age, 41);
    }

    #[test]
    fn dimensions_and_values_within_or() {
        let dataset = sample();
        let mut selection = Selection::all(&dataset);
        selection.clear(Field::AgeDecade);
        selection.select(Field::AgeDecade, &["30代".to_string(), "60代".to_string()]);
        selection.clear(Field::Sex);
        selection.toggle(Field::Sex, "男性");
        let ages: Vec<u8> = apply(dataset.records(), &selection).iter().map(|r| r.age).collect();
        assert_eq!(ages, vec![34, 67]);
    }

    #[test]
    fn empty_dimension_empties_the_view() {
        let dataset = sample();
        let mut selection = Selection::all(&dataset);
        selection.clear(Field::Year);
        assert!(apply(dataset.records(), &selection).is_empty());
        assert!(apply(dataset.records(), &Selection::none()).is_empty());
    }

    #[test]
    fn toggle_reports_state() {
        let dataset = sample();
        let mut selection = Selection::all(&dataset);
        assert!(!selection.toggle(Field::Sex, "男性"));
        assert!(!selection.contains(Field::Sex, "男性"));
        assert!(selection.toggle(Field::Sex, "男性"));
        assert!(!selection.toggle(Field::Month, "01月"));
    }

    #[test]
    fn selected_follows_option_order() {
        let dataset = sample();
        let mut selection = Selection::none();
        selection.toggle(Field::Year, "2021年");
        selection.toggle(Field::Year, "2019年");
        assert_eq!(selection.selected(Field::Year, &dataset), ["2019年", "2021年"]);
    }
}
