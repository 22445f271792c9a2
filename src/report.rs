use serde::Serialize;

use crate::aggregator::{self, MonthlySeries, TREND_YEARS};
use crate::dataset::{Dataset, Field, LoadReport, Record};
use crate::error::Result;
use crate::filter::{self, Selection};

pub const CARD_TITLE: &'static str = "カスタマサポート対応件数";
pub const SEX_MIX_TITLE: &'static str = "性別構成比";
pub const PRODUCT_MIX_TITLE: &'static str = "商品別構成比";
pub const AGE_MIX_TITLE: &'static str = "年代別構成比";
pub const TREND_TITLE: &'static str = "月別件数推移";
pub const BADGE_SEPARATOR: &'static str = "、";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub dimension: String,
    pub values: String,
}

/// Everything one render of the dashboard shows, computed from the
/// dataset and the current selection in a single pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub card_title: String,
    pub total: u64,
    pub load: LoadReport,
    pub badges: Vec<Badge>,
    pub sex_mix: Vec<Share>,
    pub product_mix: Vec<Share>,
    pub age_mix: Vec<Share>,
    pub monthly: MonthlySeries,
}

fn mix(view: &[&Record], field: Field) -> Vec<Share> {
    let series = aggregator::group_sum(view.iter().copied(), field);
    aggregator::shares(&series)
        .into_iter()
        .zip(series)
        .map(|((label, percent), (_, count))| Share {
            label,
            count,
            percent,
        })
        .collect()
}

impl Dashboard {
    pub fn compute(dataset: &Dataset, selection: &Selection) -> Dashboard {
        let view = filter::apply(dataset.records(), selection);
        let badges = Field::FILTERS
            .iter()
            .map(|field| Badge {
                dimension: field.title().to_string(),
                values: selection.selected(*field, dataset).join(BADGE_SEPARATOR),
            })
            .collect();

        Dashboard {
            card_title: CARD_TITLE.to_string(),
            total: aggregator::total(view.iter().copied()),
            load: dataset.report(),
            badges,
            sex_mix: mix(&view, Field::Sex),
            product_mix: mix(&view, Field::Product),
            age_mix: mix(&view, Field::AgeDecade),
            monthly: aggregator::monthly_series(view.iter().copied(), &TREND_YEARS),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
