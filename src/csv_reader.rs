use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use csv::StringRecord;
use log::{debug, info, warn};

use crate::dataset::{self, Dataset, LoadReport, Product, Record, Sex};
use crate::error::{DashError, Result};

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(raw: &str) -> Source {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

/// Products a load accepts. `Open` takes whatever the file contains.
#[derive(Debug, Clone, Default)]
pub enum ProductCatalog {
    #[default]
    Open,
    Strict(HashSet<Product>),
}

impl ProductCatalog {
    pub fn from_names(names: &[String]) -> ProductCatalog {
        let products: HashSet<Product> = names.iter().filter_map(|n| Product::new(n)).collect();
        if products.is_empty() {
            ProductCatalog::Open
        } else {
            ProductCatalog::Strict(products)
        }
    }

    fn admits(&self, product: &Product) -> bool {
        match self {
            ProductCatalog::Open => true,
            ProductCatalog::Strict(products) => products.contains(product),
        }
    }
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Schema {
    timestamp: usize,
    age: usize,
    sex: usize,
    product: usize,
}

impl Schema {
    fn from_headers(headers: &StringRecord) -> Result<Schema> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };
        let found: Vec<Option<usize>> = dataset::columns().iter().map(|c| position(*c)).collect();
        let missing: Vec<String> = dataset::columns()
            .iter()
            .zip(&found)
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        match found.as_slice() {
            [Some(timestamp), Some(age), Some(sex), Some(product)] => Ok(Schema {
                timestamp: *timestamp,
                age: *age,
                sex: *sex,
                product: *product,
            }),
            _ => Err(DashError::MissingColumns(missing)),
        }
    }
}

/// Reads the raw CSV text from disk or over HTTP.
pub fn fetch(source: &Source, timeout: Duration) -> Result<String> {
    match source {
        Source::Path(path) => fs::read_to_string(path).map_err(|source| DashError::Io {
            path: path.display().to_string(),
            source,
        }),
        Source::Url(url) => {
            let http_err = |source| DashError::Http {
                url: url.clone(),
                source,
            };
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(http_err)?;
            let response = client.get(url).send().map_err(http_err)?;
            let status = response.status();
            if !status.is_success() {
                return Err(DashError::HttpStatus {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }
            response.text().map_err(http_err)
        }
    }
}

enum Row {
    Kept(Record),
    BadAge,
    BadTimestamp,
}

fn parse_age(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    if let Ok(age) = raw.parse::<u8>() {
        return Some(age);
    }
    // Exports from dataframe tools write integer columns containing gaps as floats.
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && (0.0..=255.0).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}

fn parse_row(row: &StringRecord, schema: Schema, catalog: &ProductCatalog, line: u64) -> Result<Row> {
    let field = |idx: usize| row.get(idx).unwrap_or("");

    let sex_raw = field(schema.sex);
    let sex = Sex::parse(sex_raw).ok_or_else(|| DashError::InvalidSex {
        line,
        value: sex_raw.to_string(),
    })?;
    let product = Product::new(field(schema.product)).ok_or(DashError::EmptyProduct { line })?;
    if !catalog.admits(&product) {
        return Err(DashError::UnknownProduct {
            line,
            value: product.to_string(),
        });
    }

    let age = match parse_age(field(schema.age)) {
        Some(age) => age,
        None => return Ok(Row::BadAge),
    };
    match Record::new(field(schema.timestamp).trim(), age, sex, product) {
        Some(record) => Ok(Row::Kept(record)),
        None => Ok(Row::BadTimestamp),
    }
}

/// Parses CSV text into a dataset. Header problems, unknown sexes and
/// products outside the catalog fail the whole load; rows with an unusable
/// age or timestamp are skipped and counted.
pub fn parse_records<R: io::Read>(reader: R, catalog: &ProductCatalog) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let schema = Schema::from_headers(rdr.headers()?)?;
    debug!("resolved schema {:?}", schema);

    let mut records = Vec::<Record>::new();
    let mut report = LoadReport::default();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        match parse_row(&row, schema, catalog, line)? {
            Row::Kept(record) => records.push(record),
            Row::BadAge => {
                warn!("line {}: skipping row with missing or invalid age", line);
                report.skipped_age += 1;
            }
            Row::BadTimestamp => {
                warn!("line {}: skipping row with malformed timestamp", line);
                report.skipped_timestamp += 1;
            }
        }
    }
    report.loaded = records.len();
    Ok(Dataset::new(records, report))
}

/// Fetches and parses a source. The returned dataset is owned by the caller
/// for the rest of the session.
pub fn read_data(source: &Source, catalog: &ProductCatalog, timeout: Duration) -> Result<Dataset> {
    info!("loading {}", source);
    let contents = fetch(source, timeout)?;
    let dataset = parse_records(contents.as_bytes(), catalog)?;
    let report = dataset.report();
    if dataset.is_empty() {
        warn!("{} contains no usable rows", source);
    }
    info!(
        "loaded {} records from {} ({} skipped: {} age, {} timestamp)",
        report.loaded,
        source,
        report.skipped(),
        report.skipped_age,
        report.skipped_timestamp
    );
    Ok(dataset)
}
