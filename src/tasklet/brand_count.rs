//! # Brand Count Tasklet
//!
//! Counts how many products belong to each brand and rewrites the brands file
//! with the count next to every brand.
//!
//! The brand of a product is derived from the first field of its record (see
//! [`brand_key`]). The brands file is rewritten through a temporary file
//! created in the same directory, which replaces the original once every row
//! has been written: the original is deleted, then the temporary file is
//! renamed over it. A failure at either step fails the step; nothing is rolled
//! back.
//!
//! ## Examples
//!
//! ```rust
//! use csv_parser_rs::core::step::StepBuilder;
//! use csv_parser_rs::tasklet::brand_count::BrandCountTaskletBuilder;
//! use std::fs;
//!
//! # fn example() -> Result<(), csv_parser_rs::ParserError> {
//! let dir = tempfile::tempdir()?;
//! let products = dir.path().join("products.csv");
//! let brands = dir.path().join("brands.csv");
//! fs::write(&products, "Product\nHP Envy\nHP Spectre\nDell XPS\n")?;
//! fs::write(&brands, "Brand\nHP\nDell\nSony\n")?;
//!
//! let tasklet = BrandCountTaskletBuilder::new()
//!     .products_path(&products)
//!     .brands_path(&brands)
//!     .build()?;
//!
//! let execution = StepBuilder::new("count-brands").tasklet(&tasklet).build().execute();
//! assert!(execution.is_success());
//!
//! assert_eq!(
//!     fs::read_to_string(&brands)?,
//!     "\"Brand\",\"Number\"\n\"HP\",\"2\"\n\"Dell\",\"1\"\n\"Sony\",\"0\"\n"
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    core::{
        item::{ItemReader, ItemWriter},
        step::{RepeatStatus, StepExecution, Tasklet},
    },
    error::ParserError,
    item::csv::{Record, csv_reader::CsvReaderBuilder, csv_writer::CsvWriterBuilder},
};

/// Header written to the rewritten brands file unless configured otherwise.
pub const DEFAULT_HEADER: [&str; 2] = ["Brand", "Number"];

/// Longest first word that is too short to name a brand on its own.
const SHORT_WORD_LEN: usize = 3;

/// Derives the grouping key of a product or brand name.
///
/// A short first word (three characters or fewer) is joined with the second
/// word, so `"HP Laptop X"` yields `"HP Laptop"`; otherwise the first word is
/// the key, so `"Logitech Mouse"` yields `"Logitech"`. A single word is its
/// own key.
pub fn brand_key(name: &str) -> String {
    let mut words = name.split_whitespace();

    match (words.next(), words.next()) {
        (Some(first), Some(second)) if first.chars().count() <= SHORT_WORD_LEN => {
            format!("{first} {second}")
        }
        (Some(first), Some(_)) => first.to_string(),
        _ => name.trim().to_string(),
    }
}

/// Number of products seen per brand key and per first word.
///
/// Unknown keys count zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BrandCounts {
    by_key: HashMap<String, usize>,
    by_first_word: HashMap<String, usize>,
}

impl BrandCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one product under its brand key and under its first word.
    pub fn add_product(&mut self, name: &str) {
        *self.by_key.entry(brand_key(name)).or_default() += 1;

        if let Some(first) = name.split_whitespace().next() {
            *self.by_first_word.entry(first.to_string()).or_default() += 1;
        }
    }

    /// Products whose brand key is exactly `key`.
    pub fn get(&self, key: &str) -> usize {
        self.by_key.get(key).copied().unwrap_or(0)
    }

    /// Products belonging to the brand named `brand`.
    ///
    /// A two-word brand key (`"HP Envy"`) matches products with that exact
    /// key. A single-word key (`"HP"`) matches every product whose name starts
    /// with that word, so it covers `"HP Envy"` and `"HP Spectre"` alike.
    pub fn count_for_brand(&self, brand: &str) -> usize {
        let key = brand_key(brand);
        if key.contains(' ') {
            self.get(&key)
        } else {
            self.by_first_word.get(&key).copied().unwrap_or(0)
        }
    }

    /// Number of distinct brand keys.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Reads every product record and counts it under the key of its first field.
///
/// Records without any field are skipped.
pub fn count_products(
    products: &mut dyn ItemReader<Record>,
    step_execution: &mut StepExecution,
) -> Result<BrandCounts, ParserError> {
    let mut counts = BrandCounts::new();

    while let Some(record) = products.read()? {
        step_execution.read_count += 1;
        match record.first() {
            Some(name) => counts.add_product(name),
            None => debug!("Skipping empty product record"),
        }
    }

    Ok(counts)
}

/// Writes `header`, then one `[brand, count]` row per brand record, in the
/// order the brands are read.
pub fn write_brand_counts(
    brands: &mut dyn ItemReader<Record>,
    writer: &dyn ItemWriter<[String]>,
    counts: &BrandCounts,
    header: &[String],
    step_execution: &mut StepExecution,
) -> Result<(), ParserError> {
    writer.write(header)?;

    while let Some(record) = brands.read()? {
        step_execution.read_count += 1;
        let brand = record.into_iter().next().unwrap_or_default();
        let count = counts.count_for_brand(&brand);

        writer.write(&[brand, count.to_string()])?;
        step_execution.write_count += 1;
    }

    writer.flush()
}

/// A tasklet rewriting a brands file with the number of products per brand.
pub struct BrandCountTasklet {
    products_path: PathBuf,
    brands_path: PathBuf,
    header: Vec<String>,
}

impl BrandCountTasklet {
    fn working_dir(&self) -> &Path {
        match self.brands_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Tasklet for BrandCountTasklet {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<RepeatStatus, ParserError> {
        let mut products = CsvReaderBuilder::new().from_path(&self.products_path)?;
        let mut brands = CsvReaderBuilder::new().from_path(&self.brands_path)?;

        let counts = count_products(&mut products, step_execution)?;
        info!(
            "Counted {} products in {} brands from {}",
            step_execution.read_count,
            counts.len(),
            self.products_path.display()
        );

        let mut temp_file = tempfile::Builder::new()
            .prefix("temp")
            .suffix(".csv")
            .tempfile_in(self.working_dir())?;

        {
            let writer = CsvWriterBuilder::new().from_borrowed_writer(temp_file.as_file_mut())?;
            write_brand_counts(&mut brands, &writer, &counts, &self.header, step_execution)?;
        }

        // Release the brands file before replacing it
        drop(brands);

        fs::remove_file(&self.brands_path)?;
        temp_file
            .persist(&self.brands_path)
            .map_err(|error| ParserError::Io(error.error))?;

        info!(
            "Rewrote {} with {} brands",
            self.brands_path.display(),
            step_execution.write_count
        );

        Ok(RepeatStatus::Finished)
    }
}

/// Builder for [`BrandCountTasklet`].
#[derive(Default)]
pub struct BrandCountTaskletBuilder {
    products_path: Option<PathBuf>,
    brands_path: Option<PathBuf>,
    header: Vec<String>,
}

impl BrandCountTaskletBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.products_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn brands_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.brands_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Header row of the rewritten brands file. Empty means [`DEFAULT_HEADER`].
    pub fn header<I, S>(mut self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = header.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<BrandCountTasklet, ParserError> {
        let products_path = self.products_path.ok_or_else(|| {
            ParserError::InvalidParameter("Products file path is required".to_string())
        })?;
        let brands_path = self.brands_path.ok_or_else(|| {
            ParserError::InvalidParameter("Brands file path is required".to_string())
        })?;

        let header = if self.header.is_empty() {
            DEFAULT_HEADER.iter().map(|column| column.to_string()).collect()
        } else {
            self.header
        };

        Ok(BrandCountTasklet {
            products_path,
            brands_path,
            header,
        })
    }
}
