mod common;

use std::fs;

use csv_parser_rs::{
    core::step::{StepBuilder, StepStatus},
    item::csv::csv_reader::CsvReaderBuilder,
    tasklet::brand_count::BrandCountTaskletBuilder,
};

#[test]
fn brands_file_is_rewritten_with_counts() {
    common::init_logger();

    let dir = tempfile::tempdir().unwrap();
    let products = dir.path().join("products.csv");
    let brands = dir.path().join("brands.csv");

    fs::write(
        &products,
        "Product,Price\r\n\
         HP Laptop X,999\r\n\
         HP Laptop Y,1099\r\n\
         Logitech Mouse,25\r\n\
         Logitech Keyboard,45\r\n\
         Dell XPS,1299\r\n",
    )
    .unwrap();
    fs::write(&brands, "Brand\nHP Laptop\nLogitech\nDell XPS\nApple\n").unwrap();

    let tasklet = BrandCountTaskletBuilder::new()
        .products_path(&products)
        .brands_path(&brands)
        .build()
        .unwrap();

    let execution = StepBuilder::new("count-brands")
        .tasklet(&tasklet)
        .build()
        .execute();

    assert!(execution.is_success());
    assert_eq!(execution.status, StepStatus::Success);
    assert!(execution.errors.is_empty());
    // Five products, then four brands
    assert_eq!(execution.read_count, 9);
    assert_eq!(execution.write_count, 4);

    let reader = CsvReaderBuilder::new().from_path(&brands).unwrap();
    assert_eq!(reader.header(), ["Brand", "Number"]);
    assert_eq!(
        reader.collect::<Vec<_>>(),
        vec![
            vec!["HP Laptop", "2"],
            vec!["Logitech", "2"],
            vec!["Dell XPS", "1"],
            vec!["Apple", "0"],
        ]
    );

    // No temporary file is left behind
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name != "products.csv" && name != "brands.csv")
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[test]
fn custom_header_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let products = dir.path().join("products.csv");
    let brands = dir.path().join("brands.csv");
    fs::write(&products, "Product\nSony Bravia\n").unwrap();
    fs::write(&brands, "Brand\nSony\n").unwrap();

    let tasklet = BrandCountTaskletBuilder::new()
        .products_path(&products)
        .brands_path(&brands)
        .header(["Marque", "Total"])
        .build()
        .unwrap();

    let execution = StepBuilder::new("count-brands")
        .tasklet(&tasklet)
        .build()
        .execute();

    assert!(execution.is_success());
    assert_eq!(
        fs::read_to_string(&brands).unwrap(),
        "\"Marque\",\"Total\"\n\"Sony\",\"1\"\n"
    );
}

#[test]
fn missing_products_file_fails_the_step() {
    let dir = tempfile::tempdir().unwrap();
    let brands = dir.path().join("brands.csv");
    fs::write(&brands, "Brand\nHP\n").unwrap();

    let tasklet = BrandCountTaskletBuilder::new()
        .products_path(dir.path().join("products.csv"))
        .brands_path(&brands)
        .build()
        .unwrap();

    let execution = StepBuilder::new("count-brands")
        .tasklet(&tasklet)
        .build()
        .execute();

    assert!(!execution.is_success());
    assert_eq!(execution.status, StepStatus::Error);
    assert_eq!(execution.errors.len(), 1);
    assert!(execution.errors[0].starts_with("Cannot open file"));

    // The brands file is untouched
    assert_eq!(fs::read_to_string(&brands).unwrap(), "Brand\nHP\n");
}

#[test]
fn builder_requires_both_paths() {
    let error = BrandCountTaskletBuilder::new()
        .brands_path("brands.csv")
        .build()
        .err()
        .unwrap();
    assert_eq!(error.code(), 2);

    let error = BrandCountTaskletBuilder::new()
        .products_path("products.csv")
        .build()
        .err()
        .unwrap();
    assert_eq!(error.code(), 2);
}
