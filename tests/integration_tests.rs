use mps_report_builder::*;
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::path::Path;

fn group_config() -> ReportConfig {
    ReportConfig::from_json_str(
        r#"{
            "mps_category_mapping": {
                "Equipment": ["equipment hire", "equipment purchase"],
                "Staff": ["wages", "contractors"],
                "Travel": ["flights", "accommodation"]
            },
            "exchange_rates": {
                "AUD to GBP": {"2022": {"August": 0.55}},
                "CAD to GBP": {"2022": {"August": 0.6}},
                "USD to GBP": {"2022": {"August": 0.8}}
            }
        }"#,
    )
    .unwrap()
}

/// Writes a workbook shaped like the stock export: three metadata rows, a
/// blank row, the project header line on spreadsheet row 5, the cost rows
/// between the section markers, and the usual trailing furniture.
fn write_report(
    path: &Path,
    company: &str,
    period: &str,
    projects: &[&str],
    costs: &[(&str, &[f64])],
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.write_string(0, 0, company)?;
    worksheet.write_string(1, 0, "Profit and Loss")?;
    worksheet.write_string(2, 0, period)?;

    for (index, header) in projects.iter().enumerate() {
        worksheet.write_string(4, (index + 1) as u16, *header)?;
    }
    worksheet.write_string(4, (projects.len() + 1) as u16, "Total")?;

    worksheet.write_string(5, 0, "Projects")?;
    let mut row = 6u32;
    for (label, values) in costs {
        worksheet.write_string(row, 0, *label)?;
        for (index, value) in values.iter().enumerate() {
            worksheet.write_number(row, (index + 1) as u16, *value)?;
        }
        row += 1;
    }
    worksheet.write_string(row, 0, "Total Projects")?;
    worksheet.write_string(row + 1, 0, "Net Cost of Projects")?;
    worksheet.write_string(row + 2, 0, "Printed 5 September 2022")?;

    workbook.save(path)?;
    Ok(())
}

fn load_reports(dir: &Path, reporter: &MpsReporter) -> Result<Ledger> {
    let mut sheets = Vec::new();
    for path in discover_reports(dir)? {
        sheets.push(read_report(&path)?);
    }
    reporter.build_ledger(&sheets)
}

#[test]
fn test_four_company_month_consolidation() {
    let dir = tempfile::tempdir().unwrap();

    write_report(
        &dir.path().join("australia.xlsx"),
        "Network Mapping Pty Ltd",
        "1-31 August, 2022",
        &["NMAP101 Coastal Survey", "NMAP205 Ridge Mapping"],
        &[
            ("Equipment Hire", &[1000.0, 400.0]),
            ("Wages", &[600.0, 0.0]),
            ("Flights", &[200.0, 100.0]),
        ],
    )
    .unwrap();

    write_report(
        &dir.path().join("canada.xlsx"),
        "Network Mapping Corp",
        "August 1-31, 2022",
        &["NMCP77 Tundra Lidar"],
        &[
            ("Equipment Purchase", &[2000.0]),
            ("Accommodation", &[500.0]),
        ],
    )
    .unwrap();

    write_report(
        &dir.path().join("uk.xlsx"),
        "Network Mapping Limited",
        "1-31 August, 2022",
        &["NMLP9 Highland Flythrough"],
        &[("Wages", &[800.0])],
    )
    .unwrap();

    // The same project shows up here as in the Australian report; the two
    // contributions must land on one ledger row.
    write_report(
        &dir.path().join("usa.xlsx"),
        "Network Mapping Inc",
        "August 2022",
        &["NMIP300 Desert Survey", "NMAP101 Coastal Survey"],
        &[("Contractors", &[1500.0, 250.0])],
    )
    .unwrap();

    let config = group_config();
    let reporter =
        MpsReporter::new(&config, DEFAULT_EXCEL_HEADER_ROW, DEFAULT_PROJECT_CODE_TEMPLATE)
            .unwrap();
    let ledger = load_reports(dir.path(), &reporter).unwrap();

    assert_eq!(
        ledger.rate_columns,
        vec!["AUD to GBP", "CAD to GBP", "USD to GBP"]
    );
    assert_eq!(ledger.categories, vec!["Equipment", "Staff", "Travel"]);

    let codes: Vec<&str> = ledger.rows.iter().map(|r| r.project_code.as_str()).collect();
    assert_eq!(
        codes,
        vec!["NMAP101", "NMAP205", "NMCP77", "NMIP300", "NMLP9"]
    );

    for row in &ledger.rows {
        assert_eq!(row.date, "31/08/2022");
        assert_eq!(row.currency, "GBP");
        assert_eq!(row.rates, vec![0.55, 0.6, 0.8]);
    }

    let merged = &ledger.rows[0];
    assert_eq!(merged.project_name, "Coastal Survey");
    assert_eq!(merged.source_currency, "AUD");
    assert_eq!(
        merged.values,
        vec![1000.0 * 0.55, 600.0 * 0.55 + 250.0 * 0.8, 200.0 * 0.55]
    );

    assert_eq!(
        ledger.rows[1].values,
        vec![400.0 * 0.55, 0.0, 100.0 * 0.55]
    );
    assert_eq!(ledger.rows[2].values, vec![2000.0 * 0.6, 0.0, 500.0 * 0.6]);
    assert_eq!(ledger.rows[3].values, vec![0.0, 1500.0 * 0.8, 0.0]);
    // The UK company reports in the ledger currency already.
    assert_eq!(ledger.rows[4].values, vec![0.0, 800.0, 0.0]);

    let csv = ledger.to_csv_string().unwrap();
    let mut out = File::create("test_mps_report.csv").unwrap();
    ledger.write_csv(&mut out).unwrap();
    assert!(csv.starts_with(
        "Project Code,Project Name,Date,Converted From,Currency,\
         AUD to GBP,CAD to GBP,USD to GBP,Equipment,Staff,Travel"
    ));

    println!("✓ Four company consolidation test passed - output: test_mps_report.csv");
}

#[test]
fn test_labels_sharing_a_category_fold_into_one_column() {
    let dir = tempfile::tempdir().unwrap();

    write_report(
        &dir.path().join("australia.xlsx"),
        "Network Mapping Pty Ltd",
        "1-31 August, 2022",
        &["NMAP101 Coastal Survey", "NMAP205 Ridge Mapping"],
        &[
            ("Flights", &[80.0, 25.0]),
            ("Accommodation", &[40.0, 10.0]),
        ],
    )
    .unwrap();

    let config = group_config();
    let reporter =
        MpsReporter::new(&config, DEFAULT_EXCEL_HEADER_ROW, DEFAULT_PROJECT_CODE_TEMPLATE)
            .unwrap();
    let ledger = load_reports(dir.path(), &reporter).unwrap();

    // Both labels map to Travel, so each project ends up with a single
    // column holding the converted sum.
    assert_eq!(ledger.categories, vec!["Travel"]);
    assert_eq!(ledger.rows.len(), 2);
    assert_eq!(ledger.rows[0].values, vec![(80.0 + 40.0) * 0.55]);
    assert_eq!(ledger.rows[1].values, vec![(25.0 + 10.0) * 0.55]);

    println!("✓ Category folding test passed");
}

#[test]
fn test_drop_folder_skips_foreign_exports() {
    let dir = tempfile::tempdir().unwrap();

    write_report(
        &dir.path().join("august.xlsx"),
        "Network Mapping Pty Ltd",
        "August 2022",
        &["NMAP101 Coastal Survey"],
        &[("Equipment Hire", &[1000.0])],
    )
    .unwrap();

    // A different export type in the same folder: recognized as not ours
    // and skipped rather than failing the run.
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Network Mapping Pty Ltd").unwrap();
    worksheet.write_string(1, 0, "Balance Sheet").unwrap();
    worksheet.write_string(2, 0, "As at 31 August 2022").unwrap();
    workbook.save(dir.path().join("balance.xlsx")).unwrap();

    std::fs::write(dir.path().join("notes.txt"), "not a report").unwrap();

    let config = group_config();
    let reporter =
        MpsReporter::new(&config, DEFAULT_EXCEL_HEADER_ROW, DEFAULT_PROJECT_CODE_TEMPLATE)
            .unwrap();
    let ledger = load_reports(dir.path(), &reporter).unwrap();

    assert_eq!(ledger.rows.len(), 1);
    assert_eq!(ledger.rows[0].project_code, "NMAP101");
    assert_eq!(ledger.rows[0].values, vec![1000.0 * 0.55]);

    println!("✓ Drop folder test passed");
}

#[test]
fn test_unmapped_cost_names_the_label() {
    let dir = tempfile::tempdir().unwrap();

    write_report(
        &dir.path().join("august.xlsx"),
        "Network Mapping Pty Ltd",
        "August 2022",
        &["NMAP101 Coastal Survey"],
        &[("Helicopter Charter", &[9000.0])],
    )
    .unwrap();

    let config = group_config();
    let reporter =
        MpsReporter::new(&config, DEFAULT_EXCEL_HEADER_ROW, DEFAULT_PROJECT_CODE_TEMPLATE)
            .unwrap();
    let error = load_reports(dir.path(), &reporter).unwrap_err();

    assert_eq!(
        error.to_string(),
        "Found unmapped project cost: \"helicopter charter\". Add this mapping to the config."
    );
}

#[test]
fn test_missing_exchange_rate_names_the_period() {
    let dir = tempfile::tempdir().unwrap();

    write_report(
        &dir.path().join("september.xlsx"),
        "Network Mapping Pty Ltd",
        "September 2022",
        &["NMAP101 Coastal Survey"],
        &[("Equipment Hire", &[1000.0])],
    )
    .unwrap();

    let config = group_config();
    let reporter =
        MpsReporter::new(&config, DEFAULT_EXCEL_HEADER_ROW, DEFAULT_PROJECT_CODE_TEMPLATE)
            .unwrap();
    let error = load_reports(dir.path(), &reporter).unwrap_err();

    assert_eq!(
        error.to_string(),
        "No exchange rate for AUD to GBP in September 2022"
    );
}

#[test]
fn test_income_section_joins_the_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uk.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Network Mapping Limited").unwrap();
    worksheet.write_string(1, 0, "Profit and Loss").unwrap();
    worksheet.write_string(2, 0, "August 2022").unwrap();
    worksheet.write_string(4, 1, "NMLP9 Highland Flythrough").unwrap();
    worksheet.write_string(4, 2, "Total").unwrap();
    worksheet.write_string(5, 0, "Income").unwrap();
    worksheet.write_string(6, 0, "Consulting Fees").unwrap();
    worksheet.write_number(6, 1, 3000.0).unwrap();
    worksheet.write_string(7, 0, "Total Income").unwrap();
    worksheet.write_string(8, 0, "Projects").unwrap();
    worksheet.write_string(9, 0, "Equipment Hire").unwrap();
    worksheet.write_number(9, 1, 1200.0).unwrap();
    worksheet.write_string(10, 0, "Total Projects").unwrap();
    worksheet.write_string(11, 0, "Net Cost of Projects").unwrap();
    worksheet.write_string(12, 0, "Printed 5 September 2022").unwrap();
    workbook.save(&path).unwrap();

    let config = ReportConfig::from_json_str(
        r#"{
            "mps_category_mapping": {
                "Equipment": ["equipment hire"],
                "Income": ["consulting fees"]
            },
            "exchange_rates": {
                "AUD to GBP": {"2022": {"August": 0.55}},
                "CAD to GBP": {"2022": {"August": 0.6}},
                "USD to GBP": {"2022": {"August": 0.8}}
            }
        }"#,
    )
    .unwrap();

    let reporter =
        MpsReporter::new(&config, DEFAULT_EXCEL_HEADER_ROW, DEFAULT_PROJECT_CODE_TEMPLATE)
            .unwrap();
    let ledger = load_reports(dir.path(), &reporter).unwrap();

    assert_eq!(ledger.categories, vec!["Equipment", "Income"]);
    assert_eq!(ledger.rows.len(), 1);
    assert_eq!(ledger.rows[0].values, vec![1200.0, 3000.0]);

    println!("✓ Income section test passed");
}

#[test]
fn test_empty_drop_folder_yields_header_only_csv() {
    let dir = tempfile::tempdir().unwrap();

    let config = group_config();
    let reporter =
        MpsReporter::new(&config, DEFAULT_EXCEL_HEADER_ROW, DEFAULT_PROJECT_CODE_TEMPLATE)
            .unwrap();
    let ledger = load_reports(dir.path(), &reporter).unwrap();

    assert!(ledger.rows.is_empty());
    assert_eq!(
        ledger.to_csv_string().unwrap().trim_end(),
        "Project Code,Project Name,Date,Converted From,Currency"
    );
}
