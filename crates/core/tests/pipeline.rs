use sweeper_core::table::{CellValue, DataType, Table, TableError};
use sweeper_core::{
    Action, Outcome, Pipeline, SweeperError, TargetFormat, UploadStatus, UploadedFile,
};

fn loaded(name: &str, content: &str) -> Pipeline {
    let mut pipeline = Pipeline::default();
    let file = UploadedFile::new(name, content.as_bytes().to_vec());
    let report = pipeline.upload(&file).unwrap();
    assert!(report.is_loaded());
    pipeline
}

#[test]
fn test_dedup_scenario() {
    let mut pipeline = loaded("letters.csv", "k,v\na,1\na,1\nb,2");

    let outcome = pipeline
        .handle(Action::Deduplicate {
            file: "letters.csv".to_string(),
        })
        .unwrap();
    let Outcome::Cleaned(report) = outcome else {
        panic!("expected a cleaned outcome");
    };
    assert_eq!(report.rows_removed(), 1);

    let table = pipeline.table("letters.csv").unwrap();
    assert_eq!(table.rows(), &[
        vec![CellValue::from("a"), CellValue::Int(1)],
        vec![CellValue::from("b"), CellValue::Int(2)],
    ]);
}

#[test]
fn test_fill_scenario() {
    let mut pipeline = loaded("x.csv", "x\n1\nNA\n3");
    pipeline.fill_missing("x.csv").unwrap();

    let table = pipeline.table("x.csv").unwrap();
    assert_eq!(table.dtype("x").unwrap(), DataType::Int);
    let values: Vec<_> = table.column("x").unwrap().into_iter().cloned().collect();
    assert_eq!(values, vec![CellValue::Int(1), CellValue::Int(0), CellValue::Int(3)]);

    let again = pipeline.fill_missing("x.csv").unwrap();
    assert_eq!(again.cells_filled(), 0);
}

#[test]
fn test_projection_with_unknown_column_leaves_session_unchanged() {
    let mut pipeline = loaded("p.csv", "a,b\n1,2\n3,4");
    let before = pipeline.table("p.csv").unwrap().clone();

    let err = pipeline
        .handle(Action::SelectColumns {
            file: "p.csv".to_string(),
            columns: vec!["a".to_string(), "z".to_string()],
        })
        .unwrap_err();

    assert!(matches!(
        err,
        SweeperError::Table(TableError::ColumnNotFound { ref name }) if name == "z"
    ));
    assert_eq!(pipeline.table("p.csv").unwrap(), &before);
}

#[test]
fn test_export_cleaned_table_as_spreadsheet() {
    let mut pipeline = loaded("report.csv", "k,v\na,1\na,1\nb,");
    pipeline.deduplicate("report.csv").unwrap();
    pipeline.fill_missing("report.csv").unwrap();

    let outcome = pipeline
        .handle(Action::Export {
            file: "report.csv".to_string(),
            target: "Excel".parse::<TargetFormat>().unwrap(),
        })
        .unwrap();
    let Outcome::Download(download) = outcome else {
        panic!("expected a download");
    };

    assert_eq!(download.file_name, "report.xlsx");
    assert_eq!(
        download.mime_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let restored = Table::from_xlsx_bytes(&download.bytes).unwrap();
    assert_eq!(&restored, pipeline.table("report.csv").unwrap());
}

#[test]
fn test_csv_export_loads_back_equal() {
    let pipeline = loaded(
        "mixed.csv",
        "id,score,when,ok,label\n1,0.5,2024-01-02 03:04:05,true,x\n2,,2024-02-03,false,\n3,2.0,,,z",
    );
    let download = pipeline.export("mixed.csv", TargetFormat::Csv).unwrap();
    assert_eq!(download.file_name, "mixed.csv");
    assert_eq!(download.mime_type, "text/csv");

    let reloaded = loaded("mixed.csv", std::str::from_utf8(&download.bytes).unwrap());
    assert_eq!(reloaded.table("mixed.csv").unwrap(), pipeline.table("mixed.csv").unwrap());
}

#[test]
fn test_visualize_reads_current_table() {
    let mut pipeline = loaded("v.csv", "name,a,b,c\nx,1,2.5,9\ny,,3.5,8");
    pipeline.select_columns("v.csv", &["c", "b"]).unwrap();

    let pair = pipeline.visualize("v.csv").unwrap();
    let names: Vec<_> = pair.series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["c", "b"]);
    assert_eq!(pair.index, vec![0, 1]);
}

#[test]
fn test_batch_upload_is_per_file() {
    let mut pipeline = Pipeline::default();
    let outcome = pipeline
        .handle(Action::Upload(vec![
            UploadedFile::new("good.csv", b"a\n1".to_vec()),
            UploadedFile::new("bad.json", b"{}".to_vec()),
            UploadedFile::new("empty.csv", Vec::new()),
            UploadedFile::new("other.csv", b"b\n2".to_vec()),
        ]))
        .unwrap();
    let Outcome::Uploaded(reports) = outcome else {
        panic!("expected upload reports");
    };

    let statuses: Vec<_> = reports.iter().map(|r| r.is_loaded()).collect();
    assert_eq!(statuses, vec![true, false, false, true]);

    let Outcome::Files(files) = pipeline.handle(Action::ListFiles).unwrap() else {
        panic!("expected a file listing");
    };
    let names: Vec<_> = files.iter().map(|f| f.metadata.name.as_str()).collect();
    assert_eq!(names, vec!["good.csv", "other.csv"]);

    let json = serde_json::to_value(&reports[1]).unwrap();
    assert_eq!(json["status"], "skipped");
    assert!(matches!(reports[0].status, UploadStatus::Loaded { .. }));
}
