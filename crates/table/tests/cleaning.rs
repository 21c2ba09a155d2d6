use sweeper_table::{CellValue, DataType, Table, TableError};

fn sample() -> Table {
    Table::from_csv_str(
        "city,visits,rating,open\n\
         Oslo,3,4.5,true\n\
         Oslo,3,4.5,true\n\
         Bergen,,3.0,false\n\
         Tromso,7,,\n\
         Bergen,,3.0,false",
    )
    .unwrap()
}

#[test]
fn test_inferred_types() {
    let table = sample();
    assert_eq!(table.dtype("city").unwrap(), DataType::Text);
    assert_eq!(table.dtype("visits").unwrap(), DataType::Int);
    assert_eq!(table.dtype("rating").unwrap(), DataType::Float);
    assert_eq!(table.dtype("open").unwrap(), DataType::Bool);
    assert_eq!(table.numeric_columns(), vec!["visits", "rating"]);
    assert_eq!(table.missing_count(), 4);
}

#[test]
fn test_dedup_is_idempotent() {
    let once = sample().drop_duplicates();
    assert_eq!(once.row_count(), 3);
    assert_eq!(once.drop_duplicates(), once);
}

#[test]
fn test_fill_missing_is_idempotent_and_exact() {
    let table = sample();
    let filled = table.fill_missing_numeric();

    assert_eq!(filled.get(2, "visits").unwrap(), &CellValue::Int(0));
    assert_eq!(filled.get(3, "rating").unwrap(), &CellValue::Float(0.0));
    // non-numeric columns keep their missing cells
    assert_eq!(filled.get(3, "open").unwrap(), &CellValue::Null);
    assert_eq!(filled.missing_count(), 1);

    for row in 0..table.row_count() {
        for name in ["city", "open"] {
            assert_eq!(filled.get(row, name).unwrap(), table.get(row, name).unwrap());
        }
    }
    assert_eq!(filled.fill_missing_numeric(), filled);
}

#[test]
fn test_project_keeps_rows() {
    let table = sample();
    let projected = table.project(&["rating", "city"]).unwrap();

    assert_eq!(projected.column_names(), vec!["rating", "city"]);
    assert_eq!(projected.row_count(), table.row_count());
    for row in 0..table.row_count() {
        assert_eq!(projected.get(row, "city").unwrap(), table.get(row, "city").unwrap());
        assert_eq!(projected.get(row, "rating").unwrap(), table.get(row, "rating").unwrap());
    }
}

#[test]
fn test_project_unknown_column() {
    let err = sample().project(&["city", "country"]).unwrap_err();
    assert!(matches!(err, TableError::ColumnNotFound { name } if name == "country"));
}

#[test]
fn test_transforms_compose_in_any_order() {
    let table = sample();
    let a = table.drop_duplicates().fill_missing_numeric();
    let b = table.fill_missing_numeric().drop_duplicates();
    assert_eq!(a, b);

    let c = table
        .project(&["city", "visits"])
        .unwrap()
        .drop_duplicates()
        .fill_missing_numeric();
    assert_eq!(c.row_count(), 3);
    assert_eq!(c.missing_count(), 0);
}

#[test]
fn test_csv_export_reloads_equal() {
    let table = sample().drop_duplicates();
    let bytes = table.to_csv_bytes().unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(Table::from_csv_str(&text).unwrap(), table);
}

#[test]
fn test_records_serialize_in_column_order() {
    let table = sample().head(1);
    let json = serde_json::to_string(&table.to_records()).unwrap();
    assert_eq!(
        json,
        r#"[{"city":"Oslo","visits":3,"rating":4.5,"open":true}]"#
    );
}
