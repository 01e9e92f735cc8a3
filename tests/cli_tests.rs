#![cfg(feature = "cli")]

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use briq::cli::{self, CheckOptions, CliError, OutputFormat, RunOptions};
    use briq::*;

    /// Write a fixture file into a per-test scratch directory.
    fn fixture(test: &str, name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("briq-{}-{}", test, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    const PROGRAM: &str = r#"{
        "totals": [
            ["@stage", "read", "sales"],
            ["@stage", "groupBy", ["region"]],
            ["@stage", "summarize", "sum", "amount"],
            ["@stage", "notify", "totals"]
        ],
        "top": [
            ["@stage", "read", "totals"],
            ["@stage", "sort", ["amount"], true],
            ["@stage", "select", ["region"]]
        ]
    }"#;

    const SALES: &str = "region,amount,paid\nnorth,10,true\nsouth,5,false\nnorth,7,\n";

    #[test]
    fn test_csv_types_are_inferred() {
        let table = cli::parse_csv_table(SALES.as_bytes()).unwrap();
        assert_eq!(table.columns(), ["region", "amount", "paid"]);
        let first = &table.rows()[0];
        assert_eq!(first["region"], Some(Value::Text("north".to_string())));
        assert_eq!(first["amount"], Some(Value::Number(10.0)));
        assert_eq!(first["paid"], Some(Value::Logical(true)));
        assert_eq!(table.rows()[2]["paid"], None);
    }

    #[test]
    fn test_csv_infers_datetimes() {
        let table = cli::parse_csv_table("when,label\n1983-12-02,2021-03-04 oops\n".as_bytes()).unwrap();
        let row = &table.rows()[0];
        assert!(matches!(row["when"], Some(Value::Datetime(_))));
        assert_eq!(row["label"], Some(Value::Text("2021-03-04 oops".to_string())));
    }

    #[test]
    fn test_csv_with_only_header_keeps_columns() {
        let table = cli::parse_csv_table("a,b\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), ["a", "b"]);
    }

    #[test]
    fn test_csv_duplicate_header_fails() {
        let err = cli::parse_csv_table("a,a\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CliError::DuplicateHeader(ref h) if h == "a"));
    }

    #[test]
    fn test_parse_source_arg() {
        let (name, path) = cli::parse_source_arg("sales=data/sales.csv").unwrap();
        assert_eq!(name, "sales");
        assert_eq!(path, PathBuf::from("data/sales.csv"));
        assert!(matches!(cli::parse_source_arg("sales"), Err(CliError::SourceArg(_))));
        assert!(matches!(cli::parse_source_arg("=x.csv"), Err(CliError::SourceArg(_))));
    }

    #[test]
    fn test_load_source_rejects_unknown_extension() {
        let path = fixture("ext", "sales.txt", SALES);
        assert!(matches!(cli::load_source(&path), Err(CliError::SourceFormat(_))));
    }

    #[test]
    fn test_check_prints_run_order() {
        let program = fixture("check", "program.json", PROGRAM);
        let order = cli::execute_check(&CheckOptions { program }).unwrap();
        assert_eq!(order, vec!["totals", "top"]);
    }

    #[test]
    fn test_check_reports_cycle() {
        let program = fixture(
            "cycle",
            "program.json",
            r#"{"a": [["@stage", "read", "B"], ["@stage", "notify", "A"]],
                "b": [["@stage", "read", "A"], ["@stage", "notify", "B"]]}"#,
        );
        let err = cli::execute_check(&CheckOptions { program }).unwrap_err();
        assert!(matches!(err, CliError::Program(ProgramError::Cycle(_))));
    }

    #[test]
    fn test_run_writes_json_report() {
        let options = RunOptions {
            program: fixture("run-json", "program.json", PROGRAM),
            sources: vec![("sales".to_string(), fixture("run-json", "sales.csv", SALES))],
            pretty: false,
            format: OutputFormat::Json,
        };
        let mut out = Vec::new();
        let summary = cli::execute_run(&options, &mut out).unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.succeeded, 2);

        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(report["totals"]["status"], "succeeded");
        assert_eq!(
            report["top"]["table"],
            serde_json::json!([{"region": "north"}, {"region": "south"}])
        );
    }

    #[test]
    fn test_run_reports_failures_as_csv() {
        let program = r#"{
            "bad": [["@stage", "read", "sales"], ["@stage", "select", ["nope"]], ["@stage", "notify", "S"]],
            "after": [["@stage", "read", "S"]]
        }"#;
        let options = RunOptions {
            program: fixture("run-csv", "program.json", program),
            sources: vec![("sales".to_string(), fixture("run-csv", "sales.csv", SALES))],
            pretty: false,
            format: OutputFormat::Csv,
        };
        let mut out = Vec::new();
        let summary = cli::execute_run(&options, &mut out).unwrap();
        assert_eq!((summary.failed, summary.blocked), (1, 1));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("# bad: failed: Stage 1 (select) failed"));
        assert!(text.contains("# after: blocked"));
    }

    #[test]
    fn test_catalog_lists_everything() {
        let catalog = cli::catalog();
        assert_eq!(catalog["stages"].as_array().map(Vec::len), Some(Stage::KINDS.len()));
        assert_eq!(catalog["operators"]["unary"].as_array().map(Vec::len), Some(UnaryOp::ALL.len()));
        assert_eq!(catalog["operators"]["binary"].as_array().map(Vec::len), Some(BinOp::ALL.len()));
        assert_eq!(catalog["operators"]["ternary"][0], "ifElse");
        assert_eq!(catalog["summarize"][5], "stdDev");
    }
}
