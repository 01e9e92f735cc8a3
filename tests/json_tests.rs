#[cfg(test)]
mod tests {
    use briq::output::{expr_to_json, program_to_json, stage_to_json};
    use briq::*;
    use serde_json::json;

    fn num(n: f64) -> Datum {
        Some(Value::Number(n))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    #[test]
    fn test_parse_object_form() {
        let json = json!({
            "family": "@op", "species": "add",
            "left": {"family": "@value", "species": "column", "value": "price"},
            "right": {"family": "@value", "species": "number", "value": 2}
        });
        assert_eq!(
            parse_expr(&json).unwrap(),
            Expr::binary(BinOp::Add, Expr::column("price"), Expr::number(2.0))
        );
    }

    #[test]
    fn test_positional_and_object_forms_agree() {
        let positional = json!(["@op", "ifElse",
            ["@op", "isMissing", ["@value", "column", "a"]],
            ["@value", "absent"],
            ["@op", "multiply", ["@value", "column", "a"], ["@value", "number", 3]]
        ]);
        let object = json!({
            "family": "@op", "species": "ifElse",
            "left": {"family": "@op", "species": "isMissing",
                     "arg": {"family": "@value", "species": "column", "value": "a"}},
            "middle": {"family": "@value", "species": "absent"},
            "right": {"family": "@op", "species": "multiply",
                      "left": {"family": "@value", "species": "column", "value": "a"},
                      "right": {"family": "@value", "species": "number", "value": 3}}
        });
        assert_eq!(parse_expr(&positional).unwrap(), parse_expr(&object).unwrap());
    }

    #[test]
    fn test_parse_leaves() {
        assert_eq!(parse_expr(&json!(["@value", "logical", true])).unwrap(), Expr::logical(true));
        assert_eq!(parse_expr(&json!(["@value", "text", "hi"])).unwrap(), Expr::text("hi"));
        assert_eq!(parse_expr(&json!(["@value", "string", "hi"])).unwrap(), Expr::text("hi"));
        assert_eq!(parse_expr(&json!(["@value", "rowIndex"])).unwrap(), Expr::RowIndex);
        assert!(matches!(
            parse_expr(&json!(["@value", "datetime", "1983-12-02"])).unwrap(),
            Expr::Constant(Some(Value::Datetime(_)))
        ));
    }

    #[test]
    fn test_operator_aliases() {
        assert_eq!(
            parse_expr(&json!(["@op", "toString", ["@value", "number", 1]])).unwrap(),
            Expr::unary(UnaryOp::ToText, Expr::number(1.0))
        );
    }

    #[test]
    fn test_malformed_expressions_name_path() {
        let err = parse_expr(&json!({"family": "@op", "species": "add",
            "left": {"family": "@value", "species": "number", "value": 1}}))
        .unwrap_err();
        assert!(matches!(err, ParseError::Malformed { ref message, .. } if message.contains("right")));

        let err = parse_expr(&json!(["@op", "frobnicate", ["@value", "absent"]])).unwrap_err();
        assert!(err.to_string().contains("frobnicate"));

        let err = parse_expr(&json!(["@op", "negate", ["@value", "number", "one"]])).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { ref path, .. } if path == "arg.value"));
    }

    // ========================================================================
    // Stages
    // ========================================================================

    #[test]
    fn test_parse_stages() {
        assert_eq!(
            parse_stage(&json!(["@stage", "sort", ["a", "b"], true])).unwrap(),
            Stage::Sort {
                columns: vec!["a".to_string(), "b".to_string()],
                descending: true,
            }
        );
        assert_eq!(
            parse_stage(&json!({"family": "@stage", "kind": "sort", "columns": "a"})).unwrap(),
            Stage::Sort { columns: vec!["a".to_string()], descending: false }
        );
        assert_eq!(
            parse_stage(&json!({"family": "@stage", "kind": "summarize", "func": "mean", "column": "v"}))
                .unwrap(),
            Stage::Summarize { func: Summarizer::Mean, column: "v".to_string() }
        );
        assert_eq!(
            parse_stage(&json!(["@stage", "ungroup"])).unwrap(),
            Stage::Ungroup
        );
    }

    #[test]
    fn test_group_alias_and_comma_separated_columns() {
        assert_eq!(
            parse_stage(&json!({"family": "@stage", "kind": "group", "columns": "a, b"})).unwrap(),
            Stage::GroupBy { columns: vec!["a".to_string(), "b".to_string()] }
        );
    }

    #[test]
    fn test_stage_field_validation() {
        assert!(parse_stage(&json!({"family": "@stage", "kind": "select", "columns": []})).is_err());
        assert!(parse_stage(&json!({"family": "@stage", "kind": "select", "columns": " , "})).is_err());
        assert!(parse_stage(&json!({"family": "@stage", "kind": "read", "source": ""})).is_err());
        let err = parse_stage(&json!({"family": "@stage", "kind": "summarize", "func": "avg", "column": "v"}))
            .unwrap_err();
        assert!(err.to_string().contains("avg"));
        assert!(parse_stage(&json!({"family": "@stage", "kind": "explode"})).is_err());
        assert!(parse_stage(&json!({"family": "@op", "species": "add"})).is_err());
    }

    // ========================================================================
    // Programs and tables
    // ========================================================================

    #[test]
    fn test_parse_program_keeps_definition_order() {
        let program = parse_program_str(r#"{
            "second": [["@stage", "read", "src"]],
            "first": [["@stage", "read", "src"], ["@stage", "notify", "S"]]
        }"#)
        .unwrap();
        let names: Vec<&String> = program.pipelines().keys().collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn test_program_error_path() {
        let err = parse_program(&json!({"main": [["@stage", "read", "src"], ["@stage", "drop"]]}))
            .unwrap_err();
        assert!(matches!(err, ParseError::Malformed { ref path, .. } if path == "main[1]"));
    }

    #[test]
    fn test_invalid_json_text() {
        assert!(matches!(parse_program_str("{not json"), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_parse_table() {
        let table = parse_table(&json!([
            {"a": 1, "b": "x", "c": null, "d": true},
            {"a": 2.5, "b": "y", "c": 3, "d": false}
        ]))
        .unwrap();
        assert_eq!(table.columns(), ["a", "b", "c", "d"]);
        assert_eq!(table.rows()[0]["c"], None);
        assert_eq!(table.rows()[1]["a"], num(2.5));

        assert!(parse_table(&json!([{"a": [1, 2]}])).is_err());
        assert!(matches!(
            parse_table(&json!([{"a": 1}, {"b": 2}])),
            Err(ParseError::Table(TableError::RaggedRow { .. }))
        ));
    }

    // ========================================================================
    // Output
    // ========================================================================

    #[test]
    fn test_encoded_program_parses_back_and_runs_identically() {
        let program = parse_program(&json!({
            "main": [
                ["@stage", "read", "src"],
                ["@stage", "mutate", "z",
                    ["@op", "ifElse",
                        ["@op", "greater", ["@value", "column", "x"], ["@value", "number", 1]],
                        ["@op", "toText", ["@value", "rowIndex"]],
                        ["@value", "absent"]]],
                ["@stage", "filter", ["@op", "or",
                    ["@op", "isMissing", ["@value", "column", "z"]],
                    ["@value", "logical", true]]],
                ["@stage", "groupBy", ["x"]],
                ["@stage", "summarize", "count", "z"],
                ["@stage", "sort", ["x"], true],
                ["@stage", "notify", "done"]
            ]
        }))
        .unwrap();

        let reparsed = parse_program(&program_to_json(&program)).unwrap();
        assert_eq!(reparsed, program);

        let src = parse_table(&json!([{"x": 1}, {"x": 2}, {"x": 2}])).unwrap();
        let run = |p: &Program| {
            let mut ctx = RunContext::new().with_source("src", src.clone());
            p.run(&mut ctx).unwrap()
        };
        assert_eq!(run(&reparsed), run(&program));
    }

    #[test]
    fn test_expr_to_json_uses_object_form() {
        let expr = Expr::unary(UnaryOp::Not, Expr::column("ok"));
        assert_eq!(
            expr_to_json(&expr),
            json!({
                "family": "@op", "species": "not",
                "arg": {"family": "@value", "species": "column", "value": "ok"}
            })
        );
        assert_eq!(
            stage_to_json(&Stage::Notify { signal: "S".to_string() }),
            json!({"family": "@stage", "kind": "notify", "signal": "S"})
        );
    }

    #[test]
    fn test_table_output() {
        let table = parse_table(&json!([{"a": 1, "b": null}, {"a": 2.5, "b": "x,y"}])).unwrap();
        assert_eq!(to_json(&table_to_json(&table)), r#"[{"a":1,"b":null},{"a":2.5,"b":"x,y"}]"#);

        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a,b\n1,\n2.5,\"x,y\"\n");
    }

    #[test]
    fn test_datetimes_come_back_as_text() {
        let table = parse_table(&json!([{"d": "2021-03-04T00:00:00"}])).unwrap();
        let expr = Expr::unary(UnaryOp::ToDatetime, Expr::column("d"));
        let out = apply_stage(
            &Stage::Mutate { column: "d".to_string(), expr },
            table,
            &RunContext::new(),
        )
        .unwrap();
        assert!(matches!(out.rows()[0]["d"], Some(Value::Datetime(_))));
        assert_eq!(to_json(&table_to_json(&out)), r#"[{"d":"2021-03-04T00:00:00"}]"#);

        let reread = parse_table(&table_to_json(&out)).unwrap();
        assert_eq!(reread.rows()[0]["d"], Some(Value::Text("2021-03-04T00:00:00".to_string())));
    }
}
