#[cfg(test)]
mod tests {
    use briq::*;

    fn num(n: f64) -> Datum {
        Some(Value::Number(n))
    }

    fn text(s: &str) -> Datum {
        Some(Value::Text(s.to_string()))
    }

    fn nums(values: &[f64]) -> Vec<Datum> {
        values.iter().map(|n| num(*n)).collect()
    }

    fn reduce(func: Summarizer, values: &[Datum]) -> Result<Datum, EvalError> {
        let refs: Vec<&Datum> = values.iter().collect();
        func.reduce(&refs)
    }

    #[test]
    fn test_names_round_trip() {
        for func in Summarizer::ALL {
            assert_eq!(Summarizer::from_name(func.name()), Some(func));
        }
        assert_eq!(Summarizer::from_name("average"), None);
        assert_eq!(Summarizer::OPTIONS.len(), Summarizer::ALL.len());
    }

    #[test]
    fn test_count_ignores_missing() {
        let values = vec![num(1.0), None, text("x")];
        assert_eq!(reduce(Summarizer::Count, &values), Ok(num(2.0)));
    }

    #[test]
    fn test_sum_and_mean() {
        let values = nums(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(reduce(Summarizer::Sum, &values), Ok(num(10.0)));
        assert_eq!(reduce(Summarizer::Mean, &values), Ok(num(2.5)));
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(reduce(Summarizer::Median, &nums(&[3.0, 1.0, 2.0])), Ok(num(2.0)));
        assert_eq!(reduce(Summarizer::Median, &nums(&[4.0, 1.0, 3.0, 2.0])), Ok(num(2.5)));
    }

    #[test]
    fn test_variance_is_population_variance() {
        let values = nums(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(reduce(Summarizer::Variance, &values), Ok(num(4.0)));
        assert_eq!(reduce(Summarizer::StdDev, &values), Ok(num(2.0)));
    }

    #[test]
    fn test_minimum_and_maximum() {
        let values = vec![num(4.0), None, num(-1.0), num(9.0)];
        assert_eq!(reduce(Summarizer::Minimum, &values), Ok(num(-1.0)));
        assert_eq!(reduce(Summarizer::Maximum, &values), Ok(num(9.0)));

        let words = vec![text("pear"), text("apple"), text("zucchini")];
        assert_eq!(reduce(Summarizer::Maximum, &words), Ok(text("zucchini")));
    }

    #[test]
    fn test_all_missing_gives_missing() {
        let values = vec![None, None];
        for func in Summarizer::ALL {
            assert_eq!(reduce(func, &values), Ok(None), "{}", func.name());
        }
        assert_eq!(reduce(Summarizer::Sum, &[]), Ok(None));
    }

    #[test]
    fn test_numeric_functions_reject_text() {
        let values = vec![num(1.0), text("two")];
        for func in [Summarizer::Sum, Summarizer::Mean, Summarizer::Median, Summarizer::Variance] {
            assert!(matches!(reduce(func, &values), Err(EvalError::TypeError(_))));
        }
    }

    #[test]
    fn test_extremes_reject_mixed_types() {
        let values = vec![num(1.0), text("two")];
        assert!(reduce(Summarizer::Maximum, &values).is_err());
    }
}
