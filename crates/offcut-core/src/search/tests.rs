use super::*;

fn packing(offcuts: Vec<Length>) -> PackingResult {
    PackingResult {
        pieces: offcuts.iter().map(|_| vec![10]).collect(),
        offcuts,
        unplaced: Vec::new(),
    }
}

fn config(blade_width: Length) -> SearchConfig {
    SearchConfig {
        blade_width,
        ..SearchConfig::default()
    }
}

#[test]
fn test_two_bars_three_cuts() {
    let mut search = CutSearch::new(
        RawStock::new(vec![100, 100]),
        CutRequirement::new(vec![30, 30, 40]),
        config(2),
    );
    let report = search.run();

    assert_eq!(report.permutations_tested, 3);
    assert_eq!(report.total_offcut, Some(94));

    let best = report.solution().unwrap();
    assert_eq!(best.packing.pieces, vec![vec![32, 42], vec![32]]);
    assert_eq!(best.packing.offcuts, vec![26, 68]);
    assert_eq!(best.sorted_offcuts, vec![26, 68]);
    assert_eq!(best.smallest_offcut, 26);
    assert_eq!(best.smallest_offcut_count, 1);
    assert!(report.warnings.is_empty());

    let summary = report.summary.unwrap();
    assert_eq!(summary.raw_pieces_used, 2);
    assert_eq!(summary.raw_length_used, 200);
    assert_eq!(summary.cut_length, 100);
    assert_eq!(summary.kerf_loss, 6);
    assert_eq!(summary.largest_offcut, 68);
    assert!((summary.waste_percentage - 47.0).abs() < 1e-9);
}

#[test]
fn test_single_bar_drops_cut_and_warns() {
    let mut search = CutSearch::new(
        RawStock::new(vec![50]),
        CutRequirement::new(vec![20, 20, 20]),
        config(0),
    );
    let report = search.run();

    assert_eq!(report.permutations_tested, 1);
    let best = report.solution().unwrap();
    assert_eq!(best.packing.pieces, vec![vec![20, 20]]);
    assert_eq!(best.packing.offcuts, vec![10]);
    assert_eq!(best.packing.unplaced, vec![20]);
    assert_eq!(report.total_offcut, Some(10));
    assert_eq!(
        report.warnings,
        vec![SearchWarning::UnplacedCuts { cuts: vec![20] }]
    );
    assert_eq!(report.summary.unwrap().unplaced_cuts, 1);
}

#[test]
fn test_identical_cuts_search_one_order() {
    let mut search = CutSearch::new(
        RawStock::new(vec![40]),
        CutRequirement::new(vec![10, 10, 10]),
        config(0),
    );
    let report = search.run();
    assert_eq!(report.permutations_tested, 1);
    assert_eq!(report.total_offcut, Some(10));
}

#[test]
fn test_empty_inputs_report_no_solution() {
    let mut no_cuts = CutSearch::new(
        RawStock::new(vec![100]),
        CutRequirement::new(vec![]),
        config(2),
    );
    let report = no_cuts.run();
    assert!(!report.is_solved());
    assert_eq!(report.total_offcut, None);
    assert!(matches!(report.solution(), Err(SearchError::NoSolution)));

    let mut no_stock = CutSearch::new(
        RawStock::new(vec![]),
        CutRequirement::new(vec![10]),
        config(2),
    );
    assert!(!no_stock.run().is_solved());
}

#[test]
fn test_zero_offcut_solution_is_solved() {
    let mut search = CutSearch::new(
        RawStock::new(vec![60]),
        CutRequirement::new(vec![28, 28]),
        config(2),
    );
    let report = search.run();
    assert!(report.is_solved());
    assert_eq!(report.total_offcut, Some(0));
}

#[test]
fn test_lower_total_rejected_without_smaller_remnant() {
    let tracker = BestTracker::new()
        .observe(packing(vec![10, 40]))
        .observe(packing(vec![10, 30]));

    assert_eq!(tracker.accepted(), 1);
    let best = tracker.finish().unwrap();
    assert_eq!(best.total_offcut, 50);
}

#[test]
fn test_lower_total_rejected_with_larger_remnant() {
    let tracker = BestTracker::new()
        .observe(packing(vec![10, 40]))
        .observe(packing(vec![15, 15]));

    let score = tracker.score().unwrap();
    assert_eq!(score.total_offcut, 50);
    assert_eq!(score.smallest_offcut, 10);
}

#[test]
fn test_lower_total_accepted_with_smaller_remnant() {
    let best = BestTracker::new()
        .observe(packing(vec![10, 40]))
        .observe(packing(vec![5, 30]))
        .finish()
        .unwrap();
    assert_eq!(best.total_offcut, 35);
    assert_eq!(best.smallest_offcut, 5);
}

#[test]
fn test_equal_total_prefers_smaller_remnant_then_more_of_them() {
    let tracker = BestTracker::new()
        .observe(packing(vec![20, 20, 20]))
        .observe(packing(vec![10, 25, 25]));
    assert_eq!(tracker.score().unwrap().smallest_offcut, 10);

    let tracker = BestTracker::new()
        .observe(packing(vec![10, 20, 30]))
        .observe(packing(vec![10, 10, 40]));
    assert_eq!(tracker.score().unwrap().smallest_offcut_count, 2);
}

#[test]
fn test_ties_keep_first_candidate() {
    let best = BestTracker::new()
        .observe(packing(vec![10, 30]))
        .observe(packing(vec![30, 10]))
        .finish()
        .unwrap();
    assert_eq!(best.packing.offcuts, vec![10, 30]);
}

#[test]
fn test_higher_total_never_accepted() {
    let tracker = BestTracker::new()
        .observe(packing(vec![10, 10]))
        .observe(packing(vec![1, 100]));
    assert_eq!(tracker.score().unwrap().total_offcut, 20);
    assert_eq!(tracker.observed(), 2);
}

#[test]
fn test_unscoreable_packing_is_ignored() {
    let tracker = BestTracker::new().observe(PackingResult::default());
    assert_eq!(tracker.observed(), 1);
    assert!(tracker.finish().is_none());
}

#[test]
fn test_cache_does_not_change_result() {
    let raw = RawStock::new(vec![120, 100, 80]);
    let needed = CutRequirement::new(vec![25, 35, 35, 50, 60]);

    let mut memo = CutSearch::new(raw.clone(), needed.clone(), config(3));
    let mut plain = CutSearch::with_cache(raw, needed, config(3), NoCache);

    let with_memo = memo.run();
    let without = plain.run();
    assert_eq!(with_memo.best, without.best);
    assert_eq!(with_memo.permutations_tested, without.permutations_tested);
    assert_eq!(with_memo.permutations_tested, 60);
}

#[test]
fn test_pack_hits_cache_on_repeat() {
    let mut search = CutSearch::new(
        RawStock::new(vec![100]),
        CutRequirement::new(vec![10, 20]),
        config(0),
    );
    let first = search.pack(&[20, 10]);
    let second = search.pack(&[20, 10]);
    assert_eq!(first, second);
    assert_eq!(search.cache().hits(), 1);
}

#[test]
fn test_request_from_json_counts() {
    let request = CutRequest::from_json_counts(r#"{"40": 1, "30": 2}"#, r#"{"100": 2}"#).unwrap();
    assert_eq!(request.cut_requirement().lengths(), &[40, 30, 30]);
    assert_eq!(request.raw_stock().lengths(), &[100, 100]);
    assert_eq!(request.blade_width, DEFAULT_BLADE_WIDTH);

    let mut search = CutSearch::from_request(&request).unwrap();
    assert_eq!(search.run().total_offcut, Some(94));
}

#[test]
fn test_count_map_keeps_stock_order() {
    let mut request = CutRequest::from_json_counts(r#"{"50": 2}"#, r#"{"100": 1, "60": 1}"#).unwrap();
    request.blade_width = 0;
    assert_eq!(request.raw_stock().lengths(), &[100, 60]);

    let report = CutSearch::from_request(&request).unwrap().run();
    let best = report.solution().unwrap();
    assert_eq!(best.packing.pieces, vec![vec![50, 50]]);
    assert_eq!(best.packing.offcuts, vec![0]);
    assert_eq!(report.total_offcut, Some(0));
}

#[test]
fn test_count_map_serializes_in_written_order() {
    let spec: LengthSpec = serde_json::from_str(r#"{"100": 1, "60": 2}"#).unwrap();
    assert_eq!(serde_json::to_string(&spec).unwrap(), r#"{"100":1,"60":2}"#);
    assert_eq!(spec.expand(), vec![100, 60, 60]);
}

#[test]
fn test_request_list_keeps_stock_order() {
    let request: CutRequest = serde_json::from_str(
        r#"{"lengths_needed": {"20": 1}, "raw_lengths": [300, 100, 200], "blade_width": 0}"#,
    )
    .unwrap();
    assert_eq!(request.raw_stock().lengths(), &[300, 100, 200]);
    assert_eq!(request.blade_width, 0);
    assert_eq!(request.cache_capacity, DEFAULT_CACHE_CAPACITY);
}

#[test]
fn test_request_from_yaml_counts() {
    let yaml = "lengths_needed:\n  30: 2\n  40: 1\nraw_lengths:\n  100: 2\nblade_width: 2\n";
    let request: CutRequest = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(request.cut_requirement().lengths(), &[30, 30, 40]);
    assert_eq!(request.raw_stock().total(), 200);
}

#[test]
fn test_request_rejects_zero_length() {
    let request = CutRequest::from_json_counts(r#"{"0": 1, "30": 1}"#, r#"{"100": 1}"#).unwrap();
    assert!(matches!(
        CutSearch::from_request(&request),
        Err(SearchError::InvalidInput(_))
    ));

    let zero_count = CutRequest::from_json_counts(r#"{"0": 0, "30": 1}"#, r#"{"100": 1}"#).unwrap();
    assert!(CutSearch::from_request(&zero_count).is_ok());
}

#[test]
fn test_request_rejects_malformed_map() {
    let err = CutRequest::from_json_counts(r#"{"abc": 1}"#, r#"{"100": 1}"#).unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)));
}

#[test]
fn test_request_rejects_padded_length_overflow() {
    let request = CutRequest::from_json_counts(r#"{"18446744073709551615": 1}"#, r#"{"100": 1}"#).unwrap();
    assert!(matches!(
        CutSearch::from_request(&request),
        Err(SearchError::InvalidInput(_))
    ));

    let mut unpadded = request.clone();
    unpadded.blade_width = 0;
    assert!(CutSearch::from_request(&unpadded).is_ok());
}

#[test]
fn test_request_rejects_total_overflow() {
    let request = CutRequest::from_json_counts(
        r#"{"10": 1}"#,
        r#"{"18446744073709551615": 1, "1": 1}"#,
    )
    .unwrap();
    assert!(matches!(
        CutSearch::from_request(&request),
        Err(SearchError::InvalidInput(_))
    ));

    let cuts = CutRequest::from_json_counts(r#"{"9223372036854775807": 2}"#, r#"{"100": 1}"#).unwrap();
    assert!(matches!(
        cuts.validate(),
        Err(SearchError::InvalidInput(_))
    ));
}

#[test]
fn test_request_rejects_too_many_pieces() {
    let request = CutRequest::from_json_counts(r#"{"10": 1}"#, r#"{"1": 4294967295}"#).unwrap();
    match CutSearch::from_request(&request) {
        Err(SearchError::InvalidInput(message)) => assert!(message.contains("Raw stock")),
        other => panic!("expected InvalidInput, got {:?}", other.map(|_| ())),
    }

    let at_limit = CutRequest::from_json_counts(r#"{"10": 1}"#, r#"{"1": 100000}"#).unwrap();
    assert!(at_limit.validate().is_ok());
}

#[test]
fn test_length_spec_validation_matches_request() {
    let spec: LengthSpec = serde_json::from_str(r#"{"0": 1}"#).unwrap();
    let request = CutRequest::from_json_counts(r#"{"0": 1}"#, r#"{"100": 1}"#).unwrap();

    let spec_err = spec.validate_cuts(0).unwrap_err().to_string();
    let request_err = request.validate().unwrap_err().to_string();
    assert_eq!(spec_err, request_err);
}

#[test]
fn test_simulate_saturates_unvalidated_lengths() {
    let result = simulate(&[100], &[Length::MAX], 2);
    assert_eq!(result.offcuts, vec![100]);
    assert_eq!(result.unplaced, vec![Length::MAX]);
}
