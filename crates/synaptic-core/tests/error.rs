use synaptic_core::SynapticError;

#[test]
fn error_variants_display() {
    let errors = vec![
        SynapticError::Model("test".into()),
        SynapticError::Validation("test".into()),
        SynapticError::Embedding("test".into()),
        SynapticError::Loader("test".into()),
        SynapticError::Shape("test".into()),
        SynapticError::DependencyUnavailable("test".into()),
    ];
    for err in &errors {
        assert!(!err.to_string().is_empty());
    }
}

#[test]
fn length_mismatch_names_both_sides() {
    let err = SynapticError::length_mismatch("predictions vs labels", 3, 2);
    assert_eq!(
        err.to_string(),
        "length mismatch in predictions vs labels: 3 vs 2"
    );
}

#[test]
fn key_errors_name_the_sample() {
    let missing = SynapticError::MissingKey {
        key: "answers".into(),
        sample: 4,
    };
    assert_eq!(missing.to_string(), "missing key `answers` in sample 4");

    let ambiguous = SynapticError::AmbiguousKey {
        key: "answers".into(),
        sample: 0,
        components: vec!["reader".into(), "ranker".into()],
    };
    let msg = ambiguous.to_string();
    assert!(msg.contains("reader"));
    assert!(msg.contains("ranker"));
}
