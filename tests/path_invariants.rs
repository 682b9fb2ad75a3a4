use serde_json::json;

use rewrap::detector::find_transform_targets;
use rewrap::filter::schema_to_data_path;
use rewrap::rewriter::{rewrite, wrap_value_at, LookupOutcome};
use rewrap::{DocumentOutcome, FieldPath};

#[test]
fn single_sentinel_paths_are_trail_end_fixed_points() {
    for raw in ["a.xitem", "outer.inner.xitem", "a.xitem.leaf"] {
        let path = FieldPath::parse(raw).unwrap();
        assert_eq!(path.trail_end().unwrap(), path);
    }
}

#[test]
fn double_sentinel_paths_trim_to_the_trailing_span() {
    let path = FieldPath::parse("x.xitem.y.xitem.z").unwrap();
    assert_eq!(path.trail_end().unwrap().to_string(), "y.xitem.z");
}

#[test]
fn detector_flags_exactly_the_polymorphic_sequence() {
    let schema = json!({
        "properties": {
            "items": {
                "type": "array",
                "xitems": {"type": ["object", "string"]}
            },
            "plain": {
                "type": "array",
                "xitems": {"type": "string"}
            }
        }
    });
    let targets = find_transform_targets(&schema);
    assert_eq!(targets.len(), 1);
    let target = targets.iter().next().unwrap();
    assert_eq!(target, "properties.items.xitems.type");
    assert_eq!(schema_to_data_path(target), "items.xitem");
}

#[test]
fn mixed_array_rewrites_only_the_string_element() {
    let mut document = json!({"a": [{"x": 1}, "hello", {"x": 2}]});
    let path = FieldPath::parse("a.xitem").unwrap();
    let result = rewrite(&mut document, &[path]);

    assert_eq!(result.outcome, DocumentOutcome::Success);
    let tally = &result.paths[0];
    assert_eq!(tally.expected, 1);
    assert_eq!(tally.rewritten, 1);
    assert_eq!(
        document,
        json!({"a": [{"x": 1}, {"text": ["hello"]}, {"x": 2}]})
    );
}

#[test]
fn round_trip_success_wraps_every_original_string_in_place() {
    let strings = ["alpha", "beta", "gamma", "delta"];
    let mut document = json!({"a": strings});
    let path = FieldPath::parse("a.xitem").unwrap();
    let result = rewrite(&mut document, &[path]);

    assert!(result.is_success());
    let elements = document["a"].as_array().unwrap();
    assert_eq!(elements.len(), strings.len());
    for (element, original) in elements.iter().zip(strings) {
        assert_eq!(element, &json!({"text": [original]}));
    }
}

#[test]
fn rewrapping_an_already_wrapped_location_is_additive() {
    let mut document = json!({"a": ["seed"]});
    let location = FieldPath::parse("a[0]").unwrap();

    assert_eq!(
        wrap_value_at(&mut document, &location, "one").unwrap(),
        LookupOutcome::Wrapped
    );
    assert_eq!(
        wrap_value_at(&mut document, &location, "two").unwrap(),
        LookupOutcome::Appended
    );
    assert_eq!(document, json!({"a": [{"text": ["one", "two"]}]}));
}
