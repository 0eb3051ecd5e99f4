use patchguard_truncator::{render, Truncator, TruncatorConfig};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,60}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,8}", inner), 0..8)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Smallest budget the renderer is expected to honour for `value`.
fn floor(value: &Value) -> usize {
    match value {
        Value::Array(_) | Value::Object(_) | Value::String(_) => 5,
        scalar => scalar.to_string().len(),
    }
}

proptest! {
    #[test]
    fn output_stays_within_budget(value in arb_json(), slack in 0usize..400) {
        let limit = floor(&value) + slack;
        let out = render(&value, limit, &TruncatorConfig::default());
        prop_assert!(out.chars().count() <= limit, "{} > {limit}:\n{out}", out.chars().count());
    }

    #[test]
    fn generous_budget_is_untruncated(value in arb_json()) {
        let truncator = Truncator::default();
        let full = truncator.render_full(&value);
        prop_assert_eq!(truncator.render(&value, full.chars().count()), full);
    }
}

#[test]
fn narrow_indent_renders_compactly() {
    let config = TruncatorConfig { indent_width: 0, ..Default::default() };
    assert_eq!(render(&json!({"a": [1]}), 100, &config), "{\n\"a\": [\n1\n]\n}");
}
