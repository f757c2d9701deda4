//! End-to-end properties of the hydration engine and cloner, exercised
//! through the public API only.

use hydrator_core::{
    EntityRegistry, EntityType, Schema, Value, hydrate_root, parse_entities, parse_schema,
};
use serde_json::json;

#[test]
fn hydrated_graph_round_trips_through_clone() {
    let address = EntityType::new("Address", [
        ("city", Schema::string()),
        ("zip", Schema::string().optional()),
    ]);
    let user = EntityType::new("User", [
        ("name", Schema::string()),
        ("home", Schema::entity(&address)),
        ("tags", Schema::array(Schema::string())),
    ]);

    let input = Value::from(json!({
        "name": "ada",
        "home": { "city": "London", "zip": "EC1" },
        "tags": ["admin", "ops"],
    }));

    let hydrated = user.hydrate(&input).unwrap();
    let copy = hydrated.deep_clone();

    assert_eq!(copy, hydrated);
    assert!(!copy.ptr_eq(&hydrated));
}

#[test]
fn shared_fields_stay_shared_in_clone() {
    let node = EntityType::new("Holder", [
        ("a", Schema::array(Schema::number()).optional()),
        ("b", Schema::array(Schema::number()).optional()),
    ]);

    // Build a graph where two fields alias the same array.
    let shared = Value::array([Value::from(1)]);
    let hydrated = node
        .hydrate(&Value::from(json!({})))
        .unwrap();
    {
        let mut instance = hydrated.as_entity().unwrap().borrow_mut();
        instance.set("a", shared.clone());
        instance.set("b", shared.clone());
    }

    let copy = hydrated.deep_clone();
    let instance = copy.as_entity().unwrap().borrow();
    let a = instance.get("a").cloned().unwrap();
    let b = instance.get("b").cloned().unwrap();
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&shared));
}

#[test]
fn two_entity_cycle_clones_and_terminates() {
    let node = EntityType::declare("Node");
    node.define([
        ("id", Schema::number()),
        ("next", Schema::entity(&node).optional()),
    ]);

    let a = node.hydrate(&Value::from(json!({ "id": 1 }))).unwrap();
    let b = node.hydrate(&Value::from(json!({ "id": 2 }))).unwrap();
    a.as_entity().unwrap().borrow_mut().set("next", b.clone());
    b.as_entity().unwrap().borrow_mut().set("next", a.clone());

    let copy = a.deep_clone();

    // clone(A).next.next === clone(A)
    let next = copy.as_entity().unwrap().borrow().get("next").cloned().unwrap();
    let back = next.as_entity().unwrap().borrow().get("next").cloned().unwrap();
    assert!(back.ptr_eq(&copy));
    assert!(!back.ptr_eq(&a));
}

#[test]
fn required_missing_field_fails_with_path() {
    let schema = Schema::object([("x", Schema::number())]);
    let err = hydrate_root(&Value::from(json!({})), &schema).unwrap_err();
    assert_eq!(err.path(), Some("x"));
}

#[test]
fn optional_default_absorbs_invalid_input() {
    let schema = Schema::object([("x", Schema::number().default_value(7))]);
    let out = hydrate_root(&Value::from(json!({ "x": "bad" })), &schema).unwrap();
    let obj = out.as_object().unwrap().borrow();
    assert_eq!(obj.get("x"), Some(&Value::from(7)));
}

#[test]
fn skip_invalid_drops_elements_preserving_order() {
    let schema = Schema::array(Schema::number()).skip_invalid();
    let out = hydrate_root(&Value::from(json!([1, "a", 2])), &schema).unwrap();
    assert_eq!(out, Value::array([Value::from(1), Value::from(2)]));
}

#[test]
fn nested_failure_reports_dotted_path() {
    let schema = Schema::object([("a", Schema::object([("b", Schema::number())]))]);
    let err = hydrate_root(&Value::from(json!({ "a": { "b": "x" } })), &schema).unwrap_err();
    assert_eq!(err.path(), Some("a.b"));
    assert_eq!(
        err.to_string(),
        "Failed to parse required property at path 'a.b': expected number, found string"
    );
}

#[test]
fn dynamic_map_hydrates_and_reports_key_paths() {
    let schema = Schema::map(Schema::string());

    let ok = hydrate_root(&Value::from(json!({ "k1": "v1", "k2": "v2" })), &schema).unwrap();
    let obj = ok.as_object().unwrap().borrow();
    assert_eq!(obj.get("k1"), Some(&Value::from("v1")));
    assert_eq!(obj.get("k2"), Some(&Value::from("v2")));
    drop(obj);

    let err = hydrate_root(&Value::from(json!({ "k1": 1 })), &schema).unwrap_err();
    assert_eq!(err.path(), Some("k1"));
}

#[test]
fn wire_format_drives_the_full_pipeline() {
    let mut registry = EntityRegistry::new();
    parse_entities(
        &json!({
            "Item": { "sku": "string", "qty": { "type": "number", "required": false, "default": 1 } },
        }),
        &mut registry,
    )
    .unwrap();

    let schema = parse_schema(
        &json!({ "type": "array", "children": "Item", "skipInvalid": true }),
        &registry,
    )
    .unwrap();

    let input = Value::from(json!([
        { "sku": "a-1" },
        "not an item",
        { "sku": "b-2", "qty": 4 },
    ]));

    let out = hydrate_root(&input, &schema).unwrap();
    let items = out.as_array().unwrap().borrow();
    assert_eq!(items.len(), 2);

    let first = items[0].as_entity().unwrap().borrow();
    assert_eq!(first.get("qty"), Some(&Value::from(1)));
    let second = items[1].as_entity().unwrap().borrow();
    assert_eq!(second.get("qty"), Some(&Value::from(4)));
}

#[test]
fn hydrated_output_serializes_as_plain_data() {
    let user = EntityType::new("User", [
        ("name", Schema::string()),
        ("nickname", Schema::string().optional()),
    ]);
    let hydrated = user
        .hydrate(&Value::from(json!({ "name": "ada" })))
        .unwrap();

    let rendered: serde_json::Value =
        serde_json::to_value(&hydrated).unwrap();
    assert_eq!(rendered, json!({ "name": "ada" }));
}
