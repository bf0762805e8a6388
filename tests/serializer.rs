use erlterm::{serialize, Key, Scheme, SerializeError, Serializer, Value};
use serde_json::json;

fn assert_serialized(expected: &str, value: Value, scheme: Scheme) {
    let actual = serialize(&value, &scheme).unwrap();
    assert_eq!(actual.as_deref(), Some(expected));
}

#[test]
fn null() {
    assert_serialized("nil", Value::Nil, Scheme::new());
}

#[test]
fn numeric_string_defaults_to_number() {
    assert_serialized("12345", Value::from("12345"), Scheme::new());
}

#[test]
fn numeric_string_as_string() {
    assert_serialized("\"123\"", Value::from("123"), Scheme::from([("::numeric", "string")]));
}

#[test]
fn string() {
    assert_serialized("\"string\"", Value::from("string"), Scheme::new());
}

#[test]
fn string_escaping() {
    assert_serialized(r#""\"""#, Value::from("\""), Scheme::new());
    assert_serialized(r#""\\""#, Value::from("\\"), Scheme::new());
    assert_serialized("\"it's\"", Value::from("it's"), Scheme::new());
}

#[test]
fn lists() {
    assert_serialized("[]", Value::list(Vec::<Value>::new()), Scheme::new());
    assert_serialized("[1, 2, 3]", Value::list([1, 2, 3]), Scheme::new());
    assert_serialized("[\"string\", 1, 2]", Value::from(json!(["string", 1, 2])), Scheme::new());
}

#[test]
fn list_as_tuple() {
    assert_serialized("{1, 2, 3}", Value::list([1, 2, 3]), Scheme::from([("::array", "tuple")]));
    assert_serialized("{}", Value::list(Vec::<Value>::new()), Scheme::from([("::array", "tuple")]));
}

#[test]
fn numeric_list_as_keytuples() {
    assert_serialized(
        "[{0, \"test\"}, {1, \"value\"}]",
        Value::list(["test", "value"]),
        Scheme::from([("/::array@keyvalue", "keytuple")]),
    );
    assert_serialized(
        "[{0, \"test\"}, {1, \"value\"}]",
        Value::list(["test", "value"]),
        Scheme::from([("::array@keyvalue", "keytuple")]),
    );
}

#[test]
fn nested_items_with_their_own_rules() {
    assert_serialized(
        "[1, 2, {3, 4, 5}]",
        Value::from(json!([1, 2, [3, 4, 5]])),
        Scheme::from([("/*/::array", "tuple")]),
    );
}

#[test]
fn assoc_as_proplist() {
    assert_serialized("[{key, \"value\"}]", Value::assoc([("key", "value")]), Scheme::new());
}

#[test]
fn uncommon_atoms_are_quoted() {
    assert_serialized("[{'Key', \"value\"}]", Value::assoc([("Key", "value")]), Scheme::new());
    assert_serialized(r#"[{'\'', "value"}]"#, Value::assoc([("'", "value")]), Scheme::new());
}

#[test]
fn scheme_by_type() {
    assert_serialized("atom", Value::from("atom"), Scheme::from([("::string", "atom")]));
}

#[test]
fn keys_as_strings() {
    assert_serialized(
        "[{\"key1\", 1}, {\"key2\", 2}]",
        Value::assoc([("key1", 1), ("key2", 2)]),
        Scheme::from([("::array@key", "string")]),
    );
}

#[test]
fn exact_numeric_key() {
    assert_serialized(
        "[\"test\", {1, \"bla\"}]",
        Value::list(["test", "bla"]),
        Scheme::from([("::array#1@keyvalue", "keytuple")]),
    );
}

#[test]
fn item_rule_by_key_type() {
    assert_serialized(
        "[{0, \"test\"}, {1, \"bla\"}]",
        Value::list(["test", "bla"]),
        Scheme::from([("::array#::number@keyvalue", "keytuple")]),
    );
}

#[test]
fn exact_named_key() {
    let mixed = Value::Collection(vec![
        (Key::Index(0), Value::from("test")),
        (Key::Name("lala".into()), Value::from("bla")),
    ]);
    assert_serialized(
        "[\"test\", {\"lala\", \"bla\"}]",
        mixed,
        Scheme::from([("::array#\"lala\"@key", "string")]),
    );
}

#[test]
fn numeric_looking_names_are_numeric_items() {
    assert_serialized(
        "[\"a\", {b, \"c\"}]",
        Value::from(json!({"1": "a", "b": "c"})),
        Scheme::new(),
    );
    let named = Value::Collection(vec![(Key::Name("2".into()), Value::from("x"))]);
    assert_serialized(
        "[{2, \"x\"}]",
        named.clone(),
        Scheme::from([("::array#::number@keyvalue", "keytuple")]),
    );
    assert_serialized(
        "[{\"2\", \"x\"}]",
        named,
        Scheme::from([("::array#2@keyvalue", "keytuple"), ("#2@key", "string")]),
    );
}

#[test]
fn numerals_drop_surrounding_whitespace() {
    assert_serialized("42", Value::from(" 42 "), Scheme::new());
    assert_serialized("\" 42 \"", Value::from(" 42 "), Scheme::from([("::numeric", "string")]));
}

#[test]
fn assoc_item_as_is() {
    assert_serialized(
        "[\"test\"]",
        Value::assoc([("bla", "test")]),
        Scheme::from([("#::string@keyvalue", "is")]),
    );
}

#[test]
fn named_key_rendered_as_is_goes_through_the_value_handlers() {
    assert_serialized(
        "[{\"k\", 1}]",
        Value::assoc([("k", 1)]),
        Scheme::from([("@key", "is")]),
    );
    assert_serialized(
        "[{k, 1}]",
        Value::assoc([("k", 1)]),
        Scheme::from([("@key", "is"), ("#::string@key/::string", "atom")]),
    );
}

#[test]
fn extending_a_base_scheme() {
    let serializer = Serializer::with_scheme(Scheme::from([("::array", "tuple"), ("::array#1/", "atom")]));
    let out = serializer
        .serialize(&Value::list(["lala", "atom", "123"]), &Scheme::from([("::array#2/", "number")]))
        .unwrap();
    assert_eq!(out.as_deref(), Some("{\"lala\", atom, 123}"));
}

#[test]
fn first_declared_rule_wins() {
    // both entries match the element at index 1; the first one decides
    assert_serialized(
        "[\"1\", 2]",
        Value::list(["1", "2"]),
        Scheme::from([("::array#1/", "number"), ("#::number/", "string")]).with("::numeric", "string"),
    );
    assert_serialized(
        "[\"x\", y]",
        Value::list(["x", "y"]),
        Scheme::from([("::array#1/", "atom"), ("::array#*/", "string")]),
    );
    assert_serialized(
        "[\"x\", \"y\"]",
        Value::list(["x", "y"]),
        Scheme::from([("::array#*/", "string"), ("::array#1/", "atom")]),
    );
}

#[test]
fn unknown_target_type_is_an_error() {
    let err = serialize(&Value::from("123"), &Scheme::from([("::numeric", "bla?")])).unwrap_err();
    assert!(matches!(err, SerializeError::UnknownTargetType { .. }));
    assert_eq!(
        err.to_string(),
        "undefined type `bla?` in scheme `/::numeric => bla?` (at `/::numeric`)"
    );
}

#[test]
fn unsupported_value_gives_no_result() {
    assert_eq!(serialize(&Value::opaque("stdClass"), &Scheme::new()).unwrap(), None);
}

#[test]
fn deep_nesting() {
    let mut v = Value::from(1);
    for _ in 0..10 {
        v = Value::list([v]);
    }
    assert_serialized("[[[[[[[[[[1]]]]]]]]]]", v, Scheme::new());
}

#[test]
fn very_deep_nesting_does_not_overflow() {
    const DEPTH: usize = 2_000;
    let mut v = Value::from("leaf");
    for _ in 0..DEPTH {
        v = Value::list([v]);
    }
    let out = serialize(&v, &Scheme::new()).unwrap().unwrap();
    assert_eq!(out.len(), 2 * DEPTH + "\"leaf\"".len());
    assert!(out.starts_with(&"[".repeat(DEPTH)));
    assert!(out.ends_with(&"]".repeat(DEPTH)));

    // unwind without recursive drops
    let mut v = v;
    while let Value::Collection(mut entries) = v {
        v = entries.pop().map(|(_, child)| child).unwrap_or(Value::Nil);
    }
}

#[test]
fn deterministic() {
    let v = Value::from(json!({"a": [1, "b", null, true], "B": {"c": "1.5"}}));
    let scheme = Scheme::from([("::array", "tuple")]);
    let first = serialize(&v, &scheme).unwrap();
    let second = serialize(&v, &scheme).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.as_deref(),
        Some("{{a, {1, \"b\", nil, true}}, {'B', {{c, 1.5}}}}")
    );
}
