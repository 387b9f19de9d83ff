use wayfare_desc::{parse_str, to_json_string};

#[test]
fn forest_desc_compiles_to_golden_json() {
    let src = include_str!("fixtures/forest.desc");
    let output = parse_str(src);
    assert!(output.warnings.is_empty(), "unexpected warnings: {:?}", output.warnings);
    let actual = to_json_string(&output.root);
    let expected = include_str!("fixtures/forest.json");
    assert_eq!(actual.trim(), expected.trim());
}
