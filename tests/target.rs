use super::*;

#[track_caller]
fn case(difficulty: u64, expected: Value) {
    let (stdout, _) = CommandBuilder::new(&format!("target {difficulty}")).run(0);
    pretty_assert_eq!(serde_json::from_str::<Value>(&stdout).unwrap(), expected);
}

#[test]
fn targets() {
    case(
        1,
        json!({"difficulty": 1, "target": "ffffffff", "raw": 4294967295u32, "numeric": 4294967295u32}),
    );
    case(
        256,
        json!({"difficulty": 256, "target": "ffffff00", "raw": 16777215, "numeric": 4294967040u32}),
    );
    case(
        232342,
        json!({"difficulty": 232342, "target": "35480000", "raw": 18485, "numeric": 893911040}),
    );
}

#[test]
fn zero_difficulty_is_rejected() {
    let (_, stderr) = CommandBuilder::new("target 0").run(2);
    assert!(stderr.contains("invalid value"), "{stderr}");
}
