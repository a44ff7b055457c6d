#![cfg(feature = "serde")]

use arbor_bt::{SelectorConfig, TreeConfig, TreeId};

#[test]
fn tree_id_serializes_as_packed_value() {
    let id = TreeId::from_indices(&[0, 2, 1]).expect("valid path");
    let json = serde_json::to_string(&id).expect("serialize");
    let roundtrip: TreeId = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, id);
    assert_eq!(roundtrip.indices(), Some(vec![0, 2, 1]));
}

#[test]
fn configs_roundtrip() {
    let tree = TreeConfig {
        label: "guards".into(),
    };
    let json = serde_json::to_string(&tree).expect("serialize");
    assert_eq!(serde_json::from_str::<TreeConfig>(&json).expect("deserialize"), tree);

    let selector = SelectorConfig { min_score: 0.25 };
    let json = serde_json::to_string(&selector).expect("serialize");
    assert_eq!(serde_json::from_str::<SelectorConfig>(&json).expect("deserialize"), selector);
}
