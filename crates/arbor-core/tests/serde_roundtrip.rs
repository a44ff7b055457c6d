#![cfg(feature = "serde")]

use arbor_core::ExecutionStatus;

#[test]
fn execution_status_json_roundtrip() {
    for status in [
        ExecutionStatus::Idle,
        ExecutionStatus::Running,
        ExecutionStatus::Success,
        ExecutionStatus::Failure,
    ] {
        let json = serde_json::to_string(&status).expect("serialize");
        let roundtrip: ExecutionStatus = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(roundtrip, status);
    }
}
