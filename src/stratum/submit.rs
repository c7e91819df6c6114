use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitParams {
    #[serde(default)]
    pub id: Option<String>,
    pub job_id: String,
    pub nonce: Nonce,
    pub result: ResultHash,
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn deserialize() {
        let params = serde_json::from_value::<SubmitParams>(json!({
            "id": "miner",
            "job_id": "job",
            "nonce": "0000002a",
            "result": "ab".repeat(32),
        }))
        .unwrap();

        assert_eq!(params.id.as_deref(), Some("miner"));
        assert_eq!(params.job_id, "job");
        assert_eq!(params.nonce, Nonce::from([0, 0, 0, 0x2a]));
        assert_eq!(params.result, ResultHash::from([0xab; 32]));
    }

    #[test]
    fn bad_nonce_is_rejected() {
        assert!(
            serde_json::from_value::<SubmitParams>(json!({
                "job_id": "job",
                "nonce": "2a",
                "result": "ab".repeat(32),
            }))
            .is_err()
        );
    }
}
