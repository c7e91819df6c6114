use super::*;

/// Outbound pool message. `params` carries the JSON-encoded parameters with
/// the request id mirrored inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Envelope {
    pub(crate) method: String,
    pub(crate) id: String,
    pub(crate) params: String,
}

impl Envelope {
    pub(crate) fn new(id: u64, method: &str, mut params: Value) -> Result<Self, PoolError> {
        if let Value::Object(params) = &mut params {
            params.insert("id".into(), Value::String(id.to_string()));
        }

        Ok(Self {
            method: method.into(),
            id: id.to_string(),
            params: serde_json::to_string(&params)
                .map_err(|source| PoolError::Serialization { source })?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PoolMessage {
    Response {
        id: u64,
        result: Option<Value>,
        error: Option<Value>,
    },
    Push {
        method: String,
        params: Value,
    },
}

fn message_id(id: &Value) -> Option<u64> {
    match id {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|value| !value.is_null()).cloned()
}

impl<'de> Deserialize<'de> for PoolMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        if let Some(method) = value.get("method").and_then(Value::as_str) {
            // Some pools send params as a JSON string.
            let params = match value.get("params") {
                Some(Value::String(params)) => {
                    serde_json::from_str(params).map_err(de::Error::custom)?
                }
                Some(params) => params.clone(),
                None => Value::Null,
            };

            return Ok(Self::Push {
                method: method.into(),
                params,
            });
        }

        let id = value
            .get("id")
            .and_then(message_id)
            .ok_or_else(|| de::Error::custom("response without a numeric id"))?;

        Ok(Self::Response {
            id,
            result: present(value.get("result")),
            error: present(value.get("error")),
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[track_caller]
    fn case(line: &str, expected: PoolMessage) {
        assert_eq!(serde_json::from_str::<PoolMessage>(line).unwrap(), expected);
    }

    #[test]
    fn envelope() {
        let envelope = Envelope::new(7, "submit", json!({"nonce": "00000001"})).unwrap();

        assert_eq!(envelope.method, "submit");
        assert_eq!(envelope.id, "7");
        assert_eq!(
            serde_json::from_str::<Value>(&envelope.params).unwrap(),
            json!({"id": "7", "nonce": "00000001"})
        );
        assert!(serde_json::to_value(&envelope).unwrap()["params"].is_string());
    }

    #[test]
    fn responses() {
        case(
            r#"{"id":"3","jsonrpc":"2.0","error":null,"result":{"status":"OK"}}"#,
            PoolMessage::Response {
                id: 3,
                result: Some(json!({"status": "OK"})),
                error: None,
            },
        );
        case(
            r#"{"id":4,"error":{"code":-1,"message":"stale"}}"#,
            PoolMessage::Response {
                id: 4,
                result: None,
                error: Some(json!({"code": -1, "message": "stale"})),
            },
        );
    }

    #[test]
    fn pushes() {
        case(
            r#"{"method":"job","params":{"job_id":"a"}}"#,
            PoolMessage::Push {
                method: "job".into(),
                params: json!({"job_id": "a"}),
            },
        );
        case(
            r#"{"method":"job","params":"{\"job_id\":\"b\"}"}"#,
            PoolMessage::Push {
                method: "job".into(),
                params: json!({"job_id": "b"}),
            },
        );
    }

    #[test]
    fn invalid() {
        assert!(serde_json::from_str::<PoolMessage>(r#"{"result":{}}"#).is_err());
        assert!(serde_json::from_str::<PoolMessage>(r#"{"id":"x","result":{}}"#).is_err());
        assert!(serde_json::from_str::<PoolMessage>(r#"{"method":"job","params":"{"}"#).is_err());
    }
}
