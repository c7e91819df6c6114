use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Login(LoginParams),
    GetJob,
    Submit(SubmitParams),
    Keepalived,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: u64,
    pub method: Method,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    id: u64,
    method: String,
    #[serde(default)]
    params: Value,
}

fn params<T: DeserializeOwned>(method: &'static str, params: Value) -> Result<T, RequestError> {
    serde_json::from_value(params).context(error::ParamsSnafu { method })
}

impl FromStr for Request {
    type Err = RequestError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let envelope = serde_json::from_str::<Envelope>(line).context(error::JsonSnafu)?;

        let method = match envelope.method.as_str() {
            "login" => Method::Login(params("login", envelope.params)?),
            "getjob" => Method::GetJob,
            "submit" => Method::Submit(params("submit", envelope.params)?),
            "keepalived" => Method::Keepalived,
            _ => {
                return error::UnknownMethodSnafu {
                    method: envelope.method,
                }
                .fail();
            }
        };

        Ok(Self {
            id: envelope.id,
            method,
        })
    }
}

/// Reply to a miner request. `jsonrpc` is always empty and both `error` and
/// `result` are always present, one of them as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    pub jsonrpc: String,
    pub error: Option<RpcError>,
    pub result: Option<Value>,
}

impl Response {
    pub fn result(id: u64, result: Value) -> Self {
        Self {
            id,
            jsonrpc: String::new(),
            error: None,
            result: Some(result),
        }
    }

    pub fn error(id: u64, error: &MinerError) -> Self {
        Self {
            id,
            jsonrpc: String::new(),
            error: Some(error.rpc()),
            result: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

impl Notification {
    pub fn job(job: &JobParams) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: "job".into(),
            params: json!(job),
        }
    }
}
