use bedrock_query::{IpFamily, StatusRecord};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone)]
pub struct BedrockPingResponse {
    pub address: String,
    pub port: u16,
    pub status: StatusRecord,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    #[default]
    V4,
    V6,
}

impl From<Family> for IpFamily {
    fn from(family: Family) -> Self {
        match family {
            Family::V4 => Self::V4,
            Family::V6 => Self::V6,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default)]
pub struct PingParams {
    #[serde(default)]
    pub family: Family,
}

#[derive(Serialize)]
pub struct ErrorSerialization {
    pub error: String,
}
