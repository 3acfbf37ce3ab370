//! Inbound message actions and the reply envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use csslens_core::Result;

/// A message on the relay channel, tagged by `action`.
///
/// Identifiers are optional at the type level so that an absent one is
/// reported as a failed reply instead of a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    Extract {
        #[serde(rename = "tabId", default)]
        tab_id: Option<u64>,
    },
    ExtractTokens {
        #[serde(rename = "tabId", default)]
        tab_id: Option<u64>,
    },
    AnalyzeStructure {
        #[serde(rename = "tabId", default)]
        tab_id: Option<u64>,
    },
    GetDesign {
        #[serde(default)]
        url: Option<String>,
    },
    ListDesigns,
    GetStructure {
        #[serde(default)]
        url: Option<String>,
    },
    ListStructures,
    SetApiKey {
        #[serde(rename = "apiKey", default)]
        api_key: Option<String>,
    },
}

impl Message {
    pub fn action(&self) -> &'static str {
        match self {
            Message::Extract { .. } => "extract",
            Message::ExtractTokens { .. } => "extractTokens",
            Message::AnalyzeStructure { .. } => "analyzeStructure",
            Message::GetDesign { .. } => "getDesign",
            Message::ListDesigns => "listDesigns",
            Message::GetStructure { .. } => "getStructure",
            Message::ListStructures => "listStructures",
            Message::SetApiKey { .. } => "setApiKey",
        }
    }
}

/// `{ ok, data?, error? }` reply to every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn success<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                ok: true,
                data: Some(value),
                error: None,
            },
            Err(e) => Self::failure(e),
        }
    }

    pub fn done() -> Self {
        Self {
            ok: true,
            data: None,
            error: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.to_string()),
        }
    }

    pub fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(&data),
            Err(e) => Self::failure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csslens_core::Error;

    #[test]
    fn test_decode_actions() {
        let msg: Message = serde_json::from_str(r#"{"action": "extractTokens", "tabId": 7}"#).unwrap();
        assert_eq!(msg, Message::ExtractTokens { tab_id: Some(7) });

        let msg: Message = serde_json::from_str(r#"{"action": "analyzeStructure"}"#).unwrap();
        assert_eq!(msg, Message::AnalyzeStructure { tab_id: None });

        let msg: Message = serde_json::from_str(r#"{"action": "listDesigns"}"#).unwrap();
        assert_eq!(msg.action(), "listDesigns");

        let msg: Message = serde_json::from_str(r#"{"action": "setApiKey", "apiKey": "sk-ant-1"}"#).unwrap();
        assert_eq!(msg, Message::SetApiKey { api_key: Some("sk-ant-1".into()) });
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(serde_json::from_str::<Message>(r#"{"action": "format"}"#).is_err());
    }

    #[test]
    fn test_reply_shape() {
        let ok = serde_json::to_value(Reply::success(&serde_json::json!({"radius": "8px"}))).unwrap();
        assert_eq!(ok, serde_json::json!({"ok": true, "data": {"radius": "8px"}}));

        let err = serde_json::to_value(Reply::from_result::<()>(Err(Error::MissingInput("tabId")))).unwrap();
        assert_eq!(err, serde_json::json!({"ok": false, "error": "Missing tabId"}));

        assert_eq!(serde_json::to_value(Reply::done()).unwrap(), serde_json::json!({"ok": true}));
    }
}
