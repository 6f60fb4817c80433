use serde::{Deserialize, Serialize};

/// 发往 `POST /process` 的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl ProcessRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            additional_info: None,
        }
    }

    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = Some(info.into());
        self
    }
}

/// 处理服务的响应体
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProcessReply {
    /// "success" / "error"
    pub status: Option<String>,
    pub message: Option<String>,
    pub extracted_code_preview: Option<String>,
    pub full_response: Option<String>,
}

impl ProcessReply {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additional_info_omitted_when_none() {
        let body = serde_json::to_value(ProcessRequest::new("Q")).unwrap();
        assert_eq!(body, serde_json::json!({"question": "Q"}));

        let body = serde_json::to_value(ProcessRequest::new("Q").with_additional_info("I")).unwrap();
        assert_eq!(body, serde_json::json!({"question": "Q", "additional_info": "I"}));
    }

    #[test]
    fn test_reply_tolerates_extra_fields() {
        let reply: ProcessReply = serde_json::from_str(
            r#"{"status":"success","message":"ok","extracted_code_preview":"x...","other":1}"#,
        )
        .unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.message.as_deref(), Some("ok"));
    }
}
