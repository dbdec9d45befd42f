use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde_json::{json, Value};

use crate::error::{AdapterError, AdapterResult};
use crate::parser::{parse_structure, PathNode};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const SYSTEM_INSTRUCTION: &str = "You design project directory layouts. \
Reply with the layout only, one entry per line, nesting expressed with two spaces of \
indentation per level. Suffix every directory name with '/'. Do not write comments, \
explanations, tree-drawing characters, bullets or code fences.";

/// Turns a natural-language project description into tree text.
pub trait TreeTranslator {
    fn translate(
        &self,
        description: &str,
        model: &str,
        credential: Option<&str>,
    ) -> AdapterResult<String>;
}

pub struct ChatCompletionTranslator {
    endpoint: String,
    timeout: Duration,
    temperature: f32,
}

impl Default for ChatCompletionTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl ChatCompletionTranslator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            temperature: 0.2,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn transport_error(&self, e: reqwest::Error) -> AdapterError {
        AdapterError::Transport {
            endpoint: self.endpoint.clone(),
            source: e,
        }
    }
}

impl TreeTranslator for ChatCompletionTranslator {
    fn translate(
        &self,
        description: &str,
        model: &str,
        credential: Option<&str>,
    ) -> AdapterResult<String> {
        let api_key = check_credential(credential)?;
        if description.trim().is_empty() {
            return Err(AdapterError::EmptyDescription);
        }

        let payload = json!({
            "model": model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": description.trim() }
            ]
        });

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.transport_error(e))?;

        tracing::info!("requesting structure from {} (model {})", self.endpoint, model);
        let response = client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), response.text()));
        }

        let res_json: Value = response
            .json()
            .map_err(|e| AdapterError::MalformedResponse(e.to_string()))?;
        let content = extract_content(&res_json)?;
        tracing::debug!("model returned {} bytes of tree text", content.len());
        Ok(content)
    }
}

fn status_error(status: u16, body: reqwest::Result<String>) -> AdapterError {
    let body = body.unwrap_or_else(|e| format!("<unreadable body: {}>", e));
    AdapterError::Status { status, body }
}

fn check_credential(credential: Option<&str>) -> AdapterResult<&str> {
    match credential.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(AdapterError::MissingCredential),
    }
}

/// Pulls `choices[0].message.content` out of a chat-completion response.
pub fn extract_content(res_json: &Value) -> AdapterResult<String> {
    let content = res_json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            AdapterError::MalformedResponse(format!(
                "missing choices[0].message.content in {}",
                res_json
            ))
        })?;
    let content = strip_code_fence(content);
    if content.trim().is_empty() {
        return Err(AdapterError::MalformedResponse(
            "model returned an empty structure".to_string(),
        ));
    }
    Ok(content)
}

pub fn strip_code_fence(text: &str) -> String {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[^\n]*\n(.*?)\n?```\s*$").expect("static regex is valid")
    });
    match fence.captures(text) {
        Some(caps) => caps[1].to_string(),
        None => text.trim_matches('\n').to_string(),
    }
}

/// Asks `translator` for tree text and parses it.
pub fn scaffold_from_description(
    translator: &dyn TreeTranslator,
    description: &str,
    model: &str,
    credential: Option<&str>,
) -> AdapterResult<(String, Vec<PathNode>)> {
    let tree_text = translator.translate(description, model, credential)?;
    let nodes = parse_structure(&tree_text);
    Ok((tree_text, nodes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_fails_before_request() {
        // unroutable endpoint: reaching the network would yield Transport instead
        let translator = ChatCompletionTranslator::new("http://127.0.0.1:0/never");
        for credential in [None, Some(""), Some("   ")] {
            let err = translator
                .translate("a web app", DEFAULT_MODEL, credential)
                .unwrap_err();
            assert!(matches!(err, AdapterError::MissingCredential));
        }
    }

    #[test]
    fn empty_description_is_rejected() {
        let translator = ChatCompletionTranslator::default();
        let err = translator
            .translate("  \n", DEFAULT_MODEL, Some("sk-test"))
            .unwrap_err();
        assert!(matches!(err, AdapterError::EmptyDescription));
    }

    #[test]
    fn transport_error_keeps_underlying_cause() {
        let translator = ChatCompletionTranslator::new("not a url");
        let err = translator
            .translate("a web app", DEFAULT_MODEL, Some("sk-test"))
            .unwrap_err();
        assert!(matches!(err, AdapterError::Transport { .. }));

        let mut chain = vec![err.to_string()];
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = std::error::Error::source(cause);
        }
        assert!(chain.len() >= 2, "no cause behind {:?}", chain);
        assert!(chain.join(": ").len() > err.to_string().len());
    }

    #[test]
    fn unreadable_status_body_is_reported() {
        let read_error = reqwest::blocking::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        match status_error(502, Err(read_error)) {
            AdapterError::Status { status, body } => {
                assert_eq!(status, 502);
                assert!(body.starts_with("<unreadable body: "), "{}", body);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(
            status_error(401, Ok("bad key".to_string())),
            AdapterError::Status { status: 401, ref body } if body == "bad key"
        ));
    }

    #[test]
    fn extracts_message_content() {
        let res = json!({
            "choices": [{ "message": { "role": "assistant", "content": "app/\n  main.py\n" } }]
        });
        assert_eq!(extract_content(&res).unwrap(), "app/\n  main.py");
    }

    #[test]
    fn missing_content_is_malformed() {
        let res = json!({ "error": { "message": "bad" } });
        assert!(matches!(
            extract_content(&res),
            Err(AdapterError::MalformedResponse(_))
        ));
    }

    #[test]
    fn code_fence_is_removed() {
        let fenced = "```text\nsrc/\n  lib.rs\n```\n";
        assert_eq!(strip_code_fence(fenced), "src/\n  lib.rs");
        assert_eq!(strip_code_fence("plain/\n"), "plain/");
    }
}
