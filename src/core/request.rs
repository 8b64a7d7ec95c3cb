//! batchexecute request construction

use rand::Rng;
use serde_json::{json, Value};
use tracing::debug;

use crate::core::config::{TranslatorConfig, FORM_CONTENT_TYPE};
use crate::core::errors::{LanguageField, Result, TranslationError};
use crate::core::languages::LanguageResolver;
use crate::core::models::{Batch, BatchItem};
use crate::core::tokens::SessionTokens;
use crate::core::transport::{HttpMethod, HttpRequest};

/// RPC exposed by the web translator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcOperation {
    /// `MkEWBc`, returns a translation
    Translate,
    /// `jQ1olc`, returns spoken audio
    Speak,
}

impl RpcOperation {
    pub fn rpc_id(&self) -> &'static str {
        match self {
            RpcOperation::Translate => "MkEWBc",
            RpcOperation::Speak => "jQ1olc",
        }
    }
}

/// Base-36 form of a correlation index, as sent in the last slot of a sub-request
pub fn encode_index(mut index: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if index == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while index > 0 {
        digits.push(DIGITS[index % 36]);
        index /= 36;
    }
    digits.iter().rev().map(|&d| d as char).collect()
}

/// Inverse of [`encode_index`]
pub fn decode_index(encoded: &str) -> Option<usize> {
    usize::from_str_radix(encoded, 36).ok()
}

/// Request for the landing page carrying the session tokens
pub fn build_init_request(config: &TranslatorConfig) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: config.base_url(),
        headers: config.request_options.headers.clone(),
        body: None,
        timeout_ms: config.request_options.timeout_ms,
    }
}

/// Sub-request arguments with every language already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBatch {
    pub operation: RpcOperation,
    pub args: Vec<Value>,
}

impl PreparedBatch {
    /// Turn the prepared arguments into a batchexecute POST
    pub fn into_request(
        self,
        config: &TranslatorConfig,
        tokens: &SessionTokens,
    ) -> Result<HttpRequest> {
        batch_execute_request(self.operation, self.args, config, tokens)
    }
}

/// Resolve languages for a translate batch; every item becomes
/// `[[text, from, to, autoCorrect], [null]]`
pub fn prepare_translate(
    input: &Batch<BatchItem>,
    config: &TranslatorConfig,
    resolver: &dyn LanguageResolver,
) -> Result<PreparedBatch> {
    let mut args = Vec::with_capacity(input.len());

    for item in input.values() {
        let from = item.from.as_deref().unwrap_or(&config.from);
        let force_from = item.force_from.unwrap_or(config.force_from);
        let from_iso = resolve_language(resolver, LanguageField::From, from, force_from)?;

        let to = item.to.as_deref().unwrap_or(&config.to);
        let force_to = item.force_to.unwrap_or(config.force_to);
        let to_iso = resolve_language(resolver, LanguageField::To, to, force_to)?;

        let auto_correct = item.auto_correct.unwrap_or(config.auto_correct);

        args.push(json!([[item.text, from_iso, to_iso, auto_correct], [null]]));
    }

    Ok(PreparedBatch {
        operation: RpcOperation::Translate,
        args,
    })
}

/// Resolve languages for a speak batch; every item becomes `[text, to, true]`
pub fn prepare_speak(
    input: &Batch<BatchItem>,
    config: &TranslatorConfig,
    resolver: &dyn LanguageResolver,
) -> Result<PreparedBatch> {
    let mut args = Vec::with_capacity(input.len());

    for item in input.values() {
        let to = item.to.as_deref().unwrap_or(&config.to);
        let force_to = item.force_to.unwrap_or(config.force_to);
        let to_iso = resolve_language(resolver, LanguageField::To, to, force_to)?;

        args.push(json!([item.text, to_iso, true]));
    }

    Ok(PreparedBatch {
        operation: RpcOperation::Speak,
        args,
    })
}

/// Batched translate request carrying the scraped session tokens
pub fn build_translate_request(
    input: &Batch<BatchItem>,
    config: &TranslatorConfig,
    tokens: &SessionTokens,
    resolver: &dyn LanguageResolver,
) -> Result<HttpRequest> {
    prepare_translate(input, config, resolver)?.into_request(config, tokens)
}

/// Batched speak request; speak works without a session so the tokens are empty
pub fn build_speak_request(
    input: &Batch<BatchItem>,
    config: &TranslatorConfig,
    resolver: &dyn LanguageResolver,
) -> Result<HttpRequest> {
    prepare_speak(input, config, resolver)?.into_request(config, &SessionTokens::default())
}

fn resolve_language(
    resolver: &dyn LanguageResolver,
    field: LanguageField,
    value: &str,
    force: bool,
) -> Result<String> {
    if force {
        return Ok(value.to_string());
    }

    resolver
        .resolve(value)
        .ok_or_else(|| TranslationError::UnsupportedLanguage {
            field,
            value: value.to_string(),
        })
}

fn batch_execute_request(
    operation: RpcOperation,
    args: Vec<Value>,
    config: &TranslatorConfig,
    tokens: &SessionTokens,
) -> Result<HttpRequest> {
    let request_id = rand::thread_rng().gen_range(1000..10000);
    let url = format!(
        "{}?{}",
        config.batch_execute_url(),
        build_query(operation, tokens, request_id)
    );

    let body = build_body(operation, &args)?;

    let mut headers = config.request_options.headers.clone();
    headers.retain(|name, _| !name.eq_ignore_ascii_case("content-type"));
    headers.insert("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string());

    debug!(
        "Built {} request with {} item(s), _reqid={}",
        operation.rpc_id(),
        args.len(),
        request_id
    );

    Ok(HttpRequest {
        method: HttpMethod::Post,
        url,
        headers,
        body: Some(body),
        timeout_ms: config.request_options.timeout_ms,
    })
}

fn build_query(operation: RpcOperation, tokens: &SessionTokens, request_id: u32) -> String {
    let request_id = request_id.to_string();
    let params = [
        ("rpcids", operation.rpc_id()),
        ("source-path", "/"),
        ("f.sid", tokens.session_id.as_str()),
        ("bl", tokens.build_label.as_str()),
        ("hl", "en-US"),
        ("soc-app", "1"),
        ("soc-platform", "1"),
        ("soc-device", "1"),
        ("_reqid", request_id.as_str()),
        ("rt", "c"),
    ];

    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// `f.req=<[[[rpcid, args, null, index], ...]]>&`
fn build_body(operation: RpcOperation, args: &[Value]) -> Result<String> {
    let mut subrequests = Vec::with_capacity(args.len());
    for (index, arg) in args.iter().enumerate() {
        subrequests.push(json!([
            operation.rpc_id(),
            serde_json::to_string(arg)?,
            null,
            encode_index(index)
        ]));
    }

    let freq = serde_json::to_string(&json!([subrequests]))?;
    Ok(format!("f.req={}&", urlencoding::encode(&freq)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::languages::GoogleLanguages;
    use assert_json_diff::assert_json_eq;
    use indexmap::IndexMap;

    fn decode_body(request: &HttpRequest) -> Value {
        let body = request.body.as_deref().unwrap();
        let encoded = body
            .strip_prefix("f.req=")
            .and_then(|b| b.strip_suffix('&'))
            .unwrap();
        serde_json::from_str(&urlencoding::decode(encoded).unwrap()).unwrap()
    }

    fn query_param(url: &str, key: &str) -> Option<String> {
        let (_, query) = url.split_once('?')?;
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| urlencoding::decode(v).unwrap().into_owned())
        })
    }

    #[test]
    fn test_index_round_trip() {
        for i in 0..36 {
            assert_eq!(decode_index(&encode_index(i)), Some(i));
        }
        assert_eq!(encode_index(10), "a");
        assert_eq!(encode_index(35), "z");
        assert_eq!(encode_index(36), "10");
        assert_eq!(decode_index("10"), Some(36));
        assert_eq!(decode_index(&encode_index(1295)), Some(1295));
        assert_eq!(decode_index("not an index!"), None);
    }

    #[test]
    fn test_translate_body_layout() {
        let input: Batch<BatchItem> = vec![
            BatchItem::new("hello"),
            BatchItem::new("bonjour").with_from("fr").with_to("de").with_auto_correct(true),
        ]
        .into();
        let config = TranslatorConfig::default();
        let tokens = SessionTokens {
            session_id: "sid".to_string(),
            build_label: "label".to_string(),
        };

        let request =
            build_translate_request(&input, &config, &tokens, &GoogleLanguages).unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert_json_eq!(
            decode_body(&request),
            json!([[
                ["MkEWBc", r#"[["hello","auto","en",false],[null]]"#, null, "0"],
                ["MkEWBc", r#"[["bonjour","fr","de",true],[null]]"#, null, "1"]
            ]])
        );
        assert!(request
            .url
            .starts_with("https://translate.google.com/_/TranslateWebserverUi/data/batchexecute?"));
        assert_eq!(query_param(&request.url, "rpcids").as_deref(), Some("MkEWBc"));
        assert_eq!(query_param(&request.url, "f.sid").as_deref(), Some("sid"));
        assert_eq!(query_param(&request.url, "bl").as_deref(), Some("label"));
        assert_eq!(query_param(&request.url, "source-path").as_deref(), Some("/"));
        assert_eq!(query_param(&request.url, "rt").as_deref(), Some("c"));

        let reqid: u32 = query_param(&request.url, "_reqid").unwrap().parse().unwrap();
        assert!((1000..10000).contains(&reqid));
    }

    #[test]
    fn test_speak_body_layout() {
        let mut items = IndexMap::new();
        items.insert("greeting".to_string(), BatchItem::new("hello"));
        items.insert("farewell".to_string(), BatchItem::new("adieu").with_to("French"));
        let input: Batch<BatchItem> = items.into();

        let request =
            build_speak_request(&input, &TranslatorConfig::default(), &GoogleLanguages).unwrap();

        assert_json_eq!(
            decode_body(&request),
            json!([[
                ["jQ1olc", r#"["hello","en",true]"#, null, "0"],
                ["jQ1olc", r#"["adieu","fr",true]"#, null, "1"]
            ]])
        );
        assert_eq!(query_param(&request.url, "rpcids").as_deref(), Some("jQ1olc"));
        assert_eq!(query_param(&request.url, "f.sid").as_deref(), Some(""));
        assert_eq!(query_param(&request.url, "bl").as_deref(), Some(""));
    }

    #[test]
    fn test_content_type_is_forced() {
        let mut config = TranslatorConfig::default();
        config
            .request_options
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        config
            .request_options
            .headers
            .insert("User-Agent".to_string(), "agent".to_string());

        let request =
            build_speak_request(&"hi".into(), &config, &GoogleLanguages).unwrap();

        assert_eq!(request.headers.get("Content-Type").map(String::as_str), Some(FORM_CONTENT_TYPE));
        assert!(!request.headers.contains_key("content-type"));
        assert_eq!(request.headers.get("User-Agent").map(String::as_str), Some("agent"));
    }

    #[test]
    fn test_unsupported_language_aborts_batch() {
        let input: Batch<BatchItem> =
            vec![BatchItem::new("fine"), BatchItem::new("bad").with_to("klingon")].into();

        let err = build_translate_request(
            &input,
            &TranslatorConfig::default(),
            &SessionTokens::default(),
            &GoogleLanguages,
        )
        .unwrap_err();

        match err {
            TranslationError::UnsupportedLanguage { field, value } => {
                assert_eq!(field, LanguageField::To);
                assert_eq!(value, "klingon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_forced_language_is_sent_verbatim() {
        let config = TranslatorConfig {
            from: "xx-custom".to_string(),
            force_from: true,
            ..Default::default()
        };
        let input: Batch<BatchItem> = BatchItem::new("hi").with_to("tlh").with_force_to(true).into();

        let request = build_translate_request(
            &input,
            &config,
            &SessionTokens::default(),
            &GoogleLanguages,
        )
        .unwrap();

        assert_json_eq!(
            decode_body(&request),
            json!([[["MkEWBc", r#"[["hi","xx-custom","tlh",false],[null]]"#, null, "0"]]])
        );
    }

    #[test]
    fn test_init_request() {
        let request = build_init_request(&TranslatorConfig::default());
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://translate.google.com");
        assert!(request.body.is_none());
    }
}
