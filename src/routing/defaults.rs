//! Built-in defaults used while building the resolution index.

/// Request timeout (seconds) assigned to entries that declare zero or a negative value.
pub const DEFAULT_TIMEOUT_SECS: i64 = 60;

/// Listen address used when the document leaves `server_port` empty.
pub const DEFAULT_SERVER_PORT: &str = ":9090";

/// Load-balancing strategy used when the document leaves `load_balancing` empty.
pub const DEFAULT_LOAD_BALANCING: &str = "random";

/// Wildcard token: "every model" in redirect keys and API-key allow lists.
pub const WILDCARD: &str = "*";

/// Reserved model name meaning "pick any available model".
///
/// Also the selection key handed to the load balancer when choosing a random model.
pub const RANDOM_MODEL: &str = "random";

/// Models that accept multi-part (text + image) content out of the box.
/// A trailing `*` matches by prefix.
pub const BUILTIN_MULTI_CONTENT_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4-turbo",
    "glm-4v",
    "gemini-*",
    "yi-vision",
    "gpt-4o*",
];

/// Default model list for a provider entry that declares none.
///
/// Looked up by provider group name first, then by provider kind.
pub fn default_models(group: &str, provider: &str) -> Option<&'static [&'static str]> {
    lookup(group).or_else(|| lookup(provider))
}

fn lookup(name: &str) -> Option<&'static [&'static str]> {
    let models: &'static [&'static str] = match name {
        "openai" => &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-3.5-turbo"],
        "deepseek" => &["deepseek-chat", "deepseek-reasoner"],
        "zhipu" => &[
            "glm-4-plus",
            "glm-4-0520",
            "glm-4-air",
            "glm-4-airx",
            "glm-4-long",
            "glm-4-flash",
            "glm-4v",
        ],
        "xinghuo" => &["spark-lite", "spark-pro", "spark-max", "spark4.0-ultra"],
        "hunyuan" => &["hunyuan-lite", "hunyuan-standard", "hunyuan-pro"],
        "qianfan" => &["ERNIE-Speed-128K", "ERNIE-Lite-8K", "ERNIE-4.0-8K"],
        "minimax" => &["abab6.5s-chat", "abab6.5g-chat"],
        "groq" => &["llama3-8b-8192", "llama3-70b-8192", "mixtral-8x7b-32768"],
        "gemini" => &["gemini-1.5-flash", "gemini-1.5-pro"],
        _ => return None,
    };
    Some(models)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_name_wins_over_provider() {
        let by_group = default_models("deepseek", "openai").unwrap();
        assert_eq!(by_group, &["deepseek-chat", "deepseek-reasoner"]);
    }

    #[test]
    fn test_provider_fallback() {
        let models = default_models("my-groq-pool", "groq").unwrap();
        assert!(models.contains(&"llama3-8b-8192"));
        assert!(default_models("custom", "custom").is_none());
    }
}
