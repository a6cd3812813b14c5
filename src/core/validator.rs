/// Answer validation
///
/// Asks the answering service whether a single value is a reasonable answer
/// for a factor. One shot, no retries, never fails.

use crate::service::AnswerService;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    Invalid,
    /// The reply did not start with a verdict
    Unclear,
    /// The service could not be asked
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub verdict: Verdict,
    pub reason: String,
}

pub struct Validator {
    service: Arc<dyn AnswerService>,
}

impl Validator {
    pub fn new(service: Arc<dyn AnswerService>) -> Self {
        Self { service }
    }

    pub async fn validate(&self, factor: &str, value: &str) -> Validation {
        let prompt = format!(
            "Please validate the following information for the real estate factor \"{}\".\n\
             Value: {}\n\n\
             Is it a reasonable and valid answer? Respond with 'Valid' or 'Invalid' and give a brief reason.",
            factor, value
        );

        match self.service.ask(&prompt).await {
            Ok(reply) => parse_reply(&reply),
            Err(e) => {
                warn!(factor, error = %e, "Validation request failed");
                Validation {
                    verdict: Verdict::Error(e.to_string()),
                    reason: format!("Validation Error: {}", e),
                }
            }
        }
    }
}

/// First word decides the verdict; whatever follows is the reason
pub fn parse_reply(reply: &str) -> Validation {
    let reply = reply.trim();
    let split = reply
        .find(|c: char| !c.is_alphabetic())
        .unwrap_or(reply.len());
    let (head, rest) = reply.split_at(split);

    let verdict = match head.to_lowercase().as_str() {
        "valid" => Verdict::Valid,
        "invalid" => Verdict::Invalid,
        _ => Verdict::Unclear,
    };

    let reason = if verdict == Verdict::Unclear {
        reply.to_string()
    } else {
        rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ':' | '-' | ','))
            .to_string()
    };

    Validation { verdict, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoutError;
    use crate::service::testing::ScriptedService;

    #[test]
    fn test_parse_reply() {
        let v = parse_reply("Valid. Price ranges in Kokapet are in this band.");
        assert_eq!(v.verdict, Verdict::Valid);
        assert_eq!(v.reason, "Price ranges in Kokapet are in this band.");

        let v = parse_reply("INVALID: possession date is in the past");
        assert_eq!(v.verdict, Verdict::Invalid);
        assert_eq!(v.reason, "possession date is in the past");

        let v = parse_reply("Hard to say without more context.");
        assert_eq!(v.verdict, Verdict::Unclear);
        assert_eq!(v.reason, "Hard to say without more context.");
    }

    #[tokio::test]
    async fn test_validate_asks_about_factor() {
        let service = Arc::new(ScriptedService::new(vec![Ok("Valid - looks right".to_string())]));
        let validator = Validator::new(service.clone());

        let v = validator.validate("Open Space", "70%").await;

        assert_eq!(v.verdict, Verdict::Valid);
        assert_eq!(v.reason, "looks right");
        let prompt = &service.prompts()[0];
        assert!(prompt.contains("\"Open Space\""));
        assert!(prompt.contains("Value: 70%"));
    }

    #[tokio::test]
    async fn test_validate_never_fails() {
        let service = Arc::new(ScriptedService::new(vec![Err(ScoutError::Transport(
            "connection refused".to_string(),
        ))]));
        let validator = Validator::new(service);

        let v = validator.validate("Orientation", "East").await;

        assert!(matches!(v.verdict, Verdict::Error(_)));
        assert!(v.reason.starts_with("Validation Error"));
    }
}
