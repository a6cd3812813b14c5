// Fetches one project's facts from the answering service
//
// Never fails: after the last attempt it hands back a fallback record
// carrying the error instead.

use crate::core::normalizer::Normalizer;
use crate::core::retry::{RetryPolicy, Sleeper};
use crate::error::{Result, ScoutError};
use crate::schema::{json_skeleton, SENTINEL};
use crate::service::AnswerService;
use crate::store::Record;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, error, warn};

// Sites the service is pointed at, field by field
const PREFERRED_SOURCES: &[&str] = &[
    "magicbricks.com",
    "squareyards.com",
    "assetscan.ai",
    "rerait.telangana.gov.in",
    "nobroker.in",
    "99acres.com",
];

pub struct AcquisitionClient {
    service: Arc<dyn AnswerService>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    normalizer: Normalizer,
    region: String,
    punctuation: Option<Regex>,
}

impl AcquisitionClient {
    pub fn new(
        service: Arc<dyn AnswerService>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
        region: impl Into<String>,
    ) -> Self {
        Self {
            service,
            sleeper,
            policy,
            normalizer: Normalizer::new(),
            region: region.into(),
            punctuation: Regex::new(r"[^\w\s]").ok(),
        }
    }

    /// Look up one project
    ///
    /// Tries up to `policy.max_attempts` times, sleeping with doubling delay
    /// between attempts. Transport failures, missing answers and malformed
    /// answers all count as failed attempts. When every attempt fails the
    /// result is a fallback record holding the last error's description.
    pub async fn fetch(&self, project_name: &str) -> Record {
        let prompt = self.build_prompt(&self.clean_name(project_name));
        let mut attempt = 1;

        loop {
            debug!(project = project_name, attempt, "Requesting project facts");

            let err = match self.attempt(&prompt, project_name).await {
                Ok(record) => return record,
                Err(err) => err,
            };

            match self.policy.delay_after(attempt) {
                Some(delay) => {
                    warn!(
                        project = project_name,
                        attempt,
                        backoff_ms = delay.as_millis() as u64,
                        error = %err,
                        "Lookup failed, will retry after backoff"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    error!(project = project_name, attempts = attempt, error = %err, "Giving up, using fallback record");
                    return Record::fallback(project_name, err.to_string());
                }
            }
        }
    }

    async fn attempt(&self, prompt: &str, project_name: &str) -> Result<Record> {
        let answer = self.service.ask(prompt).await?;
        if answer.trim().is_empty() {
            return Err(ScoutError::MissingAnswer("empty answer text".to_string()));
        }
        self.normalizer.normalize(&answer, project_name)
    }

    /// Query form of a name: punctuation to spaces, whitespace collapsed
    pub fn clean_name(&self, name: &str) -> String {
        let spaced = match &self.punctuation {
            Some(regex) => regex.replace_all(name, " ").into_owned(),
            None => name.to_string(),
        };
        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Instruction plus the literal answer skeleton
    pub fn build_prompt(&self, query_name: &str) -> String {
        let sources = PREFERRED_SOURCES
            .iter()
            .map(|s| format!("- {}", s))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are a precise real-estate research assistant.

Collect facts about the residential project "{name}" in {region}. Answer ONLY the fields in the JSON skeleton below, one value per field.

Rules:
- Be direct. Numeric fields carry just the number or range, without units or commentary.
- "Project Price per SFT": the lowest and highest price per square foot, as a range.
- "total Price": the full ticket price of the cheapest available unit.
- "Open Space": the exact open-space percentage or acreage.
- "Configuration (2BHK, 3BHK, etc.)": every unit type on offer, each with its size (for example 2BHK 1200 sqft, 3BHK 1650 sqft).
- "Builder Reputation & Legal Compliance": the builder's track record and registration status.
- "Home Loan & Financing Options": only the names of banks that approve loans for the project.
- "Why": one or two short sentences on why a buyer should consider it.
- "Source URLs": a list of the pages the answers came from.

Check each field against these sites:
{sources}

Do NOT guess. Write "{sentinel}" for anything you cannot find.

Return a pure JSON object, with no markdown, code fences or extra text:

{skeleton}
"#,
            name = query_name,
            region = self.region,
            sources = sources,
            sentinel = SENTINEL,
            skeleton = json_skeleton(),
        )
    }
}
