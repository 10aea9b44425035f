/// Ollama backend for the Augmentation Layer.
///
/// Calls the `/api/generate` endpoint with streaming off. One attempt per
/// call; failures surface to `run_augmentation`, which absorbs them.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompts::{
    EXPERIENCE_BULLETS_TEMPLATE, PROFESSIONAL_SUMMARY_TEMPLATE, PROJECT_IDEAS_TEMPLATE,
    SKILLS_INTEGRATION_TEMPLATE, SKILLS_TO_ADD_TEMPLATE,
};
use super::{
    missing_keywords_list, section_specific, AugmentationBundle, AugmentationError,
    AugmentationRequest, Augmenter,
};

const GENERATE_PATH: &str = "/api/generate";
/// Characters of the job description included in each prompt.
const JOB_EXCERPT_CHARS: usize = 600;
const RESUME_EXCERPT_CHARS: usize = 800;
/// Generated lines shorter than this are fragments, not sentences.
const MIN_SENTENCE_CHARS: usize = 20;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Thin client over an Ollama-compatible server.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generates a completion for `prompt`, returning the trimmed text.
    pub async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
        num_predict: u32,
    ) -> Result<String, AugmentationError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature,
                num_predict,
            },
        };

        let response = self
            .client
            .post(format!("{}{GENERATE_PATH}", self.base_url))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(AugmentationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse = response.json().await?;
        debug!(
            "Generation succeeded: prompt_tokens={:?}, output_tokens={:?}",
            generated.prompt_eval_count, generated.eval_count
        );

        let text = generated.response.trim();
        if text.is_empty() {
            return Err(AugmentationError::EmptyContent);
        }
        Ok(text.to_string())
    }
}

/// `Augmenter` backed by Ollama. The five generated parts run concurrently;
/// the first failure fails the whole bundle.
pub struct OllamaAugmenter {
    client: OllamaClient,
}

impl OllamaAugmenter {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    async fn skills_to_add(
        &self,
        job: &str,
        request: &AugmentationRequest,
    ) -> Result<Vec<String>, AugmentationError> {
        let wanted: Vec<String> = take(&request.missing.technical_skills, 8)
            .into_iter()
            .chain(take(&request.missing.soft_skills, 4))
            .collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = SKILLS_TO_ADD_TEMPLATE
            .replace("{job_description}", job)
            .replace("{skills}", &wanted.join(", "));
        let text = self.client.generate(&prompt, 0.5, 250).await?;

        let skills = dash_lines(&text, 10);
        Ok(if skills.is_empty() { wanted } else { skills })
    }

    async fn professional_summary(
        &self,
        job: &str,
        request: &AugmentationRequest,
    ) -> Result<String, AugmentationError> {
        let tech = take(&request.missing.technical_skills, 5);
        if tech.is_empty() {
            return Ok(String::new());
        }
        let skills: Vec<String> = tech
            .into_iter()
            .chain(take(&request.missing.soft_skills, 2))
            .collect();

        let prompt = PROFESSIONAL_SUMMARY_TEMPLATE
            .replace("{job_description}", job)
            .replace("{resume}", excerpt(&request.resume_text, RESUME_EXCERPT_CHARS))
            .replace("{skills}", &skills.join(", "));
        self.client.generate(&prompt, 0.7, 200).await
    }

    async fn experience_bullets(
        &self,
        job: &str,
        request: &AugmentationRequest,
    ) -> Result<Vec<String>, AugmentationError> {
        let tech = take(&request.missing.technical_skills, 5);
        if tech.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = EXPERIENCE_BULLETS_TEMPLATE
            .replace("{job_description}", job)
            .replace("{skills}", &tech.join(", "));
        let text = self.client.generate(&prompt, 0.7, 400).await?;
        Ok(dash_lines(&text, 4))
    }

    async fn skills_integration(
        &self,
        job: &str,
        request: &AugmentationRequest,
    ) -> Result<Vec<String>, AugmentationError> {
        let skills: Vec<String> = take(&request.missing.technical_skills, 3)
            .into_iter()
            .chain(take(&request.missing.soft_skills, 2))
            .collect();
        if skills.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = SKILLS_INTEGRATION_TEMPLATE
            .replace("{job_description}", job)
            .replace("{skills}", &skills.join(", "));
        let text = self.client.generate(&prompt, 0.7, 200).await?;
        Ok(sentences(&text, 3))
    }

    async fn project_ideas(
        &self,
        job: &str,
        request: &AugmentationRequest,
    ) -> Result<Vec<String>, AugmentationError> {
        let tech = take(&request.missing.technical_skills, 6);
        if tech.is_empty() {
            return Ok(Vec::new());
        }

        let status = if request.has_projects {
            "Has some projects"
        } else {
            "No projects section found"
        };
        let prompt = PROJECT_IDEAS_TEMPLATE
            .replace("{job_description}", job)
            .replace("{skills}", &tech.join(", "))
            .replace("{projects_status}", status);
        let text = self.client.generate(&prompt, 0.7, 400).await?;
        Ok(dash_lines(&text, 4))
    }
}

#[async_trait]
impl Augmenter for OllamaAugmenter {
    async fn augment(
        &self,
        request: &AugmentationRequest,
    ) -> Result<AugmentationBundle, AugmentationError> {
        let job = excerpt(&request.job_description, JOB_EXCERPT_CHARS);

        let (
            skills_to_add,
            professional_summary,
            experience_bullets,
            skills_integration,
            project_ideas,
        ) = tokio::try_join!(
            self.skills_to_add(job, request),
            self.professional_summary(job, request),
            self.experience_bullets(job, request),
            self.skills_integration(job, request),
            self.project_ideas(job, request),
        )?;

        debug!("Augmentation bundle generated with model {}", self.client.model());

        Ok(AugmentationBundle {
            missing_keywords_list: missing_keywords_list(&request.missing),
            skills_to_add,
            professional_summary,
            experience_bullets,
            skills_integration,
            section_specific: section_specific(&request.missing),
            project_ideas,
        })
    }
}

fn take(items: &[String], n: usize) -> Vec<String> {
    items.iter().take(n).cloned().collect()
}

/// First `max_chars` characters of `text`, cut on a char boundary.
fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Lines of the form `- item`, with the dash removed.
fn dash_lines(text: &str, limit: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-'))
        .map(|line| line.trim_start_matches(['-', ' ']).trim().to_string())
        .filter(|line| !line.is_empty())
        .take(limit)
        .collect()
}

fn sentences(text: &str, limit: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_SENTENCE_CHARS)
        .map(str::to_string)
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_lines() {
        let text = "Here you go:\n- Python 3.x\n  -  SQL\nnot a bullet\n-\n- AWS";
        assert_eq!(dash_lines(text, 10), vec!["Python 3.x", "SQL", "AWS"]);
        assert_eq!(dash_lines(text, 1), vec!["Python 3.x"]);
    }

    #[test]
    fn test_sentences_drop_fragments() {
        let text = "Short one\nAdvanced proficiency in SQL across analytics workloads.\n\n";
        assert_eq!(
            sentences(text, 3),
            vec!["Advanced proficiency in SQL across analytics workloads."]
        );
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("héllo", 2), "hé");
        assert_eq!(excerpt("short", 100), "short");
    }

    #[test]
    fn test_generate_request_shape() {
        let body = GenerateRequest {
            model: "llama3.1",
            prompt: "hi",
            stream: false,
            options: GenerateOptions {
                temperature: 0.5,
                num_predict: 250,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 250);
    }

    #[test]
    fn test_generate_response_parses_minimal_body() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"model":"llama3.1","response":" text ","done":true}"#).unwrap();
        assert_eq!(parsed.response, " text ");
        assert_eq!(parsed.eval_count, None);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let augmenter = OllamaAugmenter::new(OllamaClient::new(
            "http://127.0.0.1:9",
            "llama3.1",
            Duration::from_secs(2),
        ));
        let request = AugmentationRequest {
            resume_text: String::new(),
            job_description: "Python".into(),
            missing: crate::analysis::models::CategoryKeywords {
                technical_skills: vec!["SQL".into()],
                ..Default::default()
            },
            has_projects: false,
        };
        assert!(augmenter.augment(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_nothing_missing_needs_no_calls() {
        let augmenter = OllamaAugmenter::new(OllamaClient::new(
            "http://127.0.0.1:9",
            "llama3.1",
            Duration::from_secs(2),
        ));
        let request = AugmentationRequest {
            resume_text: String::new(),
            job_description: "Python".into(),
            missing: Default::default(),
            has_projects: true,
        };
        let bundle = augmenter.augment(&request).await.unwrap();
        assert!(bundle.skills_to_add.is_empty());
        assert!(bundle.missing_keywords_list.is_empty());
    }
}
