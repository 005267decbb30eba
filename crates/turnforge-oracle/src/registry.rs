use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A versioned prompt template.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub id: String,
    pub version: String,
    pub template: String,
    pub schema_name: String,
    pub metadata: HashMap<String, String>,
}

/// Version metadata for a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptVersion {
    pub version: String,
    pub path: PathBuf,
}

/// Registry of prompt templates with version control.
///
/// Prompts live as files named `{prompt_id}_v{n}.txt`, e.g.
/// `interpreter_v0.txt`. A campaign may pin specific versions for A/B
/// comparisons; otherwise the highest version number wins.
pub struct PromptRegistry {
    prompts_dir: PathBuf,
    cache: HashMap<String, PromptTemplate>,
    // campaign_id -> prompt_id -> version
    pinned_versions: HashMap<String, HashMap<String, String>>,
}

impl PromptRegistry {
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            cache: HashMap::new(),
            pinned_versions: HashMap::new(),
        }
    }

    /// Get a prompt template by id. With no explicit version, a campaign
    /// pin wins, then the latest version on disk.
    pub fn get_prompt(
        &mut self,
        prompt_id: &str,
        version: Option<&str>,
        campaign_id: Option<&str>,
    ) -> Result<PromptTemplate> {
        let pinned = version.map(str::to_string).or_else(|| {
            campaign_id.and_then(|c| {
                self.pinned_versions
                    .get(c)
                    .and_then(|pins| pins.get(prompt_id).cloned())
            })
        });

        let version = match pinned {
            Some(v) => v,
            None => {
                let versions = self.list_prompt_versions(prompt_id)?;
                versions
                    .last()
                    .map(|v| v.version.clone())
                    .ok_or_else(|| Error::PromptNotFound(prompt_id.to_string()))?
            }
        };

        let cache_key = format!("{}_{}", prompt_id, version);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached.clone());
        }

        let file_path = self.prompts_dir.join(format!("{}_{}.txt", prompt_id, version));
        if !file_path.exists() {
            return Err(Error::PromptNotFound(format!(
                "{} ({})",
                prompt_id,
                file_path.display()
            )));
        }
        let template = std::fs::read_to_string(&file_path)?;

        let metadata = parse_metadata(&template);
        let schema_name = metadata
            .get("schema")
            .cloned()
            .unwrap_or_else(|| format!("{}_output", prompt_id));

        let prompt = PromptTemplate {
            id: prompt_id.to_string(),
            version,
            template,
            schema_name,
            metadata,
        };
        self.cache.insert(cache_key, prompt.clone());
        Ok(prompt)
    }

    /// All versions of a prompt on disk, sorted ascending by number.
    pub fn list_prompt_versions(&self, prompt_id: &str) -> Result<Vec<PromptVersion>> {
        let pattern = Regex::new(&format!(r"^{}_v(\d+)\.txt$", regex::escape(prompt_id)))
            .map_err(|e| Error::Malformed(e.to_string()))?;

        let mut versions: Vec<(u64, PromptVersion)> = Vec::new();
        let entries = match std::fs::read_dir(&self.prompts_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(captures) = pattern.captures(&name) {
                if let Ok(number) = captures[1].parse::<u64>() {
                    versions.push((
                        number,
                        PromptVersion {
                            version: format!("v{}", number),
                            path: entry.path(),
                        },
                    ));
                }
            }
        }

        versions.sort_by_key(|(number, _)| *number);
        Ok(versions.into_iter().map(|(_, v)| v).collect())
    }

    /// Pin a prompt version for a campaign, so different campaigns can run
    /// different prompt generations side by side.
    pub fn pin_prompt_version(&mut self, campaign_id: &str, prompt_id: &str, version: &str) {
        self.pinned_versions
            .entry(campaign_id.to_string())
            .or_default()
            .insert(prompt_id.to_string(), version.to_string());
    }

    pub fn get_pinned_versions(&self, campaign_id: &str) -> HashMap<String, String> {
        self.pinned_versions
            .get(campaign_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn prompts_dir(&self) -> &Path {
        &self.prompts_dir
    }
}

// Header comments of the form `# key: value` carry template metadata.
fn parse_metadata(template: &str) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    for line in template.lines() {
        if !line.starts_with('#') {
            break;
        }
        if let Some(rest) = line.trim_start_matches('#').split_once(':') {
            let (key, value) = rest;
            let key = key.trim();
            if key.chars().all(|c| c.is_alphanumeric() || c == '_') && !key.is_empty() {
                metadata.insert(key.to_lowercase(), value.trim().to_string());
            }
        }
    }
    metadata
}
