use std::path::PathBuf;

use hf_hub::{api::sync::Api, Repo, RepoType};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::pipelines::cache::ModelOptions;

pub(crate) const WEIGHTS_FILE: &str = "model.safetensors";
pub(crate) const CONFIG_FILE: &str = "config.json";
pub(crate) const VECTORIZER_FILE: &str = "vectorizer.json";

/// Where a trained artifact set lives.
///
/// An artifact set is three files produced by an external training run:
/// `model.safetensors` (the linear classifier), `config.json` (its label
/// mapping), and `vectorizer.json` (the fitted vectorizer).
#[derive(Debug, Clone)]
pub enum ArtifactSource {
    /// A local directory containing the three artifact files.
    Dir(PathBuf),
    /// A Hugging Face Hub model repository (e.g. `"user/review-sentiment"`).
    HubRepo(String),
}

impl ArtifactSource {
    /// Artifact set in a local directory.
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        ArtifactSource::Dir(path.into())
    }

    /// Artifact set in a Hugging Face Hub repository.
    pub fn hub(repo: impl Into<String>) -> Self {
        ArtifactSource::HubRepo(repo.into())
    }

    /// Resolve one artifact file to a local path, downloading it first for
    /// Hub sources.
    pub(crate) fn locate(&self, filename: &str) -> Result<PathBuf> {
        match self {
            ArtifactSource::Dir(dir) => {
                let path = dir.join(filename);
                if !path.exists() {
                    return Err(PipelineError::Artifact(format!(
                        "Artifact file not found: {}",
                        path.display()
                    )));
                }
                debug!("resolved {} to {}", filename, path.display());
                Ok(path)
            }
            ArtifactSource::HubRepo(repo_id) => {
                let api = Api::new()?;
                let repo = api.repo(Repo::new(repo_id.clone(), RepoType::Model));
                let path = repo.get(filename).map_err(|e| {
                    PipelineError::Download(format!(
                        "Failed to download '{}' from '{}': {}",
                        filename, repo_id, e
                    ))
                })?;
                debug!("downloaded {} from {}", filename, repo_id);
                Ok(path)
            }
        }
    }
}

impl ModelOptions for ArtifactSource {
    fn cache_key(&self) -> String {
        match self {
            ArtifactSource::Dir(dir) => format!("dir:{}", dir.display()),
            ArtifactSource::HubRepo(repo) => format!("hub:{}", repo),
        }
    }
}
