//! The biography the assistant speaks for, loaded once at startup.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::info;

use persona_config::PersonaConfig;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to extract text from PDF {path}: {message}")]
    Pdf { path: PathBuf, message: String },
    #[error("{path} contains no text")]
    Empty { path: PathBuf },
}

/// Immutable persona content.  Cheap to share behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    summary: String,
    resume_text: String,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        summary: impl Into<String>,
        resume_text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
            resume_text: resume_text.into(),
        }
    }

    /// Read the summary and résumé named by `config`.  Any failure is fatal
    /// to startup.
    pub fn load(config: &PersonaConfig) -> Result<Self, ProfileError> {
        let summary = read_text(&config.summary_path)?;
        let resume_text = read_resume(&config.resume_path)?;
        if resume_text.trim().is_empty() {
            return Err(ProfileError::Empty {
                path: config.resume_path.clone(),
            });
        }

        info!(
            name = %config.name,
            summary_chars = summary.chars().count(),
            resume_chars = resume_text.chars().count(),
            "profile loaded"
        );
        Ok(Self::new(config.name.clone(), summary, resume_text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }
}

fn read_text(path: &Path) -> Result<String, ProfileError> {
    fs::read_to_string(path).map_err(|source| ProfileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// PDFs have the text of every page concatenated; anything else is read as
/// UTF-8 text.
fn read_resume(path: &Path) -> Result<String, ProfileError> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return read_text(path);
    }

    let bytes = fs::read(path).map_err(|source| ProfileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    run_extractor(path, || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|err| err.to_string())
    })
}

/// pdf-extract panics on some font encodings it does not support; a panic is
/// reported as [`ProfileError::Pdf`] like any other extraction failure.
fn run_extractor<F>(path: &Path, extract: F) -> Result<String, ProfileError>
where
    F: FnOnce() -> Result<String, String>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(extract))
        .unwrap_or_else(|payload| Err(format!("extractor panicked: {}", panic_message(&*payload))));
    outcome.map_err(|message| ProfileError::Pdf {
        path: path.to_path_buf(),
        message,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
