use crate::config::Config;
use crate::error::{QbatchError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_data(config, &mut errors);
        Self::validate_batch(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(QbatchError::ConfigValidation { errors })
        }
    }

    fn validate_data(config: &Config, errors: &mut Vec<ValidationError>) {
        // File existence is not checked here; the readers report missing
        // files with full path context when they open them
        if config.data.corpus_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "data.corpus_file",
                "Corpus file path cannot be empty",
            ));
        }

        if config.data.embeddings_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "data.embeddings_file",
                "Embeddings file path cannot be empty",
            ));
        }

        if config.data.train_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "data.train_file",
                "Train file path cannot be empty",
            ));
        }
    }

    fn validate_batch(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.batch.batch_size == 0 {
            errors.push(ValidationError::new(
                "batch.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if config.batch.k_neg == 0 {
            errors.push(ValidationError::new(
                "batch.k_neg",
                "Negative sample cap must be greater than 0",
            ));
        }

        if config.batch.max_body_len == 0 {
            errors.push(ValidationError::new(
                "batch.max_body_len",
                "Maximum body length must be greater than 0",
            ));
        }
    }
}
