//! Main Sieve struct and public API.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::censor::{CensoringService, PseudonymStats};
use crate::engine::{ExecutionEngine, ExecutionResult};
use crate::error::{Result, SieveError};
use crate::input::{Dataset, DatasetLoader, LoaderConfig, SourceMetadata, Value};
use crate::llm::{self, LlmChoice, LlmConfig, SpecGenerator};
use crate::profile::Profile;
use crate::response::{ColumnStatistics, QueryResponse, ResponseBuilder, column_statistics};
use crate::spec::{QuerySpec, SpecParser};

/// Port the HTTP server listens on by default.
pub const DEFAULT_PORT: u16 = 7788;

/// Configuration built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct SieveConfig {
    /// Built-in profile name or path to a JSON profile.
    pub profile: String,
    /// Dataset file; falls back to the profile's default path.
    pub data_path: Option<PathBuf>,
    pub llm: LlmChoice,
    /// Model override for the chosen provider.
    pub model: Option<String>,
    pub loader: LoaderConfig,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            profile: "default_profile".to_string(),
            data_path: None,
            llm: LlmChoice::None,
            model: None,
            loader: LoaderConfig::default(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

impl SieveConfig {
    /// Provider configuration with the model override applied.
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig::with_model(
            self.model
                .clone()
                .unwrap_or_else(|| llm::default_model(self.llm).to_string()),
        )
    }
}

/// Dataset-level statistic for one profile stats column.
#[derive(Debug, Clone, Serialize)]
pub struct StatEntry {
    pub column: String,
    #[serde(flatten)]
    pub statistics: ColumnStatistics,
    /// Smallest and largest values of a numeric or date column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
}

/// Summary served by the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub profile: String,
    pub total_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    pub columns: IndexMap<String, StatEntry>,
    pub pseudonyms: PseudonymStats,
}

/// Answers questions about one dataset under one profile.
///
/// Cheap to share: the dataset, profile and pseudonym table sit behind `Arc`s
/// and nothing here is mutated after construction apart from the pseudonym
/// table, which handles its own synchronization.
pub struct Sieve {
    profile: Arc<Profile>,
    dataset: Arc<Dataset>,
    source: Option<SourceMetadata>,
    censor: Arc<CensoringService>,
    llm: Option<Arc<dyn SpecGenerator>>,
    engine: ExecutionEngine,
}

impl Sieve {
    /// Resolve the profile, load its dataset and build the configured provider.
    pub fn open(config: &SieveConfig) -> Result<Self> {
        let profile = Profile::resolve(&config.profile)?;
        let path = config
            .data_path
            .clone()
            .or_else(|| profile.data_path.clone())
            .ok_or_else(|| {
                SieveError::Config(format!(
                    "no data file given and profile '{}' has no default",
                    profile.name
                ))
            })?;

        let loader = DatasetLoader::with_config(config.loader.clone());
        let (dataset, source) = loader.load_file(&path, &profile.schema)?;

        let mut sieve = Self::from_parts(profile, dataset)?;
        sieve.source = Some(source);
        if let Some(generator) = llm::from_choice(config.llm, config.llm_config())? {
            sieve.llm = Some(Arc::from(generator));
        }
        Ok(sieve)
    }

    /// Build from an already-loaded dataset. Missing required columns are an error.
    pub fn from_parts(profile: Profile, dataset: Dataset) -> Result<Self> {
        profile.check_dataset(&dataset)?;
        info!(
            profile = %profile.name,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "sieve ready"
        );

        Ok(Self {
            profile: Arc::new(profile),
            dataset: Arc::new(dataset),
            source: None,
            censor: Arc::new(CensoringService::new()),
            llm: None,
            engine: ExecutionEngine::new(),
        })
    }

    /// Use `generator` to turn questions into specifications.
    pub fn with_llm(mut self, generator: impl SpecGenerator + 'static) -> Self {
        self.llm = Some(Arc::new(generator));
        self
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn source(&self) -> Option<&SourceMetadata> {
        self.source.as_ref()
    }

    pub fn censor(&self) -> &CensoringService {
        &self.censor
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Answer a question end to end: prompt, generate, validate, execute, censor.
    ///
    /// Never fails; every error becomes a failure payload.
    pub fn ask(&self, question: &str) -> QueryResponse {
        let builder = ResponseBuilder::new(&self.profile.schema, &self.censor);

        let Some(generator) = &self.llm else {
            let err = SieveError::Config("no LLM provider configured".to_string());
            return builder.failure(question, &err, None);
        };

        let prompt = llm::prompts::spec_prompt(&self.profile, &self.dataset, question);
        debug!(provider = generator.name(), chars = prompt.user.len(), "prompt built");

        match generator.generate_spec(&prompt) {
            Ok(text) => self.answer_with_spec(question, &text),
            Err(err) => builder.failure(question, &err, None),
        }
    }

    /// Answer a question with specification text supplied by the caller.
    pub fn answer_with_spec(&self, question: &str, spec_text: &str) -> QueryResponse {
        let builder = ResponseBuilder::new(&self.profile.schema, &self.censor);

        let spec = match SpecParser::new(&self.profile.schema).parse(spec_text) {
            Ok(spec) => spec,
            Err(err) => return builder.failure(question, &err, None),
        };

        match self.engine.execute(&spec, &self.dataset, &self.profile.schema) {
            Ok(result) => builder.success(question, spec, &result),
            Err(err) => builder.failure(question, &err, Some(spec)),
        }
    }

    /// Validate and execute specification text without building a response.
    ///
    /// Rows come back uncensored; callers must not expose them directly.
    pub fn run_spec(&self, spec_text: &str) -> Result<(QuerySpec, ExecutionResult)> {
        let spec = SpecParser::new(&self.profile.schema).parse(spec_text)?;
        let result = self.engine.execute(&spec, &self.dataset, &self.profile.schema)?;
        Ok((spec, result))
    }

    /// Censor every sensitive value in the dataset, so any pseudonym it can
    /// yield is reversible in this process. Returns the table size.
    pub fn index_pseudonyms(&self) -> usize {
        for (column, kind) in self.profile.schema.sensitive_columns() {
            if let Some(index) = self.dataset.column_index(column) {
                for value in self.dataset.column_values(index) {
                    self.censor.censor_value(value, kind);
                }
            }
        }
        debug!(pseudonyms = self.censor.len(), "pseudonym table indexed");
        self.censor.len()
    }

    /// Dataset summary over the profile's stats columns.
    pub fn stats(&self) -> DatasetStats {
        let columns = self
            .profile
            .stats_columns
            .iter()
            .filter_map(|(label, column)| {
                let index = self.dataset.column_index(column)?;
                let schema = &self.profile.schema;
                let sensitive = schema.get_column(column).is_some_and(|c| c.censor.is_some());
                let ordered = !sensitive && schema.column_type(column).is_some_and(|t| t.is_ordered());
                let present = || self.dataset.column_values(index).filter(|v| !v.is_null());

                let mut statistics = column_statistics(self.dataset.column_values(index));
                if sensitive {
                    statistics.numeric = None;
                }
                let entry = StatEntry {
                    column: column.clone(),
                    statistics,
                    min: ordered
                        .then(|| present().min_by(|a, b| a.total_cmp(b)).cloned())
                        .flatten(),
                    max: ordered
                        .then(|| present().max_by(|a, b| a.total_cmp(b)).cloned())
                        .flatten(),
                };
                Some((label.clone(), entry))
            })
            .collect();

        DatasetStats {
            profile: self.profile.name.clone(),
            total_records: self.dataset.row_count(),
            source: self.source.clone(),
            columns,
            pseudonyms: self.censor.stats(),
        }
    }
}
