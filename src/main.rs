use qbatch::annotations::read_annotations;
use qbatch::batch::{create_batches, create_eval_batches, domain_classifier_batch, Batch, EvalBatch};
use qbatch::cli::{Cli, Commands, ConfigAction};
use qbatch::config::Config;
use qbatch::corpus::{read_corpus, IdsCorpus};
use qbatch::error::{QbatchError, Result};
use qbatch::vocab::Embeddings;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Batches { seed, json } => {
            cmd_batches(cli.config, seed, json)?;
        }
        Commands::DomainBatch { seed, json } => {
            cmd_domain_batch(cli.config, seed, json)?;
        }
        Commands::Eval { json } => {
            cmd_eval(cli.config, json)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "qbatch=debug" } else { "qbatch=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt().with_env_filter(filter).with_target(false).init();
}

/// Per-batch summary printed by the `batches` subcommands
#[derive(Serialize)]
struct BatchSummary {
    batch: usize,
    questions: usize,
    triples: usize,
    title_rows: usize,
    body_rows: usize,
    triple_width: usize,
}

impl BatchSummary {
    fn new(index: usize, batch: &Batch) -> Self {
        Self {
            batch: index,
            questions: batch.num_questions(),
            triples: batch.num_triples(),
            title_rows: batch.titles.nrows(),
            body_rows: batch.bodies.nrows(),
            triple_width: batch.triples.ncols(),
        }
    }
}

/// Per-unit summary printed by the `eval` subcommand
#[derive(Serialize)]
struct EvalSummary {
    unit: usize,
    candidates: usize,
    relevant: i32,
    title_rows: usize,
    body_rows: usize,
}

impl EvalSummary {
    fn new(index: usize, unit: &EvalBatch) -> Self {
        Self {
            unit: index,
            candidates: unit.num_candidates(),
            relevant: unit.labels.sum(),
            title_rows: unit.titles.nrows(),
            body_rows: unit.bodies.nrows(),
        }
    }
}

/// Load the corpus and encode it; the shared front half of every command
fn load_encoded(config: &Config, rng: &mut StdRng) -> Result<(Embeddings, IdsCorpus)> {
    let embeddings = Embeddings::load(&config.data.embeddings_file, rng)?;
    let raw = read_corpus(&config.data.corpus_file)?;
    let corpus = IdsCorpus::encode(&embeddings, &raw, config.batch.max_body_len);
    Ok((embeddings, corpus))
}

fn cmd_batches(
    config_path: Option<std::path::PathBuf>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut rng = StdRng::seed_from_u64(seed.unwrap_or(config.batch.seed));

    let (embeddings, corpus) = load_encoded(&config, &mut rng)?;
    let records = read_annotations(&config.data.train_file, config.batch.k_neg, &mut rng)?;
    let batches = create_batches(
        &corpus,
        &records,
        config.batch.batch_size,
        embeddings.padding_id(),
        &mut rng,
    )?;

    let summaries: Vec<BatchSummary> = batches
        .iter()
        .enumerate()
        .map(|(i, b)| BatchSummary::new(i, b))
        .collect();

    if json {
        println!("{}", to_json(&summaries)?);
    } else {
        println!("✓ Assembled {} training batches", batches.len());
        for s in &summaries {
            println!(
                "  batch {:>4}: {:>5} questions, {:>5} triples, titles {}x{}, bodies {}x{}",
                s.batch, s.questions, s.triples, s.title_rows, s.questions, s.body_rows, s.questions
            );
        }
    }

    Ok(())
}

fn cmd_domain_batch(
    config_path: Option<std::path::PathBuf>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut rng = StdRng::seed_from_u64(seed.unwrap_or(config.batch.seed));

    let (embeddings, corpus) = load_encoded(&config, &mut rng)?;
    let records = read_annotations(&config.data.train_file, config.batch.k_neg, &mut rng)?;
    let batch = domain_classifier_batch(
        &corpus,
        &records,
        config.batch.batch_size,
        embeddings.padding_id(),
        &mut rng,
    )?;

    match batch {
        Some(batch) => {
            let summary = BatchSummary::new(0, &batch);
            if json {
                println!("{}", to_json(&summary)?);
            } else {
                println!(
                    "✓ Domain classifier batch: {} questions, {} triples",
                    summary.questions, summary.triples
                );
            }
        }
        None => {
            println!("No usable records; no batch was produced");
        }
    }

    Ok(())
}

fn cmd_eval(config_path: Option<std::path::PathBuf>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let eval_file = config.data.eval_file.clone().ok_or_else(|| {
        QbatchError::Config("data.eval_file is not set in the configuration".to_string())
    })?;

    let mut rng = StdRng::seed_from_u64(config.batch.seed);
    let (embeddings, corpus) = load_encoded(&config, &mut rng)?;
    let records = read_annotations(&eval_file, config.batch.k_neg, &mut rng)?;
    let units = create_eval_batches(&corpus, &records, embeddings.padding_id())?;

    let summaries: Vec<EvalSummary> = units
        .iter()
        .enumerate()
        .map(|(i, u)| EvalSummary::new(i, u))
        .collect();

    if json {
        println!("{}", to_json(&summaries)?);
    } else {
        println!("✓ Built {} evaluation units", units.len());
        for s in &summaries {
            println!(
                "  unit {:>5}: {:>3} candidates ({} relevant)",
                s.unit, s.candidates, s.relevant
            );
        }
    }

    Ok(())
}

fn cmd_config(config_path: Option<std::path::PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            println!("{}", to_json(&config)?);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Batch size: {}", config.batch.batch_size);
            println!("  K_neg: {}", config.batch.k_neg);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| QbatchError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'qbatch config init' to create one."
        );
        return Ok(Config::default());
    }

    Config::load(&path)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| QbatchError::Json {
        source: e,
        context: "Failed to serialize summary".to_string(),
    })
}
