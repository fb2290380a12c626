use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use context_bank::bank::{BankConfig, ContextBank};
use context_bank::extraction::{Alphabet, Blocklist, ExtractionConfig, WindowExtractor};
use context_bank::sampling::{
    count_groups, curation_rng, DiversityConfig, DiversitySampler, FrequencyCapConfig,
    FrequencyCapSampler, QuotaSubsampler, DEFAULT_SEED,
};
use context_bank::store::{StoreBuildConfig, StoreBuilder};
use context_bank::types::{read_records, ExampleId, RecordShape};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "context-bank")]
#[command(about = "Curate and serve word-in-context examples", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Streams {
    /// Input file (omit for stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (omit for stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Plain,
    WithSentence,
    Grouped,
    WithFrequency,
}

impl From<Shape> for RecordShape {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Plain => RecordShape::Plain,
            Shape::WithSentence => RecordShape::WithSentence,
            Shape::Grouped => RecordShape::Grouped,
            Shape::WithFrequency => RecordShape::WithFrequency,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Extract candidate contexts from sentence-per-line text
    Extract {
        #[command(flatten)]
        streams: Streams,
        /// Minimum (inclusive) word length in characters
        #[arg(short = 's', long, default_value_t = 4)]
        word_min_len: usize,
        /// Maximum (inclusive) word length in characters
        #[arg(short = 'm', long, default_value_t = 15)]
        word_max_len: usize,
        /// Length of left context in tokens
        #[arg(short = 'l', long, default_value_t = 5)]
        left_len: usize,
        /// Length of right context in tokens
        #[arg(short = 'r', long, default_value_t = 5)]
        right_len: usize,
        /// Allowed word characters (default: Hungarian lowercase)
        #[arg(long)]
        alphabet: Option<String>,
        /// File with one forbidden word per line
        #[arg(long)]
        blocklist: Option<PathBuf>,
        /// Keep the source sentence as a fourth field
        #[arg(long, default_value_t = false)]
        keep_sentence: bool,
    },
    /// Keep a few mutually dissimilar contexts per word
    SampleDiverse {
        #[command(flatten)]
        streams: Streams,
        /// Sentences to keep per word
        #[arg(short = 'n', long, default_value_t = 30)]
        target_count: usize,
        /// Tokens per side compared for near-duplicates
        #[arg(long, default_value_t = 4)]
        dedup_width: usize,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// Cap the number of contexts per word
    SampleCapped {
        #[command(flatten)]
        streams: Streams,
        /// Lines to keep per word
        #[arg(short = 'n', long, default_value_t = 30)]
        target_count: usize,
        /// Layout of the input lines
        #[arg(long, value_enum, default_value_t = Shape::Plain)]
        shape: Shape,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// Count contiguous word groups
    CountGroups {
        /// Input file (omit for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Layout of the input lines
        #[arg(long, value_enum, default_value_t = Shape::WithFrequency)]
        shape: Shape,
    },
    /// Keep a random subset of whole word groups
    SampleQuota {
        #[command(flatten)]
        streams: Streams,
        /// Number of word groups to keep
        #[arg(short = 'k', long)]
        keep_count: usize,
        /// Number of groups in the input (counted from the input file when omitted)
        #[arg(long)]
        total_groups: Option<usize>,
        /// Layout of the input lines
        #[arg(long, value_enum, default_value_t = Shape::WithFrequency)]
        shape: Shape,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// Load records into a new SQLite store directory
    BuildStore {
        /// Input file (omit for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Directory to create
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Layout of the input lines
        #[arg(long, value_enum, default_value_t = Shape::Plain)]
        shape: Shape,
        #[arg(long, default_value = "examples")]
        table: String,
        /// Rows per insert transaction
        #[arg(long, default_value_t = 100_000)]
        chunk_size: usize,
    },
    /// Print one masked example for a random id
    RandomExample {
        /// Bank configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print a random word in clear
    RandomWord {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print shown and new examples of a word
    ShowWord {
        #[arg(short, long)]
        config: PathBuf,
        /// Word to look up (derived from the first displayed id when omitted)
        #[arg(short, long)]
        word: Option<String>,
        /// Ids already shown, in display order
        #[arg(short, long, value_delimiter = ',')]
        displayed: Vec<u64>,
        /// Show the word instead of masking it
        #[arg(long, default_value_t = false)]
        reveal: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Extract {
            streams,
            word_min_len,
            word_max_len,
            left_len,
            right_len,
            alphabet,
            blocklist,
            keep_sentence,
        } => {
            // Configuration problems surface before any input is read
            let blocklist = match blocklist {
                Some(path) => Blocklist::load(&path)?,
                None => Blocklist::empty(),
            };
            let config = ExtractionConfig {
                word_min_len,
                word_max_len,
                left_len,
                right_len,
                alphabet: alphabet
                    .map(|chars| Alphabet::from_chars(chars.chars()))
                    .unwrap_or_else(Alphabet::hungarian_lowercase),
            };
            let extractor = WindowExtractor::new(config, blocklist)?;
            let shape = if keep_sentence {
                RecordShape::WithSentence
            } else {
                RecordShape::Plain
            };
            extractor.extract_to(
                open_input(streams.input.as_deref())?,
                open_output(streams.output.as_deref())?,
                shape,
            )?;
        }
        Command::SampleDiverse {
            streams,
            target_count,
            dedup_width,
            seed,
        } => {
            let sampler = DiversitySampler::new(DiversityConfig {
                target_count,
                dedup_width,
                ..DiversityConfig::v0()
            })?;
            let records = read_records(
                open_input(streams.input.as_deref())?,
                RecordShape::WithSentence,
            );
            let mut rng = curation_rng(seed);
            sampler.run(records, open_output(streams.output.as_deref())?, &mut rng)?;
        }
        Command::SampleCapped {
            streams,
            target_count,
            shape,
            seed,
        } => {
            let sampler = FrequencyCapSampler::new(FrequencyCapConfig { target_count })?;
            let records = read_records(open_input(streams.input.as_deref())?, shape.into());
            let mut rng = curation_rng(seed);
            sampler.run(records, open_output(streams.output.as_deref())?, &mut rng)?;
        }
        Command::CountGroups { input, shape } => {
            let groups = count_groups(open_input(input.as_deref())?, shape.into())?;
            println!("{groups}");
        }
        Command::SampleQuota {
            streams,
            keep_count,
            total_groups,
            shape,
            seed,
        } => {
            let total_groups = match (total_groups, streams.input.as_deref()) {
                (Some(total), _) => total,
                (None, Some(path)) => count_groups(open_input(Some(path))?, shape.into())?,
                (None, None) => bail!("--total-groups is required when reading from stdin"),
            };
            let mut rng = curation_rng(seed);
            let subsampler = QuotaSubsampler::new(total_groups, keep_count, &mut rng)?;
            subsampler.filter(
                open_input(streams.input.as_deref())?,
                open_output(streams.output.as_deref())?,
                shape.into(),
            )?;
        }
        Command::BuildStore {
            input,
            output_dir,
            shape,
            table,
            chunk_size,
        } => {
            let builder = StoreBuilder::new(StoreBuildConfig {
                table,
                chunk_size,
                ..StoreBuildConfig::v0()
            });
            let records = read_records(open_input(input.as_deref())?, shape.into());
            let store = builder.build(records, &output_dir)?;
            println!("{}", serde_json::to_string_pretty(&store.manifest)?);
        }
        Command::RandomExample { config } => {
            let bank = open_bank(&config)?;
            for record in bank.select_one_random_example()? {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        Command::RandomWord { config } => {
            let bank = open_bank(&config)?;
            println!("{}", serde_json::to_string(&bank.select_random_word()?)?);
        }
        Command::ShowWord {
            config,
            word,
            displayed,
            reveal,
        } => {
            let bank = open_bank(&config)?;
            let displayed = displayed
                .into_iter()
                .map(ExampleId::new)
                .collect::<Result<Vec<_>, _>>()?;
            let partition = bank.read_examples_for_word(word.as_deref(), &displayed, !reveal)?;
            println!("{}", serde_json::to_string(&partition)?);
        }
    }

    Ok(())
}

fn open_bank(config_path: &Path) -> Result<ContextBank<context_bank::store::SqliteTable>> {
    let config = BankConfig::load(config_path)?;
    ContextBank::open(&config)
        .with_context(|| format!("opening bank from {}", config_path.display()))
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Box::new(BufReader::new(f))
        }
        None => Box::new(BufReader::new(io::stdin())),
    })
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    })
}
