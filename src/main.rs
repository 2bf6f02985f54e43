// main.rs
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bstr::io::BufReadExt;
use bstr::ByteSlice;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{info, LevelFilter};
use rayon::ThreadPoolBuilder;

use fastbpe::tokenizer::pre_tokenizer::{PreTokenizer, Whitespace};
use fastbpe::tokenizer::progress::sentence_bar;
use fastbpe::{BPE, BpeBuilder, Config};

#[derive(Parser)]
#[command(name = "fastbpe")]
#[command(about = "Apply learned BPE codes to tokenized text", long_about = None)]
#[command(version)]
struct Cli {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Less logging (-q warn, -qq error)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    /// Size of the rayon pool used for batches
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment a whole file (or stdin) in batches
    Apply(ApplyArgs),
    /// Segment stdin line by line, flushing after every line
    Stream(ModelArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// Merge-rule file, one `left right [count]` rule per line
    #[arg(short, long)]
    codes: Option<PathBuf>,

    /// Vocabulary file, one `form count` entry per line
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// JSON configuration; --codes and --vocab override it
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ApplyArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Input file, `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write each sentence as a JSON array of tokens
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Sentences segmented per batch
    #[arg(long, default_value_t = 10_000)]
    batch_size: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Some(threads) = cli.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("unable to configure Rayon thread pool")?;
    }

    match cli.command {
        Commands::Apply(args) => run_apply(args),
        Commands::Stream(args) => run_stream(args),
    }
}

/// Level forced by `-v`/`-q`. Without either flag `RUST_LOG` (default
/// `info`) decides.
fn log_level(verbose: u8, quiet: u8) -> Option<LevelFilter> {
    if quiet > 0 {
        return Some(match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        });
    }
    match verbose {
        0 => None,
        1 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    if let Some(level) = log_level(verbose, quiet) {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn load_model(args: &ModelArgs) -> Result<BPE> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("unable to read config {}", path.display()))?,
        None => Config::default(),
    };
    let mut builder = BpeBuilder::from_config(config);
    if let Some(codes) = &args.codes {
        builder = builder.codes(codes.clone());
    }
    if let Some(vocab) = &args.vocab {
        builder = builder.vocab(vocab.clone());
    }
    builder.build().context("unable to load BPE tables")
}

fn open_input(input: &str) -> Result<Box<dyn BufRead>> {
    if input == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(input).with_context(|| format!("unable to open {input}"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn write_batch<W: Write>(bpe: &BPE, batch: &[String], writer: &mut W, json: bool) -> io::Result<()> {
    for tokens in bpe.apply_sentences(batch) {
        if json {
            writeln!(writer, "{}", serde_json::to_string(&tokens)?)?;
        } else {
            writeln!(writer, "{}", tokens.join(" "))?;
        }
    }
    Ok(())
}

/// Reads lines into batches of at most `batch_size` sentences and writes one
/// output line per input line. Returns the number of sentences.
///
/// Invalid UTF-8 is replaced rather than rejected.
fn segment_lines<R, W, F>(
    bpe: &BPE,
    mut reader: R,
    writer: &mut W,
    batch_size: usize,
    json: bool,
    mut on_batch: F,
) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(usize),
{
    let batch_size = batch_size.max(1);
    let mut batch: Vec<String> = Vec::with_capacity(batch_size);
    let mut total = 0;

    reader.for_byte_line(|line| {
        batch.push(line.to_str_lossy().into_owned());
        if batch.len() == batch_size {
            write_batch(bpe, &batch, writer, json)?;
            total += batch.len();
            on_batch(batch.len());
            batch.clear();
        }
        Ok(true)
    })?;

    if !batch.is_empty() {
        write_batch(bpe, &batch, writer, json)?;
        total += batch.len();
        on_batch(batch.len());
    }
    Ok(total)
}

fn run_apply(args: ApplyArgs) -> Result<()> {
    let bpe = load_model(&args.model)?;
    let reader = open_input(&args.input)?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("unable to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(sink);

    let bar = sentence_bar(args.output.is_some());
    let total = segment_lines(&bpe, reader, &mut writer, args.batch_size, args.json, |n| {
        bar.inc(n as u64)
    })
    .with_context(|| format!("unable to segment {}", args.input))?;
    bar.finish();
    writer.flush()?;

    info!("segmented {} sentences from {}", total, args.input);
    Ok(())
}

fn run_stream(args: ModelArgs) -> Result<()> {
    let bpe = load_model(&args)?;
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout().lock();

    reader.for_byte_line(|line| {
        let text = line.to_str_lossy();
        let tokens = bpe.apply_tokens(&Whitespace.pre_tokenize(&text));
        writeln!(writer, "{}", tokens.join(" "))?;
        writer.flush()?;
        Ok(true)
    })?;
    Ok(())
}
