use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hack_vmt::{translate, Bootstrap, SourceModule, TranslatorConfig};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Translate VM code (a .vm file or a directory of them) into Hack assembly"
)]
struct Opts {
    /// Input .vm file or directory of .vm files
    #[arg(value_name = "SOURCE")]
    source: PathBuf,
    /// Output .asm file (default: beside the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// JSON translator config; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    bootstrap: Option<Bootstrap>,
    /// Entry function called by the bootstrap
    #[arg(long)]
    entry: Option<String>,
    /// Do not emit `// [ADDR] command` comments
    #[arg(long)]
    no_annotate: bool,
    /// Do not copy source comments
    #[arg(long)]
    no_comments: bool,
    /// Accept jumps to labels never declared in the same function
    #[arg(long)]
    lenient_labels: bool,
}

/// Module name of a `.vm` file: its stem, which must start upper-case.
fn module_name(path: &Path) -> Result<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("vm") {
        bail!("{}: input file must have the .vm extension", path.display());
    }
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("{}: bad file name", path.display()))?;
    if !stem.starts_with(|c: char| c.is_ascii_uppercase()) {
        bail!("{}: module name must start with an upper-case letter", path.display());
    }
    Ok(stem.to_string())
}

/// Input files in processing order, and the default output path.
fn discover(source: &Path) -> Result<(Vec<PathBuf>, PathBuf)> {
    if source.is_file() {
        module_name(source)?;
        return Ok((vec![source.to_path_buf()], source.with_extension("asm")));
    }
    if !source.is_dir() {
        bail!("source is neither a file nor a directory: {}", source.display());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(source)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("vm") {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        bail!("no VM source files (*.vm) found in {}", source.display());
    }
    let dir_name = source
        .canonicalize()?
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot name output for {}", source.display()))?;
    Ok((files, source.join(format!("{dir_name}.asm"))))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let mut config = match &opts.config {
        Some(path) => TranslatorConfig::load(path)?,
        None => TranslatorConfig::default(),
    };
    if let Some(b) = opts.bootstrap {
        config.bootstrap = b;
    }
    if let Some(entry) = &opts.entry {
        config.entry_function = entry.clone();
    }
    config.annotate &= !opts.no_annotate;
    config.echo_comments &= !opts.no_comments;
    config.strict_labels &= !opts.lenient_labels;

    let (files, default_out) = discover(&opts.source)?;
    let mut modules = Vec::with_capacity(files.len());
    for path in &files {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        modules.push(SourceModule::new(module_name(path)?, &text));
    }

    let lines = translate(&modules, &config)?;
    let out = opts.output.unwrap_or(default_out);
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(&out, text).with_context(|| format!("writing {}", out.display()))?;
    info!(modules = modules.len(), output = %out.display(), "translation complete");
    Ok(())
}
