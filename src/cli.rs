//! CLI: JSON documents → Erlang terms
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use erlterm::{Scheme, SerializeError, Serializer, Value};

use crate::jq_exec::JqFilter;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// encode JSON documents as Erlang term text, shaped by a path-pattern scheme
#[derive(Parser, Debug)]
#[command(name = "erlterm", version)]
pub struct CommandLineInterface {
    /// more log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print one Erlang term per input document
    Encode(EncodeOut),
    /// encode, and list the scheme decision taken at every path
    Explain(ExplainOut),
    /// validate a scheme file and print the effective scheme
    CheckScheme(CheckScheme),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is encoded separately
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct SchemeSettings {
    /// scheme file: a JSON object of `"pattern": "type"` entries, in priority order
    #[arg(long)]
    scheme: Option<PathBuf>,

    /// inline `PATTERN=TYPE` entry, ahead of the scheme file (repeatable)
    #[arg(long = "rule", value_name = "PATTERN=TYPE")]
    rules: Vec<String>,

    /// base scheme file, consulted after the call scheme
    #[arg(long)]
    base: Option<PathBuf>,

    /// leave out the built-in default rules
    #[arg(long, default_value_t = false)]
    no_defaults: bool,
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// end every term with `.` so the output reads back with file:consult/1
    #[arg(long, default_value_t = false)]
    terminator: bool,
}

#[derive(clap::Parser, Debug)]
struct EncodeOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    scheme_settings: SchemeSettings,

    #[command(flatten)]
    output_settings: OutputSettings,

    /// encode documents on a thread pool
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(clap::Parser, Debug)]
struct ExplainOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    scheme_settings: SchemeSettings,

    #[command(flatten)]
    output_settings: OutputSettings,

    /// also print up to N spellings of each decided path
    #[arg(long, value_name = "N", default_value_t = 0)]
    variants: usize,
}

#[derive(clap::Parser, Debug)]
struct CheckScheme {
    /// scheme file to check
    file: PathBuf,

    /// check without the built-in default rules underneath
    #[arg(long, default_value_t = false)]
    no_defaults: bool,
}

/// One input document and where it came from.
#[derive(Debug)]
struct Document {
    origin: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let jq = self.jq_expr.as_deref().map(JqFilter::compile).transpose()?;
        let sources = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;

        let mut out = Vec::new();
        for source in sources {
            let text = read_source(&source)?;
            let label = source.label();
            if self.ndjson {
                for (ix, line) in text.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let origin = format!("{label}:{}", ix + 1);
                    let json = serde_json::from_str::<serde_json::Value>(line)
                        .with_context(|| format!("failed to parse NDJSON line ({origin})"))?;
                    self.process(origin, json, jq.as_ref(), &mut out)?;
                }
            } else {
                let json = serde_json::from_str::<serde_json::Value>(&text)
                    .with_context(|| format!("failed to parse JSON source file ({label})"))?;
                self.process(label, json, jq.as_ref(), &mut out)?;
            }
        }
        log::info!("loaded {} document(s)", out.len());
        Ok(out)
    }

    fn process(
        &self,
        origin: String,
        json: serde_json::Value,
        jq: Option<&JqFilter>,
        out: &mut Vec<Document>,
    ) -> Result<()> {
        let json = match self.json_pointer.as_deref() {
            None => json,
            Some(pointer) => json
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer `{pointer}` selects nothing in {origin}"))?,
        };
        match jq {
            None => out.push(Document { origin, value: Value::from_json(&json) }),
            Some(jq) => {
                let results = jq.run(&json)
                    .with_context(|| format!("failed to apply jq expression ({origin})"))?;
                let many = results.len() > 1;
                for (ix, json) in results.into_iter().enumerate() {
                    let origin = if many { format!("{origin}#{ix}") } else { origin.clone() };
                    out.push(Document { origin, value: Value::from_json(&json) });
                }
            }
        }
        Ok(())
    }
}

impl SchemeSettings {
    /// The serializer (carrying the base layer) and the call scheme.
    fn build(&self) -> Result<(Serializer, Scheme)> {
        let mut inline = Scheme::new();
        for rule in &self.rules {
            let (pattern, target) = Scheme::parse_rule(rule)?;
            inline.insert(pattern, target);
        }
        let file = match &self.scheme {
            Some(path) => Scheme::from_file(path)?,
            None => Scheme::new(),
        };
        let call = Scheme::layered([&inline, &file]);

        let base = match &self.base {
            Some(path) => Scheme::from_file(path)?,
            None => Scheme::new(),
        };
        let serializer = if self.no_defaults {
            Serializer::without_defaults(base)
        } else {
            Serializer::with_scheme(base)
        };

        let effective = serializer.effective_scheme(&call);
        effective.validate().context("invalid scheme")?;
        log::debug!("effective scheme has {} entries", effective.len());
        Ok((serializer, call))
    }
}

impl OutputSettings {
    fn term(&self, text: String) -> String {
        if self.terminator { format!("{text}.") } else { text }
    }

    fn write(&self, src: &str) -> Result<()> {
        match self.out.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(out, src)
                    .with_context(|| format!("failed to write {}", out.display()))?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(src.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

impl EncodeOut {
    fn run(&self) -> Result<()> {
        let (serializer, call) = self.scheme_settings.build()?;
        let docs = self.input_settings.load_documents()?;
        let src = self.render(&serializer, &call, &docs)?;
        self.output_settings.write(&src)
    }

    /// One term per line, in input order. Unsupported documents are skipped.
    fn render(&self, serializer: &Serializer, call: &Scheme, docs: &[Document]) -> Result<String> {
        let encode = |doc: &Document| serializer.serialize(&doc.value, call);
        let results: Vec<Result<Option<String>, SerializeError>> = if self.parallel {
            docs.par_iter().map(encode).collect()
        } else {
            docs.iter().map(encode).collect()
        };

        let mut src = String::new();
        for (doc, result) in docs.iter().zip(results) {
            match result.with_context(|| format!("failed to encode {}", doc.origin))? {
                Some(text) => {
                    src.push_str(&self.output_settings.term(text));
                    src.push('\n');
                }
                None => warn_unsupported(&doc.origin),
            }
        }
        Ok(src)
    }
}

impl ExplainOut {
    fn run(&self) -> Result<()> {
        let (serializer, call) = self.scheme_settings.build()?;
        let docs = self.input_settings.load_documents()?;
        let src = self.render(&serializer, &call, &docs)?;
        self.output_settings.write(&src)
    }

    /// Each term preceded by its origin and followed by its decisions, all
    /// but the term itself as Erlang comments.
    fn render(&self, serializer: &Serializer, call: &Scheme, docs: &[Document]) -> Result<String> {
        let mut src = String::new();
        for doc in docs {
            let explanation = serializer
                .explain(&doc.value, call)
                .with_context(|| format!("failed to encode {}", doc.origin))?;
            let Some(explanation) = explanation else {
                warn_unsupported(&doc.origin);
                continue;
            };
            src.push_str(&format!("% {}\n", doc.origin));
            src.push_str(&self.output_settings.term(explanation.output));
            src.push('\n');
            for decision in &explanation.decisions {
                src.push_str(&format!(
                    "%   {} => {} ({})\n",
                    decision.path, decision.target, decision.pattern
                ));
                for variant in decision.path.variants().take(self.variants) {
                    src.push_str(&format!("%       {variant}\n"));
                }
            }
        }
        Ok(src)
    }
}

impl CheckScheme {
    fn run(&self) -> Result<()> {
        let scheme = Scheme::from_file(&self.file)?;
        let serializer = if self.no_defaults {
            Serializer::without_defaults(Scheme::new())
        } else {
            Serializer::new()
        };
        let effective = serializer.effective_scheme(&scheme);
        effective.validate()?;
        if effective.is_empty() {
            bail!("scheme {} is empty", self.file.display());
        }
        let mut stdout = std::io::stdout().lock();
        for (pattern, target) in effective.iter() {
            writeln!(stdout, "{pattern} => {target}")?;
        }
        eprintln!(
            "{} {} ({} own entries, {} effective)",
            "ok".green().bold(),
            self.file.display(),
            scheme.len(),
            effective.len()
        );
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Encode(target) => target.run(),
            Command::Explain(target) => target.run(),
            Command::CheckScheme(target) => target.run(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, PartialEq)]
enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    fn label(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }
}

fn read_source(source: &Source) -> Result<String> {
    match source {
        Source::Stdin => {
            let mut text = String::new();
            std::io::stdin().lock().read_to_string(&mut text).context("failed to read stdin")?;
            Ok(text)
        }
        Source::File(path) => read_file(path),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read source file {}", path.display()))
}

fn warn_unsupported(origin: &str) {
    log::warn!("{origin} holds a value with no term form");
    eprintln!("{} skipping {origin}: unsupported value", "warning:".yellow().bold());
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<Source>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<Source>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if pattern == "-" {
            out.push(Source::Stdin);
        } else if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(Source::File(entry?));
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(Source::File(PathBuf::from(pattern)));
        }
    }

    Ok(out)
}
