//! CLI: export file → DBML file, or export directory → DBML directory
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Args, Parser};

use crate::config::{ConvertOptions, DefaultStyle, IdentQuote, TableNaming};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert SchemaCrawler JSON catalog exports into DBML
#[derive(Parser, Debug)]
#[command(name = "sc2dbml", version)]
pub struct CommandLineInterface {
    /// export file, '-' for stdin, or a directory of exports (batch mode)
    input: PathBuf,

    /// output .dbml file (stdout if omitted), or the output directory in batch mode
    output: Option<PathBuf>,

    #[command(flatten)]
    render_settings: RenderSettings,

    #[command(flatten)]
    batch_settings: BatchSettings,

    /// diagnostics verbosity on stderr (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

#[derive(Args, Debug, Clone)]
struct RenderSettings {
    /// quoting for table/column names that are not plain identifiers
    #[arg(long, value_enum, default_value_t = IdentQuote::Double)]
    identifier_quote: IdentQuote,

    /// rendering of column default expressions
    #[arg(long, value_enum, default_value_t = DefaultStyle::Raw)]
    defaults: DefaultStyle,

    /// table field used for `Table` names
    #[arg(long, value_enum, default_value_t = TableNaming::Name)]
    table_names: TableNaming,
}

#[derive(Args, Debug, Clone)]
struct BatchSettings {
    /// extension of the export files picked up in batch mode
    #[arg(long, default_value = "json")]
    extension: String,

    /// worker threads for batch mode (defaults to one per core)
    #[arg(long, short)]
    jobs: Option<usize>,

    /// write a JSON summary of the batch run to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl RenderSettings {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            identifier_quote: self.identifier_quote,
            defaults: self.defaults,
            table_names: self.table_names,
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level
    }

    pub fn run(&self) -> anyhow::Result<ExitCode> {
        let options = self.render_settings.options();
        if self.input.is_dir() {
            self.run_batch(&options)
        } else {
            self.run_single(&options)?;
            Ok(ExitCode::SUCCESS)
        }
    }

    fn run_single(&self, options: &ConvertOptions) -> anyhow::Result<()> {
        if self.input.as_os_str() != "-" {
            crate::pipeline::convert_file(&self.input, self.output.as_deref(), options)?;
            return Ok(());
        }
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read export from stdin")?;
        let conversion = crate::pipeline::convert_str(&source, Path::new("<stdin>"), options)?;
        match self.output.as_deref() {
            Some(out) => crate::pipeline::write_atomic(out, &conversion.dbml)?,
            None => print!("{}", conversion.dbml),
        }
        Ok(())
    }

    fn run_batch(&self, options: &ConvertOptions) -> anyhow::Result<ExitCode> {
        let Some(out_dir) = self.output.as_deref() else {
            bail!("batch mode needs an output directory: {} is a directory", self.input.display());
        };
        if out_dir.is_file() {
            bail!("batch output {} exists and is not a directory", out_dir.display());
        }
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

        if let Some(jobs) = self.batch_settings.jobs {
            rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
                .context("failed to configure worker pool")?;
        }

        let inputs = crate::batch::collect_inputs(&self.input, &self.batch_settings.extension)
            .with_context(|| format!("failed to list inputs in {}", self.input.display()))?;
        if inputs.is_empty() {
            println!(
                "No .{} files found in {}",
                self.batch_settings.extension.trim_start_matches('.'),
                self.input.display()
            );
            return Ok(ExitCode::SUCCESS);
        }

        println!(
            "📂 Converting {} files from {} to {}",
            inputs.len(),
            self.input.display(),
            out_dir.display()
        );
        let report = crate::batch::run_batch(&inputs, out_dir, &self.batch_settings.extension, options);
        report.print();

        if let Some(report_path) = self.batch_settings.report.as_ref() {
            let report_src = serde_json::to_string_pretty(&report)?;
            crate::pipeline::write_atomic(report_path, &report_src)?;
        }

        Ok(if report.failed() == 0 { ExitCode::SUCCESS } else { ExitCode::from(1) })
    }
}
