//! Directory mode: convert every matching export file, independently and in parallel.
use std::path::{Path, PathBuf};

use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::ConvertOptions;
use crate::pipeline::convert_file;

pub const OUTPUT_EXTENSION: &str = "dbml";

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tables: usize,
    pub refs: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    /// One line per file, ✅ / ❌, in input order.
    pub fn print(&self) {
        for f in &self.files {
            let input_name = display_name(&f.input);
            if f.ok {
                println!("{} {input_name} → {}", "✅".green(), display_name(&f.output));
            } else {
                let error = f.error.as_deref().unwrap_or("unknown error");
                println!("{} {input_name}: {}", "❌".red(), error.red());
            }
        }
        let summary = format!("{} converted, {} failed", self.succeeded(), self.failed());
        if self.failed() == 0 {
            println!("{}", summary.green().bold());
        } else {
            println!("{}", summary.yellow().bold());
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// `<dir>/*.<extension>`, sorted.
pub fn collect_inputs(dir: &Path, extension: &str) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        extension.trim_start_matches('.')
    );
    let mut out = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        if path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// `<out_dir>/<name>.dbml`, where `<name>` is the input file name minus the
/// whole input `extension` (which may itself contain dots, e.g. `sc.json`).
pub fn output_path_for(input: &Path, out_dir: &Path, extension: &str) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let stem = match file_name.strip_suffix(&suffix) {
        Some(stem) if !stem.is_empty() => stem,
        _ => file_name.as_str(),
    };
    out_dir.join(format!("{stem}.{OUTPUT_EXTENSION}"))
}

/// Convert every input; one file failing never stops the others.
pub fn run_batch(inputs: &[PathBuf], out_dir: &Path, extension: &str, options: &ConvertOptions) -> BatchReport {
    let mut files: Vec<FileOutcome> = inputs
        .par_iter()
        .map(|input| {
            let output = output_path_for(input, out_dir, extension);
            match convert_file(input, Some(&output), options) {
                Ok(conversion) => FileOutcome {
                    input: input.clone(),
                    output,
                    ok: true,
                    error: None,
                    tables: conversion.tables,
                    refs: conversion.refs,
                },
                Err(error) => {
                    let message = format!("{:#}", anyhow::Error::new(error));
                    tracing::error!(input = %input.display(), error = %message, "conversion failed");
                    FileOutcome {
                        input: input.clone(),
                        output,
                        ok: false,
                        error: Some(message),
                        tables: 0,
                        refs: 0,
                    }
                }
            }
        })
        .collect();
    files.sort_by(|a, b| a.input.cmp(&b.input));
    BatchReport { files }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "catalog": { "tables": ["java.util.ArrayList", [
            { "name": "t", "columns": [{ "name": "id", "ordinal-position": 1 }] }
        ]]}
    }"#;

    #[test]
    fn output_names_replace_the_extension() {
        assert_eq!(
            output_path_for(Path::new("/in/shop.v2.json"), Path::new("/out"), "json"),
            PathBuf::from("/out/shop.v2.dbml")
        );
        assert_eq!(
            output_path_for(Path::new("/in/shop.sc.json"), Path::new("/out"), "sc.json"),
            PathBuf::from("/out/shop.dbml")
        );
        assert_eq!(
            output_path_for(Path::new("/in/shop.sc.json"), Path::new("/out"), ".sc.json"),
            PathBuf::from("/out/shop.dbml")
        );
        assert_eq!(output_path_for(Path::new("plain"), Path::new("o"), "json"), PathBuf::from("o/plain.dbml"));
    }

    #[test]
    fn batch_continues_past_a_malformed_file() {
        let input_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        for name in ["a.json", "b.json", "c.json"] {
            std::fs::write(input_dir.path().join(name), VALID).unwrap();
        }
        std::fs::write(input_dir.path().join("broken.json"), "{ \"catalog\": ").unwrap();
        std::fs::write(input_dir.path().join("notes.txt"), "ignored").unwrap();

        let inputs = collect_inputs(input_dir.path(), "json").unwrap();
        assert_eq!(inputs.len(), 4);

        let report = run_batch(&inputs, out_dir.path(), "json", &ConvertOptions::default());
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failed(), 1);

        let failed = report.files.iter().find(|f| !f.ok).unwrap();
        assert!(failed.input.ends_with("broken.json"));
        assert!(failed.error.as_deref().unwrap().contains("broken.json"));

        for name in ["a.dbml", "b.dbml", "c.dbml"] {
            let text = std::fs::read_to_string(out_dir.path().join(name)).unwrap();
            assert_eq!(text, "Table t {\n  id varchar\n}\n");
        }
        assert!(!out_dir.path().join("broken.dbml").exists());
    }

    #[test]
    fn report_serializes_per_file_detail() {
        let report = BatchReport {
            files: vec![FileOutcome {
                input: "x.json".into(),
                output: "x.dbml".into(),
                ok: false,
                error: Some("boom".into()),
                tables: 0,
                refs: 0,
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][0]["ok"], false);
        assert_eq!(json["files"][0]["error"], "boom");
    }
}
