//! Directory-level drivers for both pipeline stages.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::analysis::{Analyzer, CollectionDocument};
use crate::error::{Error, Result};
use crate::model::{AnalysisResult, LayoutDocument, Outline};
use crate::options::AnalysisOptions;
use crate::outline::OutlineExtractor;
use crate::persist;
use crate::source::pdf;

/// Outcome of a batch outline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Outline files written
    pub succeeded: Vec<PathBuf>,
    /// Input files that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// Number of inputs processed.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when no input failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// True for file names ending in `.pdf`, any case.
pub fn is_pdf_name(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// PDF files directly inside `dir`, sorted by file name.
pub fn list_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_pdf_name(path))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// `<output_dir>/<stem>.json` for a PDF path.
pub fn outline_path(output_dir: &Path, pdf_path: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}.json", stem))
}

/// Extract one PDF's outline and write it to `output_dir`.
pub fn outline_one(
    extractor: &OutlineExtractor,
    pdf_path: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    log::info!("Processing {}", pdf_path.display());
    let layout = pdf::load_file(pdf_path)?;
    let outline = extractor.extract(&layout);
    let target = outline_path(output_dir, pdf_path);
    persist::write_outline(&target, &outline)?;
    log::info!(
        "Wrote {} ({} headings)",
        target.display(),
        outline.outline.len()
    );
    Ok(target)
}

/// Extract outlines for every PDF in `input_dir`.
///
/// Documents are processed in parallel; a failing document is recorded in
/// the report and does not stop the others.
pub fn extract_outlines<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
) -> Result<BatchReport> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let files = list_pdfs(input_dir)?;
    let extractor = OutlineExtractor::new();

    let results: Vec<(PathBuf, Result<PathBuf>)> = files
        .into_par_iter()
        .map(|path| {
            let result = outline_one(&extractor, &path, output_dir);
            (path, result)
        })
        .collect();

    let mut report = BatchReport::default();
    for (path, result) in results {
        match result {
            Ok(target) => report.succeeded.push(target),
            Err(e) => {
                log::warn!("Could not process {}: {}", path.display(), e);
                report.failed.push((path, e.to_string()));
            }
        }
    }
    Ok(report)
}

/// Load the outline and layout for one collection document.
///
/// A missing or unreadable outline, or an unreadable PDF, yields `None`
/// for the outline so the document is skipped downstream.
fn load_member(pdf_path: &Path, outline_dir: &Path) -> (LayoutDocument, Option<Outline>) {
    let outline_file = outline_path(outline_dir, pdf_path);
    if !outline_file.exists() {
        log::warn!("Outline not found: {}", outline_file.display());
        return (LayoutDocument::new(), None);
    }

    let outline = match persist::read_outline(&outline_file) {
        Ok(outline) => outline,
        Err(e) => {
            log::warn!("Could not read {}: {}", outline_file.display(), e);
            return (LayoutDocument::new(), None);
        }
    };

    match pdf::load_file(pdf_path) {
        Ok(layout) => (layout, Some(outline)),
        Err(e) => {
            log::warn!("Could not open {}: {}", pdf_path.display(), e);
            (LayoutDocument::new(), None)
        }
    }
}

/// Analyze every PDF in `input_dir` using outlines from `outline_dir`.
pub fn analyze_collection<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    outline_dir: Q,
    options: &AnalysisOptions,
    persona: &str,
    job: &str,
) -> Result<AnalysisResult> {
    let input_dir = input_dir.as_ref();
    let files = list_pdfs(input_dir)?;
    if files.is_empty() {
        return Err(Error::Other(format!(
            "no PDF files found in {}",
            input_dir.display()
        )));
    }
    log::info!("Found {} documents for analysis", files.len());

    let outline_dir = outline_dir.as_ref();
    let members: Vec<(String, LayoutDocument, Option<Outline>)> = files
        .par_iter()
        .map(|path| {
            let id = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let (layout, outline) = load_member(path, outline_dir);
            (id, layout, outline)
        })
        .collect();

    let documents: Vec<CollectionDocument<'_>> = members
        .iter()
        .map(|(id, layout, outline)| CollectionDocument::new(id.clone(), layout, outline.clone()))
        .collect();

    let analyzer = Analyzer::with_default_embedder(options.clone())?;
    analyzer.analyze(&documents, persona, job)
}
