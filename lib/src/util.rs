use crate::builder::QuadTreeBuilder;
use crate::config::Config;
use crate::consts::DEFAULT_GRAPH_KEY;
use crate::dataset::QuadTree;
use crate::options::ParseMode;
use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use oxigraph::io::{RdfFormat, RdfParseError, RdfParser, RdfSerializer};
use oxigraph::model::Quad;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Lets `LINKEDQUAD_LOG` override `RUST_LOG`. Call before initializing the logger.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("LINKEDQUAD_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}

/// Outcome of loading one source into a builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Statements parsed successfully.
    pub parsed: usize,
    /// Parsed quads that were new to the builder.
    pub added: usize,
    pub duplicates: usize,
    /// Statements skipped because they failed to parse (lenient mode only).
    pub errors: usize,
}

pub fn dataset_format_from_path(path: &Path) -> Option<RdfFormat> {
    let extension = path.extension().and_then(|ext| ext.to_str())?;
    match extension {
        "nq" => Some(RdfFormat::NQuads),
        "trig" => Some(RdfFormat::TriG),
        "nt" => Some(RdfFormat::NTriples),
        "ttl" => Some(RdfFormat::Turtle),
        _ => None,
    }
}

fn format_for(path: &Path) -> Result<RdfFormat> {
    dataset_format_from_path(path)
        .ok_or_else(|| anyhow!("Unsupported RDF file extension: {}", path.display()))
}

/// Parses `reader`, passing every quad to `sink`. Strict mode stops at the
/// first syntax error; lenient mode logs it and keeps reading.
fn parse_quads(
    reader: impl Read,
    format: RdfFormat,
    mode: ParseMode,
    mut sink: impl FnMut(Quad),
) -> Result<(usize, usize)> {
    let (mut parsed, mut errors) = (0, 0);
    for quad in RdfParser::from_format(format).for_reader(reader) {
        match quad {
            Ok(quad) => {
                parsed += 1;
                sink(quad);
            }
            Err(RdfParseError::Syntax(e)) if !mode.is_strict() => {
                warn!("Skipping unparseable statement: {e}");
                errors += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok((parsed, errors))
}

pub fn load_reader(
    builder: &mut QuadTreeBuilder,
    reader: impl Read,
    format: RdfFormat,
    mode: ParseMode,
) -> Result<LoadStats> {
    let mut stats = LoadStats::default();
    let (parsed, errors) = parse_quads(reader, format, mode, |quad| {
        if builder.add(quad.as_ref()) {
            stats.added += 1;
        } else {
            stats.duplicates += 1;
        }
    })?;
    stats.parsed = parsed;
    stats.errors = errors;
    Ok(stats)
}

pub fn load_file(builder: &mut QuadTreeBuilder, path: &Path, mode: ParseMode) -> Result<LoadStats> {
    let format = format_for(path)?;
    debug!("Reading file: {} as {}", path.display(), format.name());
    let file = File::open(path)?;
    let stats = load_reader(builder, BufReader::new(file), format, mode)?;
    info!(
        "Loaded {}: {} parsed, {} added, {} duplicates, {} errors",
        path.display(),
        stats.parsed,
        stats.added,
        stats.duplicates,
        stats.errors
    );
    Ok(stats)
}

/// Loads one file into a fresh tree encoded with the configured prefixes.
pub fn read_file(path: &Path, config: &Config) -> Result<QuadTree> {
    let mut builder = QuadTreeBuilder::new(config.prefixes.clone());
    load_file(&mut builder, path, config.parse_mode())?;
    Ok(builder.deliver())
}

/// Deletes every quad found in `path` from `builder`, returning how many were present.
pub fn remove_file_quads(builder: &mut QuadTreeBuilder, path: &Path, mode: ParseMode) -> Result<usize> {
    let format = format_for(path)?;
    let file = File::open(path)?;
    let mut removed = 0;
    parse_quads(BufReader::new(file), format, mode, |quad| {
        if builder.delete(quad.as_ref()) {
            removed += 1;
        }
    })?;
    info!("Removed {} quads listed in {}", removed, path.display());
    Ok(removed)
}

/// Serializes `tree` in its iteration order, declaring the tree's prefixes
/// where the format supports them. Triple formats only accept trees whose
/// quads all live in the default graph.
pub fn write_tree(tree: &QuadTree, writer: impl Write, format: RdfFormat) -> Result<()> {
    if !format.supports_datasets() && tree.graph_len(DEFAULT_GRAPH_KEY) != tree.len() {
        return Err(anyhow!(
            "{} cannot hold named graphs; use TriG or N-Quads",
            format.name()
        ));
    }
    let mut serializer = RdfSerializer::from_format(format);
    for (prefix, namespace) in tree.prefixes().declarable() {
        serializer = serializer.with_prefix(prefix, namespace)?;
    }
    let mut serializer = serializer.for_writer(writer);
    for quad in tree.iter() {
        serializer.serialize_quad(quad?.as_ref())?;
    }
    serializer.finish()?;
    Ok(())
}

pub fn write_tree_to_file(tree: &QuadTree, path: &Path) -> Result<()> {
    let format = format_for(path)?;
    info!(
        "Writing dataset to file: {} with length {}",
        path.display(),
        tree.len()
    );
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_tree(tree, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}
