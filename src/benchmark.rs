use anyhow::Result;
use nalgebra::base::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::geometry::geometry_operations;
use crate::render::{GpuContext, SkeletonHandle, SkeletonsRenderable};
use crate::skeleton3d::{MedianSkeleton, SkeletonFormat};

/// One skeleton of a benchmark
pub struct BenchmarkEntry {
    /// File name part after the stem, naming the method that produced the skeleton
    pub label: String,
    pub path: PathBuf,
    pub handle: SkeletonHandle,
}

/// Skeletons computed from the same input mesh, one of them displayed
pub struct Benchmark {
    stem: String,
    entries: Vec<BenchmarkEntry>,
    selected: usize,
}

fn is_separator(c: char) -> bool {
    c == '_' || c == '-' || c == '.'
}

/// Checks if a file name is the stem followed by a separator
fn has_stem(name: &str, stem: &str) -> bool {
    name.strip_prefix(stem)
        .map_or(false, |rest| rest.is_empty() || rest.starts_with(is_separator))
}

/// Lists the skeleton files of a stem, sorted by file name
pub fn find_files(stem: &str, directory: &Path, format: SkeletonFormat) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry_ in fs::read_dir(directory)? {
        let path = entry_?.path();
        if !path.is_file() {
            continue;
        }
        let name_match = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| has_stem(name, stem));
        let extension_match = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext == format.extension());
        if name_match && extension_match {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn label_of(stem: &str, path: &Path) -> String {
    let file_stem = path
        .file_stem()
        .and_then(|name| name.to_str())
        .unwrap_or("");
    let label = file_stem
        .strip_prefix(stem)
        .unwrap_or(file_stem)
        .trim_start_matches(is_separator);
    if label.is_empty() {
        stem.to_string()
    } else {
        label.to_string()
    }
}

impl Benchmark {
    /// Loads every skeleton file of a stem and activates the first one
    ///
    /// Files are all read before the first entry is added: a failed load
    /// leaves the renderable untouched.
    pub fn load<C: GpuContext>(
        renderable: &mut SkeletonsRenderable<C>,
        stem: &str,
        directory: &Path,
        format: SkeletonFormat,
    ) -> Result<Benchmark> {
        let files = find_files(stem, directory, format)?;
        if files.is_empty() {
            return Err(anyhow::Error::msg(format!(
                "No {} skeleton found for stem \"{}\" in {}",
                format,
                stem,
                directory.display()
            )));
        }

        let skeletons = files
            .iter()
            .map(|path| -> Result<MedianSkeleton> {
                let skeleton = MedianSkeleton::load(path, format)
                    .map_err(|e| anyhow::Error::msg(format!("{}: {}", path.display(), e)))?;
                log::info!(
                    "loaded {}: {} atoms, {} links, {} faces",
                    path.display(),
                    skeleton.get_number_of_atoms(),
                    skeleton.get_number_of_links(),
                    skeleton.get_number_of_faces()
                );
                Ok(skeleton)
            })
            .collect::<Result<Vec<_>>>()?;

        let entries: Vec<BenchmarkEntry> = files
            .into_iter()
            .zip(skeletons)
            .map(|(path, skeleton)| BenchmarkEntry {
                label: label_of(stem, &path),
                handle: renderable.add(skeleton),
                path,
            })
            .collect();
        log::info!("benchmark \"{}\": {} skeletons", stem, entries.len());

        let mut benchmark = Benchmark {
            stem: stem.to_string(),
            entries,
            selected: 0,
        };
        benchmark.select(renderable, 0)?;
        Ok(benchmark)
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn entries(&self) -> &[BenchmarkEntry] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.label.as_str()).collect()
    }

    /// Displayed entry
    pub fn selected(&self) -> Option<&BenchmarkEntry> {
        self.entries.get(self.selected)
    }

    /// Displays exactly one entry
    pub fn select<C: GpuContext>(&mut self, renderable: &mut SkeletonsRenderable<C>, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(anyhow::Error::msg("select(): Index out of bounds"));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            renderable.set_active(entry.handle, i == index)?;
        }
        self.selected = index;
        log::debug!("displaying {}", self.entries[index].label);
        Ok(())
    }

    /// Displays the entry after the selected one, wrapping around
    pub fn next<C: GpuContext>(&mut self, renderable: &mut SkeletonsRenderable<C>) -> Result<()> {
        let index = (self.selected + 1) % self.entries.len().max(1);
        self.select(renderable, index)
    }

    /// Box containing every skeleton of the benchmark
    pub fn bounding_box<C: GpuContext>(
        &self,
        renderable: &SkeletonsRenderable<C>,
    ) -> Option<(Vector3<f64>, Vector3<f64>)> {
        self.entries.iter().fold(None, |bb, entry| {
            let entry_bb = renderable
                .get(entry.handle)
                .ok()
                .and_then(|storage| geometry_operations::bounding_box(storage.skeleton().atoms()));
            geometry_operations::merge_boxes(bb, entry_bb)
        })
    }
}
