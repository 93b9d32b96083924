//! Load and save Helm charts as directories and gzipped tar archives

mod metadata;

pub use metadata::{Maintainer, Metadata};

use crate::error::*;
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::{
    fs, io,
    io::Read,
    path::{Path, PathBuf},
};

/// File name of the chart metadata inside a chart directory
pub const CHART_FILE: &str = "Chart.yaml";

/// A chart loaded into memory: metadata plus every other file of the chart
///
/// `files` hold paths relative to the chart root, excluding [CHART_FILE],
/// and are kept sorted so that serialization is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    pub metadata: Metadata,
    files: Vec<ChartFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChartFile {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl Chart {
    pub fn new(metadata: Metadata, mut files: Vec<ChartFile>) -> Self {
        files.sort();
        Chart { metadata, files }
    }

    pub fn files(&self) -> &[ChartFile] {
        &self.files
    }

    /// Load a chart from a directory containing `Chart.yaml`
    pub fn load_dir(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(Error::NotADirectory(path.to_owned()));
        }
        let chart_yaml = path.join(CHART_FILE);
        if !chart_yaml.is_file() {
            return Err(Error::MalformedChart {
                path: path.to_owned(),
                reason: format!("no {}", CHART_FILE),
            });
        }
        let metadata: Metadata = serde_yaml::from_str(&fs::read_to_string(chart_yaml)?)?;
        if metadata.name.is_empty() || metadata.version.is_empty() {
            return Err(Error::MalformedChart {
                path: path.to_owned(),
                reason: format!("{} lacks name or version", CHART_FILE),
            });
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(path) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(path)
                .expect("Entry is always under the walked root");
            if rel == Path::new(CHART_FILE) {
                continue;
            }
            files.push(ChartFile {
                path: rel.to_owned(),
                data: fs::read(entry.path())?,
            });
        }
        Ok(Chart::new(metadata, files))
    }

    /// Load a chart from a gzipped tar archive
    ///
    /// The leading path component (the chart name directory) is stripped from
    /// every entry, whatever it is, so archives saved under a placeholder
    /// name load the same as real ones.
    pub fn load_archive(buf: &[u8]) -> Result<Self> {
        let mut ar = tar::Archive::new(GzDecoder::new(buf));
        let mut metadata = None;
        let mut files = Vec::new();
        for entry in ar.entries()? {
            let mut entry = entry?;
            let rel: PathBuf = entry.path()?.components().skip(1).collect();
            if rel.as_os_str().is_empty() || !entry.header().entry_type().is_file() {
                continue;
            }
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            if rel == Path::new(CHART_FILE) {
                metadata = Some(serde_yaml::from_slice(&data)?);
            } else {
                files.push(ChartFile { path: rel, data });
            }
        }
        let metadata = metadata.ok_or_else(|| Error::MalformedChart {
            path: PathBuf::from("<archive>"),
            reason: format!("no {}", CHART_FILE),
        })?;
        Ok(Chart::new(metadata, files))
    }

    /// Serialize the chart into `<dir>/<name>-<version>.tgz`
    ///
    /// Every entry is placed under a `<name>/` prefix, as `helm package`
    /// does. Headers carry fixed mode and mtime so the archive depends only
    /// on the chart contents.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let out = dir.join(format!("{}-{}.tgz", self.metadata.name, self.metadata.version));
        let f = fs::File::create(&out)?;
        let gz = GzEncoder::new(io::BufWriter::new(f), Compression::default());
        let mut ar = tar::Builder::new(gz);

        let chart_yaml = serde_yaml::to_string(&self.metadata)?;
        let prefix = PathBuf::from(&self.metadata.name);
        append_entry(&mut ar, &prefix.join(CHART_FILE), chart_yaml.as_bytes())?;
        for file in &self.files {
            append_entry(&mut ar, &prefix.join(&file.path), &file.data)?;
        }

        let gz = ar.into_inner()?;
        gz.finish()?.into_inner().map_err(|e| e.into_error())?;
        Ok(out)
    }
}

fn append_entry<W: io::Write>(ar: &mut tar::Builder<W>, path: &Path, data: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(0);
    header.set_cksum();
    ar.append_data(&mut header, path, data)?;
    Ok(())
}

/// Expand a gzipped chart archive under `out_dir`
///
/// The `<name>/` prefix of the entries is kept, so the chart lands at
/// `out_dir/<name>/`.
pub fn expand(archive: &Path, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;
    let f = fs::File::open(archive)?;
    let mut ar = tar::Archive::new(GzDecoder::new(io::BufReader::new(f)));
    ar.unpack(out_dir)?;
    Ok(())
}
