//! Split a chart into meta/content layers and reassemble it
//!
//! A chart is represented on the registry as an OCI artifact with exactly two
//! layers:
//!
//! - a JSON metadata layer whose `name`/`version` are blanked out,
//! - a tar.gz content layer whose `Chart.yaml` carries placeholder
//!   name/version, with the real values attached as descriptor annotations.
//!
//! The annotations are the only authority for name and version; whatever the
//! embedded metadata says is overwritten on reassembly.

use crate::{
    chart::{self, Chart},
    distribution,
    error::*,
    media_types::{self, LayerKind, ANNOTATION_NAME, ANNOTATION_VERSION},
    ImageName, MemoryStore,
};
use oci_spec::image::Descriptor;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// Placeholder stamped into the scrubbed `Chart.yaml` of the content layer
pub const PLACEHOLDER: &str = "-";

/// Split a chart into the metadata and content layers, staged in `store`
///
/// Returns `[metadata layer, content layer]`. The content layer descriptor
/// carries the chart name and version as annotations.
pub fn split_chart(mut chart: Chart, store: &mut MemoryStore) -> Result<[Descriptor; 2]> {
    let name = std::mem::take(&mut chart.metadata.name);
    let version = std::mem::take(&mut chart.metadata.version);

    let meta_json = serde_json::to_vec(&chart.metadata)?;
    let meta_layer = store.add(media_types::chart_meta(), meta_json)?;

    chart.metadata.name = PLACEHOLDER.to_string();
    chart.metadata.version = PLACEHOLDER.to_string();
    let temp_dir = tempfile::Builder::new().prefix("chartpkg-push").tempdir()?;
    let archive = chart.save(temp_dir.path())?;
    let content = fs::read(archive)?;
    let mut content_layer = store.add(media_types::chart_content(), content)?;
    content_layer.set_annotations(Some(HashMap::from([
        (ANNOTATION_NAME.to_string(), name),
        (ANNOTATION_VERSION.to_string(), version),
    ])));

    Ok([meta_layer, content_layer])
}

/// Reassemble a chart from pulled layer descriptors and the content store
///
/// `reference` is only used in error messages, so that "incompatible
/// artifact" failures name the offending reference.
pub fn assemble_chart(
    reference: &ImageName,
    layers: &[Descriptor],
    store: &MemoryStore,
) -> Result<Chart> {
    let meta_layer = find_layer(reference, layers, LayerKind::Metadata)?;
    let content_layer = find_layer(reference, layers, LayerKind::Content)?;

    let name = annotation(reference, content_layer, ANNOTATION_NAME)?;
    let version = annotation(reference, content_layer, ANNOTATION_VERSION)?;

    let mut metadata: chart::Metadata = serde_json::from_slice(store.get(meta_layer)?)?;
    metadata.name = name;
    metadata.version = version;

    let mut chart = Chart::load_archive(store.get(content_layer)?)?;
    chart.metadata = metadata;
    Ok(chart)
}

fn find_layer<'a>(
    reference: &ImageName,
    layers: &'a [Descriptor],
    kind: LayerKind,
) -> Result<&'a Descriptor> {
    layers
        .iter()
        .find(|layer| LayerKind::from_media_type(layer.media_type()) == Some(kind))
        .ok_or_else(|| Error::MissingLayer {
            reference: reference.to_string(),
            media_type: kind.media_type().to_string(),
        })
}

fn annotation(
    reference: &ImageName,
    layer: &Descriptor,
    key: &'static str,
) -> Result<String> {
    layer
        .annotations()
        .as_ref()
        .and_then(|annotations| annotations.get(key))
        .cloned()
        .ok_or_else(|| Error::MissingAnnotation {
            reference: reference.to_string(),
            key,
        })
}

/// Load a chart directory, split it, and push both layers as one artifact
pub fn push_chart(chart_dir: &Path, image_name: &ImageName) -> Result<()> {
    let chart = Chart::load_dir(chart_dir)?;
    log::info!(
        "Pushing chart {} {} to {}",
        chart.metadata.name,
        chart.metadata.version,
        image_name
    );
    let mut store = MemoryStore::new();
    let layers = split_chart(chart, &mut store)?;
    distribution::push(image_name, layers.to_vec(), &store)
}

/// Pull an artifact, reassemble the chart, and expand it under `output_dir`
///
/// Any pre-existing `output_dir` is removed first; pull overwrites, it never
/// merges. Returns the directory the chart was expanded into,
/// `output_dir/<name>`. The removal and the expansion are not atomic: a
/// crash in between leaves no chart at all.
pub fn pull_chart(image_name: &ImageName, output_dir: &Path) -> Result<PathBuf> {
    let allowed = [media_types::chart_meta(), media_types::chart_content()];
    let mut store = MemoryStore::new();
    let layers = distribution::pull(image_name, &allowed, &mut store)?;
    let chart = assemble_chart(image_name, &layers, &store)?;
    write_output(&chart, output_dir)
}

fn write_output(chart: &Chart, output_dir: &Path) -> Result<PathBuf> {
    if output_dir.exists() {
        fs::remove_dir_all(output_dir)?;
    }
    let temp_dir = tempfile::Builder::new().prefix("chartpkg-pull").tempdir()?;
    let archive = chart.save(temp_dir.path())?;
    chart::expand(&archive, output_dir)?;
    Ok(output_dir.join(&chart.metadata.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartFile, Metadata};

    fn demo_chart() -> Chart {
        Chart::new(
            Metadata {
                api_version: "v1".to_string(),
                name: "demo".to_string(),
                version: "1.0.0".to_string(),
                description: Some("A demo chart".to_string()),
                ..Default::default()
            },
            vec![ChartFile {
                path: PathBuf::from("templates/deployment.yaml"),
                data: b"kind: Deployment\n".to_vec(),
            }],
        )
    }

    fn demo_reference() -> ImageName {
        ImageName::parse("registry.example.com/charts/demo:1.0.0").unwrap()
    }

    #[test]
    fn split_layers() -> Result<()> {
        let mut store = MemoryStore::new();
        let [meta_layer, content_layer] = split_chart(demo_chart(), &mut store)?;

        assert_eq!(*meta_layer.media_type(), media_types::chart_meta());
        let meta_json: serde_json::Value = serde_json::from_slice(store.get(&meta_layer)?)?;
        assert_eq!(
            meta_json,
            serde_json::json!({"apiVersion": "v1", "description": "A demo chart"})
        );

        assert_eq!(*content_layer.media_type(), media_types::chart_content());
        let annotations = content_layer.annotations().as_ref().unwrap();
        assert_eq!(annotations[ANNOTATION_NAME], "demo");
        assert_eq!(annotations[ANNOTATION_VERSION], "1.0.0");

        // Embedded Chart.yaml of the content tarball only carries placeholders
        let content = Chart::load_archive(store.get(&content_layer)?)?;
        assert_eq!(content.metadata.name, PLACEHOLDER);
        assert_eq!(content.metadata.version, PLACEHOLDER);
        Ok(())
    }

    #[test]
    fn content_layer_independent_of_name_and_version() -> Result<()> {
        let mut store = MemoryStore::new();
        let [_, content_a] = split_chart(demo_chart(), &mut store)?;
        let mut renamed = demo_chart();
        renamed.metadata.name = "renamed".to_string();
        renamed.metadata.version = "9.9.9".to_string();
        let [_, content_b] = split_chart(renamed, &mut store)?;
        assert_eq!(content_a.digest(), content_b.digest());
        Ok(())
    }

    #[test]
    fn split_then_assemble_round_trip() -> Result<()> {
        let chart = demo_chart();
        let mut store = MemoryStore::new();
        let layers = split_chart(chart.clone(), &mut store)?;
        let assembled = assemble_chart(&demo_reference(), &layers, &store)?;
        assert_eq!(assembled, chart);
        Ok(())
    }

    #[test]
    fn assemble_without_meta_layer() -> Result<()> {
        let mut store = MemoryStore::new();
        let [_, content_layer] = split_chart(demo_chart(), &mut store)?;
        let err = assemble_chart(&demo_reference(), &[content_layer], &store).unwrap_err();
        assert!(matches!(err, Error::MissingLayer { .. }));
        assert!(err.to_string().contains("registry.example.com/charts/demo"));
        Ok(())
    }

    #[test]
    fn assemble_without_content_layer() -> Result<()> {
        let mut store = MemoryStore::new();
        let [meta_layer, _] = split_chart(demo_chart(), &mut store)?;
        assert!(matches!(
            assemble_chart(&demo_reference(), &[meta_layer], &store),
            Err(Error::MissingLayer { .. })
        ));
        Ok(())
    }

    #[test]
    fn assemble_without_annotations() -> Result<()> {
        let mut store = MemoryStore::new();
        let [meta_layer, mut content_layer] = split_chart(demo_chart(), &mut store)?;
        content_layer.set_annotations(None);
        assert!(matches!(
            assemble_chart(&demo_reference(), &[meta_layer, content_layer], &store),
            Err(Error::MissingAnnotation { .. })
        ));
        Ok(())
    }

    #[test]
    fn assemble_without_version_annotation() -> Result<()> {
        let mut store = MemoryStore::new();
        let [meta_layer, mut content_layer] = split_chart(demo_chart(), &mut store)?;
        content_layer.set_annotations(Some(HashMap::from([(
            ANNOTATION_NAME.to_string(),
            "demo".to_string(),
        )])));
        let err =
            assemble_chart(&demo_reference(), &[meta_layer, content_layer], &store).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAnnotation { key: "version", .. }
        ));
        Ok(())
    }

    #[test]
    fn write_output_overwrites_previous_chart() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("output");
        fs::create_dir_all(output.join("old-chart"))?;
        fs::write(output.join("old-chart/stale.yaml"), "stale\n")?;

        let saved = write_output(&demo_chart(), &output)?;
        assert_eq!(saved, output.join("demo"));
        assert!(saved.join("Chart.yaml").is_file());
        assert!(!output.join("old-chart").exists());
        Ok(())
    }
}
