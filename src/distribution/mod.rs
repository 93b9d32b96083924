//! Pull and Push chart layers to OCI registry based on [OCI distribution specification](https://github.com/opencontainers/distribution-spec)

mod client;
mod name;
mod reference;

pub use client::Client;
pub use name::Name;
pub use reference::Reference;

use crate::{error::*, Digest, ImageName, MemoryStore};
use oci_spec::image::*;

/// The media type oras assigns to the placeholder config blob of an artifact
/// pushed without an explicit config
const UNKNOWN_CONFIG_MEDIA_TYPE: &str = "application/vnd.unknown.config.v1+json";

/// Pull layers from a registry into the content store
///
/// Only layers whose media type appears in `allowed` are fetched; others are
/// silently dropped. Returns the manifest's descriptors for the fetched
/// layers so that their annotations are preserved.
pub fn pull(
    image_name: &ImageName,
    allowed: &[MediaType],
    store: &mut MemoryStore,
) -> Result<Vec<Descriptor>> {
    let client = Client::new(&image_name.registry_url()?, &image_name.name)?;
    let manifest = client.get_manifest(&image_name.reference)?;
    let mut layers = Vec::new();
    for layer in manifest.layers() {
        if !allowed.contains(layer.media_type()) {
            log::debug!(
                "Skip layer of unrequested media type: {}",
                layer.media_type()
            );
            continue;
        }
        let blob = client.get_blob(&Digest::new(layer.digest())?)?;
        store.put(layer, blob)?;
        layers.push(layer.clone());
    }
    Ok(layers)
}

/// Push staged layers to a registry as a single OCI artifact
///
/// Blobs are uploaded first, the manifest last, so a manifest never becomes
/// visible before its blobs exist. The registry is responsible for manifest
/// atomicity.
pub fn push(image_name: &ImageName, layers: Vec<Descriptor>, store: &MemoryStore) -> Result<()> {
    let client = Client::new(&image_name.registry_url()?, &image_name.name)?;
    for layer in &layers {
        client.push_blob(store.get(layer)?)?;
    }

    let config = b"{}";
    client.push_blob(config)?;
    let config_desc = DescriptorBuilder::default()
        .media_type(MediaType::Other(UNKNOWN_CONFIG_MEDIA_TYPE.to_string()))
        .digest(Digest::from_buf_sha256(config).to_string())
        .size(config.len() as i64)
        .build()
        .expect("Requirement for descriptor is mediaType, digest, and size.");

    let manifest = ImageManifestBuilder::default()
        .schema_version(SCHEMA_VERSION)
        .media_type(MediaType::ImageManifest)
        .config(config_desc)
        .layers(layers)
        .build()?;
    client.push_manifest(&image_name.reference, &manifest)?;
    Ok(())
}
