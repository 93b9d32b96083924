use crate::{error::*, Digest};
use oci_spec::image::{Descriptor, DescriptorBuilder, MediaType};
use std::collections::HashMap;

/// Process-local content-addressable staging area for layer blobs
///
/// Blobs live here between the chart split and the registry push, or between
/// the registry pull and the chart assembly. Nothing persists across
/// invocations; the registry itself is the only durable store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: HashMap<Digest, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a new blob and build its descriptor (push side)
    pub fn add(&mut self, media_type: MediaType, blob: Vec<u8>) -> Result<Descriptor> {
        let digest = Digest::from_buf_sha256(&blob);
        let descriptor = DescriptorBuilder::default()
            .media_type(media_type)
            .digest(digest.to_string())
            .size(i64::try_from(blob.len()).expect("Blob larger than i64::MAX"))
            .build()
            .expect("Requirement for descriptor is mediaType, digest, and size.");
        self.blobs.insert(digest, blob);
        Ok(descriptor)
    }

    /// Stage a fetched blob under the digest of its descriptor (pull side)
    pub fn put(&mut self, descriptor: &Descriptor, blob: Vec<u8>) -> Result<()> {
        let digest = Digest::new(descriptor.digest())?;
        self.blobs.insert(digest, blob);
        Ok(())
    }

    /// Get a staged blob back by its descriptor
    pub fn get(&self, descriptor: &Descriptor) -> Result<&[u8]> {
        let digest = Digest::new(descriptor.digest())?;
        match self.blobs.get(&digest) {
            Some(blob) => Ok(blob.as_slice()),
            None => Err(Error::UnknownBlob(digest)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_types;

    #[test]
    fn add_then_get() -> Result<()> {
        let mut store = MemoryStore::new();
        let desc = store.add(media_types::chart_meta(), b"{}".to_vec())?;
        assert_eq!(desc.size(), 2);
        assert_eq!(store.get(&desc)?, b"{}");
        Ok(())
    }

    #[test]
    fn get_unknown_blob() -> Result<()> {
        let mut store = MemoryStore::new();
        let desc = store.add(media_types::chart_meta(), b"{}".to_vec())?;
        let empty = MemoryStore::new();
        assert!(matches!(empty.get(&desc), Err(Error::UnknownBlob(_))));
        Ok(())
    }
}
