use oci_spec::image::*;
use std::io::Read;
use url::Url;

use crate::{distribution::*, error::*, Digest};

/// A client for `/v2/<name>/` API endpoint
///
/// Synchronous and unauthenticated. Every call blocks until the registry
/// responds or the transport fails; no timeout is applied here.
pub struct Client {
    agent: ureq::Agent,
    /// URL to registry server
    url: Url,
    /// Name of repository
    name: Name,
}

impl Client {
    pub fn new(url: &Url, name: &Name) -> Result<Self> {
        Ok(Client {
            agent: ureq::Agent::new(),
            url: url.clone(),
            name: name.clone(),
        })
    }

    /// Get manifest for given repository
    ///
    /// ```text
    /// GET /v2/<name>/manifests/<reference>
    /// ```
    ///
    /// See [corresponding OCI distribution spec document](https://github.com/opencontainers/distribution-spec/blob/main/spec.md#pulling-manifests) for detail.
    pub fn get_manifest(&self, reference: &Reference) -> Result<ImageManifest> {
        let url = self
            .url
            .join(&format!("/v2/{}/manifests/{}", self.name, reference))?;
        let res = self
            .agent
            .get(url.as_str())
            .set("Accept", &MediaType::ImageManifest.to_string())
            .call()?;
        let manifest = ImageManifest::from_reader(res.into_reader())?;
        Ok(manifest)
    }

    /// Push manifest to registry
    ///
    /// ```text
    /// PUT /v2/<name>/manifests/<reference>
    /// ```
    ///
    /// Manifest must be pushed after blobs are updated.
    ///
    /// See [corresponding OCI distribution spec document](https://github.com/opencontainers/distribution-spec/blob/main/spec.md#pushing-manifests) for detail.
    pub fn push_manifest(&self, reference: &Reference, manifest: &ImageManifest) -> Result<()> {
        let url = self
            .url
            .join(&format!("/v2/{}/manifests/{}", self.name, reference))?;
        let mut buf = Vec::new();
        manifest.to_writer(&mut buf)?;
        self.agent
            .put(url.as_str())
            .set("Content-Type", &MediaType::ImageManifest.to_string())
            .send_bytes(&buf)?;
        Ok(())
    }

    /// Get blob for given digest
    ///
    /// ```text
    /// GET /v2/<name>/blobs/<digest>
    /// ```
    ///
    /// See [corresponding OCI distribution spec document](https://github.com/opencontainers/distribution-spec/blob/main/spec.md#pulling-blobs) for detail.
    pub fn get_blob(&self, digest: &Digest) -> Result<Vec<u8>> {
        let url = self
            .url
            .join(&format!("/v2/{}/blobs/{}", self.name, digest))?;
        let res = self.agent.get(url.as_str()).call()?;
        let mut blob = Vec::new();
        res.into_reader().read_to_end(&mut blob)?;
        Ok(blob)
    }

    /// Push blob to registry
    ///
    /// ```text
    /// POST /v2/<name>/blobs/uploads/
    /// ```
    ///
    /// and following `PUT` to URL obtained by `POST`.
    ///
    /// See [corresponding OCI distribution spec document](https://github.com/opencontainers/distribution-spec/blob/main/spec.md#pushing-blobs) for detail.
    pub fn push_blob(&self, blob: &[u8]) -> Result<Url> {
        let url = self
            .url
            .join(&format!("/v2/{}/blobs/uploads/", self.name))?;
        let res = self.agent.post(url.as_str()).call()?;
        let mut url = self.response_location(&res)?;

        let digest = Digest::from_buf_sha256(blob);
        url.query_pairs_mut()
            .append_pair("digest", &digest.to_string());
        let res = self
            .agent
            .put(url.as_str())
            .set("Content-Type", "application/octet-stream")
            .send_bytes(blob)?;
        self.response_location(&res)
    }

    // Upload APIs return `Location: <location>`, possibly relative to the registry root
    fn response_location(&self, res: &ureq::Response) -> Result<Url> {
        let location = res
            .header("Location")
            .expect("Location header is lacked, invalid response of OCI registry");
        Ok(self.url.join(location)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //
    // Following tests need registry server on localhost:5000.
    // These tests are ignored by default.
    //

    fn test_url() -> Url {
        Url::parse("http://localhost:5000").unwrap()
    }

    fn test_repo() -> Name {
        Name::new("test_repo").unwrap()
    }

    #[test]
    #[ignore]
    fn push_blob() -> Result<()> {
        let client = Client::new(&test_url(), &test_repo())?;
        let url = client.push_blob("test string".as_bytes())?;
        dbg!(url);
        Ok(())
    }

    #[test]
    #[ignore]
    fn push_then_get_blob() -> Result<()> {
        let client = Client::new(&test_url(), &test_repo())?;
        let blob = "another test string".as_bytes();
        client.push_blob(blob)?;
        let out = client.get_blob(&Digest::from_buf_sha256(blob))?;
        assert_eq!(out, blob);
        Ok(())
    }
}
