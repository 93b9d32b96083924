use crate::Digest;
use oci_spec::OciSpecError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    //
    // Invalid user input
    //
    #[error("Invalid digest: {0}")]
    InvalidDigest(String),
    #[error("Invalid name for repository: {0}")]
    InvalidName(String),
    #[error(transparent)]
    InvalidPort(#[from] std::num::ParseIntError),
    #[error("Invalid reference to image: {0}")]
    InvalidReference(String),
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
    #[error("Not a directory, or not exist: {0}")]
    NotADirectory(PathBuf),

    //
    // Malformed chart
    //
    #[error("Malformed chart at {path}: {reason}")]
    MalformedChart { path: PathBuf, reason: String },
    #[error(transparent)]
    InvalidChartYaml(#[from] serde_yaml::Error),

    //
    // Incompatible artifact
    //
    #[error("{reference} does not have the necessary layer: {media_type}")]
    MissingLayer {
        reference: String,
        media_type: String,
    },
    #[error("{reference} does not have chart {key} saved on annotations")]
    MissingAnnotation {
        reference: String,
        key: &'static str,
    },
    #[error("Blob is not staged in the content store: {0}")]
    UnknownBlob(Digest),
    #[error(transparent)]
    InvalidJson(#[from] serde_json::error::Error),

    //
    // Error from OCI registry
    //
    #[error(transparent)]
    NetworkError(Box<ureq::Transport>),
    #[error(transparent)]
    RegistryError(#[from] oci_spec::distribution::ErrorResponse),

    //
    // System error
    //
    #[error(transparent)]
    UnknownIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<OciSpecError> for Error {
    fn from(e: OciSpecError) -> Self {
        match e {
            OciSpecError::SerDe(e) => Error::InvalidJson(e),
            OciSpecError::Io(e) => Error::UnknownIo(e),
            OciSpecError::Builder(_) => unreachable!(),
            OciSpecError::Other(e) => panic!("Unknown error within oci_spec: {}", e),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(e: walkdir::Error) -> Self {
        Self::UnknownIo(e.into())
    }
}

impl From<ureq::Error> for Error {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(_status, res) => {
                match res.into_json::<oci_spec::distribution::ErrorResponse>() {
                    Ok(err) => Error::RegistryError(err),
                    Err(e) => Error::UnknownIo(e),
                }
            }
            ureq::Error::Transport(e) => Error::NetworkError(Box::new(e)),
        }
    }
}
