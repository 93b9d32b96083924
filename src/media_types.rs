//! Media types of the chart artifact layers

use oci_spec::image::MediaType;

/// The media type used in the layer descriptor holding chart metadata
///
/// The content of a descriptor of this type must be a JSON of
/// [crate::chart::Metadata] with `name` and `version` blanked out.
pub fn chart_meta() -> MediaType {
    MediaType::Other("application/vnd.cncf.helm.chart.meta.v1+json".to_string())
}

/// The media type used in the layer descriptor holding chart content
///
/// The content of a descriptor of this type must be a tar.gz of the chart
/// with its `Chart.yaml` scrubbed to placeholder name/version. The real
/// name and version are carried as annotations on the descriptor.
pub fn chart_content() -> MediaType {
    MediaType::Other("application/vnd.cncf.helm.chart.content.v1+tar".to_string())
}

/// Annotation key for the chart name on the content layer descriptor
pub const ANNOTATION_NAME: &str = "name";

/// Annotation key for the chart version on the content layer descriptor
pub const ANNOTATION_VERSION: &str = "version";

/// Closed discriminator over the two recognized layer media types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Metadata,
    Content,
}

impl LayerKind {
    /// Map a media type to a layer kind, rejecting unrecognized types
    pub fn from_media_type(media_type: &MediaType) -> Option<Self> {
        if *media_type == chart_meta() {
            Some(LayerKind::Metadata)
        } else if *media_type == chart_content() {
            Some(LayerKind::Content)
        } else {
            None
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            LayerKind::Metadata => chart_meta(),
            LayerKind::Content => chart_content(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_kind() {
        assert_eq!(
            LayerKind::from_media_type(&chart_meta()),
            Some(LayerKind::Metadata)
        );
        assert_eq!(
            LayerKind::from_media_type(&chart_content()),
            Some(LayerKind::Content)
        );
        assert_eq!(LayerKind::from_media_type(&MediaType::ImageLayerGzip), None);
        assert_eq!(
            LayerKind::from_media_type(&MediaType::Other(
                "application/vnd.cncf.helm.chart.meta.v2+json".to_string()
            )),
            None
        );
    }
}
