use crate::{
    distribution::{Name, Reference},
    error::*,
};
use std::fmt;
use url::Url;

/// Reference to a chart stored in an OCI registry, e.g. `localhost:5000/charts/demo:1.0.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageName {
    pub hostname: String,
    pub port: Option<u16>,
    pub name: Name,
    pub reference: Reference,
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(port) = self.port {
            write!(
                f,
                "{}:{}/{}:{}",
                self.hostname, port, self.name, self.reference
            )
        } else {
            write!(f, "{}/{}:{}", self.hostname, self.name, self.reference)
        }
    }
}

impl ImageName {
    pub fn parse(name: &str) -> Result<Self> {
        let (hostname, name) = name.split_once('/').unwrap_or(("docker.io", name));
        let (hostname, port) = if let Some((hostname, port)) = hostname.split_once(':') {
            (hostname, Some(str::parse(port)?))
        } else {
            (hostname, None)
        };
        let (name, reference) = name.split_once(':').unwrap_or((name, "latest"));
        Ok(ImageName {
            hostname: hostname.to_string(),
            port,
            name: Name::new(name)?,
            reference: Reference::new(reference)?,
        })
    }

    /// URL of the registry API endpoint
    ///
    /// Uses plain HTTP for localhost to support registries launched for testing.
    pub fn registry_url(&self) -> Result<Url> {
        let hostname = if let Some(port) = self.port {
            format!("{}:{}", self.hostname, port)
        } else {
            self.hostname.clone()
        };
        let url = if self.hostname.starts_with("localhost") {
            format!("http://{}", hostname)
        } else {
            format!("https://{}", hostname)
        };
        Ok(Url::parse(&url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_name() -> Result<()> {
        let name = ImageName::parse("registry.example.com/charts/demo:1.0.0")?;
        assert_eq!(
            name,
            ImageName {
                hostname: "registry.example.com".to_string(),
                port: None,
                name: Name::new("charts/demo")?,
                reference: Reference::new("1.0.0")?,
            }
        );
        assert_eq!(name.to_string(), "registry.example.com/charts/demo:1.0.0");

        let name = ImageName::parse("localhost:5000/test_repo:latest")?;
        assert_eq!(
            name,
            ImageName {
                hostname: "localhost".to_string(),
                port: Some(5000),
                name: Name::new("test_repo")?,
                reference: Reference::new("latest")?,
            }
        );
        assert_eq!(name.registry_url()?.as_str(), "http://localhost:5000/");

        let name = ImageName::parse("demo")?;
        assert_eq!(
            name,
            ImageName {
                hostname: "docker.io".to_string(),
                port: None,
                name: Name::new("demo")?,
                reference: Reference::new("latest")?,
            }
        );

        Ok(())
    }
}
