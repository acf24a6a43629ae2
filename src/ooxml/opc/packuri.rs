//! Part names within a package.
//!
//! Package parts are stored under their zip member names (no leading
//! slash); OPC relationship targets are resolved against absolute part
//! names. [`PackURI`] converts between the two forms.

/// An absolute part name such as `/word/document.xml`.
///
/// PackURIs always begin with a forward slash and use forward slashes as path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/word/document.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// # Returns
    /// * `Ok(PackURI)` if the URI is valid
    /// * `Err` if the URI doesn't start with a forward slash
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Create a PackURI from a zip member name such as `word/document.xml`.
    pub fn from_member(member: &str) -> Self {
        PackURI {
            uri: format!("/{}", member.trim_start_matches('/')),
        }
    }

    /// Create a PackURI from a relative reference and a base URI.
    ///
    /// This translates a relative reference (like "../media/image1.png") onto a base URI
    /// (like "/word/glossary") to produce an absolute PackURI. References that
    /// already begin with a slash are taken as absolute.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        if relative_ref.starts_with('/') {
            return Self::new(Self::normalize_path(relative_ref));
        }
        let joined = Self::join_paths(base_uri, relative_ref);
        let normalized = Self::normalize_path(&joined);
        Self::new(normalized)
    }

    /// Get the base URI (directory portion) of this PackURI.
    ///
    /// For example, "/word" for "/word/header1.xml".
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion of this PackURI.
    ///
    /// For example, "header1.xml" for "/word/header1.xml".
    pub fn filename(&self) -> &str {
        self.uri
            .rfind('/')
            .map_or("", |pos| &self.uri[pos + 1..])
    }

    /// Get the membername (URI with leading slash stripped).
    ///
    /// This is the form used as the Zip file membername and as the
    /// [`Part`](crate::package::Part) name.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Get the PackURI of the .rels part corresponding to this PackURI.
    ///
    /// For example, "/word/_rels/document.xml.rels" for "/word/document.xml".
    pub fn rels_uri(&self) -> PackURI {
        let base_uri = self.base_uri();
        let uri = if base_uri == "/" {
            format!("/_rels/{}.rels", self.filename())
        } else {
            format!("{}/_rels/{}.rels", base_uri, self.filename())
        };
        PackURI { uri }
    }

    /// Insert `suffix` between the file stem and the extension.
    ///
    /// `media/image1.png` with suffix `_2` becomes `media/image1_2.png`.
    /// Works on relative references as well, since only the last path
    /// segment is touched.
    pub fn suffixed_ref(reference: &str, suffix: &str) -> String {
        let segment_start = reference.rfind('/').map_or(0, |pos| pos + 1);
        match reference[segment_start..].rfind('.') {
            Some(dot) if dot > 0 => {
                let dot = segment_start + dot;
                format!("{}{}{}", &reference[..dot], suffix, &reference[dot..])
            },
            _ => format!("{}{}", reference, suffix),
        }
    }

    /// Get the full URI string.
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Helper function to join two paths using forward slashes
    fn join_paths(base: &str, rel: &str) -> String {
        if base.ends_with('/') {
            format!("{}{}", base, rel)
        } else {
            format!("{}/{}", base, rel)
        }
    }

    /// Helper function to normalize a path (resolve ".." and ".")
    fn normalize_path(path: &str) -> String {
        let mut parts = vec![""];

        for part in path.split('/') {
            match part {
                "" | "." => {},
                ".." => {
                    if parts.len() > 1 {
                        parts.pop();
                    }
                },
                _ => parts.push(part),
            }
        }

        if parts.len() == 1 {
            return "/".to_string();
        }

        parts.join("/")
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}
