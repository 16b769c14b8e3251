//! Page export formats.

use std::fmt;
use std::path::Path;

/// Rendered export produced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Doc,
}

impl ExportFormat {
    /// Pick the format from a destination file's extension (case-insensitive).
    ///
    /// Returns `None` for any extension other than `pdf` or `doc`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else if extension.eq_ignore_ascii_case("doc") {
            Some(Self::Doc)
        } else {
            None
        }
    }

    /// Server path of the export action, relative to the base URL.
    #[must_use]
    pub fn action_path(self) -> &'static str {
        match self {
            Self::Pdf => "/spaces/flyingpdf/pdfpageexport.action",
            Self::Doc => "/exportword",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::Doc => f.write_str("doc"),
        }
    }
}
