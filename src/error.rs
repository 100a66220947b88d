use std::path::PathBuf;

/// Failure while turning a view binary into a loaded view. Any of these skips
/// the module and leaves the rest of the registry intact.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not open view library {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("view library {path} exports no API version symbol")]
    VersionSymbolMissing { path: PathBuf },
    #[error("view library {path} is built for API version {found}, host is {expected}")]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

/// The only caller-visible errors a view switch can produce.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SwitchError {
    #[error("no view named `{0}` is loaded")]
    NotFound(String),
    /// The target view's entry guard vetoed the transition. The previously
    /// active view is untouched.
    #[error("view refused entry with code {0}")]
    Refused(i32),
}
