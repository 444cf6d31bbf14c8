use std::fmt;
use std::sync::Arc;

use crate::package::WrapPackage;
use crate::uri::Uri;
use crate::wrapper::Wrapper;

/// Outcome of a single resolver call.
///
/// A resolver returning `Uri` equal to its input signals a miss. Any other
/// `Uri` is a redirect; `Package` and `Wrapper` are always hits.
#[derive(Clone)]
pub enum UriPackageOrWrapper {
    Uri(Uri),
    Package {
        uri: Uri,
        package: Arc<dyn WrapPackage>,
    },
    Wrapper {
        uri: Uri,
        wrapper: Arc<dyn Wrapper>,
    },
}

impl UriPackageOrWrapper {
    pub fn uri(&self) -> &Uri {
        match self {
            Self::Uri(uri) => uri,
            Self::Package { uri, .. } | Self::Wrapper { uri, .. } => uri,
        }
    }

    /// True when this is the miss signal for `input`.
    pub fn is_miss_for(&self, input: &Uri) -> bool {
        matches!(self, Self::Uri(uri) if uri == input)
    }

    /// Short tag used by the history renderer.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Uri(_) => "uri",
            Self::Package { .. } => "package",
            Self::Wrapper { .. } => "wrapper",
        }
    }
}

impl PartialEq for UriPackageOrWrapper {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Uri(a), Self::Uri(b)) => a == b,
            (
                Self::Package { uri, package },
                Self::Package {
                    uri: other_uri,
                    package: other_package,
                },
            ) => uri == other_uri && Arc::ptr_eq(package, other_package),
            (
                Self::Wrapper { uri, wrapper },
                Self::Wrapper {
                    uri: other_uri,
                    wrapper: other_wrapper,
                },
            ) => uri == other_uri && Arc::ptr_eq(wrapper, other_wrapper),
            _ => false,
        }
    }
}

impl fmt::Debug for UriPackageOrWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.uri())
    }
}

impl From<Uri> for UriPackageOrWrapper {
    fn from(uri: Uri) -> Self {
        Self::Uri(uri)
    }
}
