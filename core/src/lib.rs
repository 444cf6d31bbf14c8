//! Core types for the wrap URI resolution engine.
//!
//! This crate defines what the resolvers operate on and what they need from
//! the outside world:
//! - [`Uri`]: canonical `wrap://authority/path` identifiers
//! - [`resolution`]: results, the shared [`ResolutionContext`], history steps
//!   and the clean-history renderer
//! - capability traits owned by collaborators: [`Invoker`], [`Wrapper`],
//!   [`WrapPackage`], [`WrapperRuntime`], [`FileReader`]
//! - the [`UriResolver`] trait every resolver implements
//!
//! Concrete resolvers live in `wrap-resolvers`.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod error;
pub mod file_reader;
pub mod invoker;
pub mod manifest;
pub mod package;
pub mod resolution;
pub mod resolver;
pub mod uri;
pub mod wrapper;

pub use error::Error;
pub use error::ErrorCategory;
pub use error::Result;
pub use file_reader::FileReader;
pub use file_reader::InMemoryFileReader;
pub use invoker::InterfaceImplementations;
pub use invoker::Invoker;
pub use manifest::GetManifestOptions;
pub use manifest::WrapKind;
pub use manifest::WrapManifest;
pub use package::FilePackage;
pub use package::WrapPackage;
pub use package::WrapperRuntime;
pub use resolution::ResolutionContext;
pub use resolution::UriPackageOrWrapper;
pub use resolution::UriResolutionStep;
pub use resolver::UriResolver;
pub use uri::Uri;
pub use uri::UriParseError;
pub use wrapper::Wrapper;
