//! Turns a single AI chat response into a downloadable zip archive.
//!
//! The response is scanned for fenced code blocks annotated with a path
//! (```` ```css:css/styles.css ````) and for inline base64 assets. The files
//! found are packaged into an in-memory zip and handed to a [`DeliverySink`].

pub mod api;
pub mod config;
pub mod deliver;
pub mod errors;
pub mod extract;
pub mod package;
pub mod preview;
pub mod prompt;
pub mod request;
pub mod transactions;
pub mod utils;
pub mod vfs;

pub use api::{process_response, try_process, FencepackError, Outcome, Report};
pub use deliver::{archive_name, deliver, DeliveryError, DeliverySink, DirectorySink, WriterSink};
pub use extract::extract;
pub use package::{package, package_with, Archive, PackOptions, PackageError};
pub use vfs::{Encoding, VirtualFile};
