use crate::{
    errors::{FileOperation, IoError},
    transactions::{Active, RollbackOperation, Transaction},
    utils::project_name_or_default,
};
use miette::Diagnostic;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum DeliveryError {
    #[error("I/O error within delivery domain")]
    #[diagnostic(code(fencepack::deliver::io))]
    Io(#[from] IoError),

    #[error("unable to save archive to '{path}'")]
    #[diagnostic(
        code(fencepack::deliver::persist),
        help("Check that the output directory is writable")
    )]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Something that can turn archive bytes into a saved file.
pub trait DeliverySink {
    /// Saves `archive` under the suggested `file_name`.
    fn deliver(&mut self, archive: &[u8], file_name: &str) -> Result<(), DeliveryError>;
}

/// Suggested download name for a project: `<projectName>.zip`.
pub fn archive_name(project_name: Option<&str>) -> String {
    format!("{}.zip", project_name_or_default(project_name))
}

/// Hands `archive` to `sink` under [`archive_name`], returning the name used.
pub fn deliver(
    sink: &mut dyn DeliverySink,
    archive: &[u8],
    project_name: Option<&str>,
) -> Result<String, DeliveryError> {
    let file_name = archive_name(project_name);

    sink.deliver(archive, &file_name)?;

    log::info!("delivered {} ({} bytes)", file_name, archive.len());

    Ok(file_name)
}

/// Saves archives into a directory, creating it when needed.
///
/// The archive is written to a temporary file next to its final location and then
/// renamed into place. Anything created along the way is removed again if the save
/// fails.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}
impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}
impl DeliverySink for DirectorySink {
    fn deliver(&mut self, archive: &[u8], file_name: &str) -> Result<(), DeliveryError> {
        let mut trx = Transaction::<Active>::new();

        create_directory(&mut trx, &self.root)?;

        let destination = self.root.join(file_name);

        let mut staging = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(|error| IoError::new(FileOperation::Write, self.root.clone(), error))?;

        staging
            .write_all(archive)
            .and_then(|_| staging.flush())
            .map_err(|error| IoError::new(FileOperation::Write, staging.path().into(), error))?;

        staging
            .persist(&destination)
            .map_err(|error| DeliveryError::Persist {
                path: destination.clone(),
                source: error,
            })?;

        trx.commit();

        log::debug!("saved {}", destination.display());

        Ok(())
    }
}

/// Creates `path` (and its parents) if missing, registering a rollback for the
/// top-most directory this call actually created.
fn create_directory(trx: &mut Transaction<Active>, path: &Path) -> Result<(), DeliveryError> {
    let first_missing = path
        .ancestors()
        .take_while(|ancestor| !ancestor.as_os_str().is_empty() && !ancestor.exists())
        .last()
        .map(Path::to_path_buf);

    fs::create_dir_all(path)
        .map_err(|error| IoError::new(FileOperation::Mkdir, path.into(), error))?;

    if let Some(created) = first_missing {
        trx.add_operation(RollbackOperation::RemoveDir(created));
    }

    Ok(())
}

/// Streams archives to any writer, e.g. stdout. The suggested name is only logged.
pub struct WriterSink<W: Write> {
    writer: W,
}
impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
impl<W: Write> DeliverySink for WriterSink<W> {
    fn deliver(&mut self, archive: &[u8], file_name: &str) -> Result<(), DeliveryError> {
        log::debug!("streaming {} to writer", file_name);

        self.writer
            .write_all(archive)
            .and_then(|_| self.writer.flush())
            .map_err(|error| IoError::new(FileOperation::Write, PathBuf::from(file_name), error))?;

        Ok(())
    }
}
