use crate::{utils::is_safe_entry_path, vfs::VirtualFile};
use indexmap::IndexMap;
use miette::Diagnostic;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

#[derive(Debug, Error, Diagnostic)]
pub enum PackageError {
    #[error("there are no files to package")]
    #[diagnostic(
        code(fencepack::package::no_files),
        help("Files must be fenced as ```lang:path/to/file or referenced as base64 assets")
    )]
    NoFiles,

    #[error("invalid base64 payload for '{path}'")]
    #[diagnostic(code(fencepack::package::invalid_base64))]
    InvalidBase64 {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("refusing to package unsafe path '{path}'")]
    #[diagnostic(
        code(fencepack::package::unsafe_path),
        help("Entry paths must be relative and must not contain '..'")
    )]
    UnsafePath { path: String },

    #[error("unable to add '{path}' to the archive")]
    #[diagnostic(code(fencepack::package::zip))]
    Zip {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("unable to write '{path}' into the archive")]
    #[diagnostic(code(fencepack::package::write))]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Knobs for [`package_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PackOptions {
    /// Reject absolute entry paths and paths containing `..`.
    pub strict_paths: bool,
}

/// A serialized zip archive held in memory.
#[derive(Debug, Clone)]
pub struct Archive {
    pub bytes: Vec<u8>,
    /// Entry names in the order they were written.
    pub entries: Vec<String>,
}

/// Packages `files` with default options. See [`package_with`].
pub fn package(files: &[VirtualFile]) -> Result<Archive, PackageError> {
    package_with(files, &PackOptions::default())
}

/// Builds a deflate zip archive from `files`.
///
/// Files are written under their `path`. When several files share a path the last
/// one wins, and the entry stays at the position of the first occurrence. Every
/// payload is decoded before any entry is written, so a bad payload never yields a
/// partial archive.
pub fn package_with(files: &[VirtualFile], options: &PackOptions) -> Result<Archive, PackageError> {
    if files.is_empty() {
        return Err(PackageError::NoFiles);
    }

    let mut staged: IndexMap<&str, Vec<u8>> = IndexMap::new();

    for file in files {
        if options.strict_paths && !is_safe_entry_path(&file.path) {
            return Err(PackageError::UnsafePath {
                path: file.path.clone(),
            });
        }

        let bytes = file.bytes().map_err(|error| PackageError::InvalidBase64 {
            path: file.path.clone(),
            source: error,
        })?;

        if staged.insert(file.path.as_str(), bytes).is_some() {
            log::debug!("overwriting duplicate entry: {}", file.path);
        }
    }

    let entry_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (path, bytes) in &staged {
        writer
            .start_file(*path, entry_options)
            .map_err(|error| PackageError::Zip {
                path: path.to_string(),
                source: error,
            })?;

        writer
            .write_all(bytes)
            .map_err(|error| PackageError::Write {
                path: path.to_string(),
                source: error,
            })?;
    }

    let cursor = writer.finish().map_err(|error| PackageError::Zip {
        path: String::new(),
        source: error,
    })?;

    Ok(Archive {
        bytes: cursor.into_inner(),
        entries: staged.keys().map(|path| path.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_back(archive: &Archive) -> Vec<(String, Vec<u8>)> {
        let mut zip = ZipArchive::new(Cursor::new(archive.bytes.clone())).unwrap();
        let mut entries = Vec::new();

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).unwrap();
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).unwrap();
            entries.push((entry.name().to_string(), contents));
        }

        entries
    }

    #[test]
    fn empty_input_is_refused() {
        let result = package(&[]);

        assert!(matches!(result, Err(PackageError::NoFiles)));
    }

    #[test]
    fn entries_round_trip() {
        let files = vec![
            VirtualFile::text("index.html", "<h1>Hi</h1>"),
            VirtualFile::text("css/styles.css", "body{color:red}"),
            VirtualFile::base64("img/dot.png", "iVBORw0KGgo="),
        ];

        let archive = package(&files).unwrap();

        assert_eq!(
            read_back(&archive),
            vec![
                ("index.html".to_string(), b"<h1>Hi</h1>".to_vec()),
                ("css/styles.css".to_string(), b"body{color:red}".to_vec()),
                (
                    "img/dot.png".to_string(),
                    vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]
                ),
            ]
        );
        assert_eq!(archive.entries, vec!["index.html", "css/styles.css", "img/dot.png"]);
    }

    #[test]
    fn later_duplicate_wins() {
        let files = vec![
            VirtualFile::text("index.html", "first"),
            VirtualFile::text("app.js", "js"),
            VirtualFile::text("index.html", "second"),
        ];

        let archive = package(&files).unwrap();

        assert_eq!(
            read_back(&archive),
            vec![
                ("index.html".to_string(), b"second".to_vec()),
                ("app.js".to_string(), b"js".to_vec()),
            ]
        );
    }

    #[test]
    fn malformed_base64_fails_whole_archive() {
        let files = vec![
            VirtualFile::text("index.html", "ok"),
            VirtualFile::base64("broken.png", "@@@@"),
        ];

        let result = package(&files);

        assert!(
            matches!(result, Err(PackageError::InvalidBase64 { ref path, .. }) if path == "broken.png")
        );
    }

    #[test]
    fn unsafe_paths_pass_by_default() {
        let files = vec![VirtualFile::text("../escape.txt", "x")];

        let archive = package(&files).unwrap();

        assert_eq!(archive.entries, vec!["../escape.txt"]);
    }

    #[test]
    fn strict_mode_rejects_unsafe_paths() {
        let files = vec![
            VirtualFile::text("ok.txt", "x"),
            VirtualFile::text("/etc/passwd", "x"),
        ];

        let result = package_with(&files, &PackOptions { strict_paths: true });

        assert!(
            matches!(result, Err(PackageError::UnsafePath { ref path }) if path == "/etc/passwd")
        );
    }
}
