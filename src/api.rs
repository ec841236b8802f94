use crate::{
    deliver::{self, DeliverySink},
    extract::extract,
    package::{self, PackOptions},
};
use serde::Serialize;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum FencepackError {
    #[error("no files were found in the response")]
    #[diagnostic(
        code(fencepack::no_files_found),
        help("Ask for files fenced as ```html:index.html, ```css:css/styles.css, ...")
    )]
    NoFilesFound,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Packaging(package::PackageError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Delivery(#[from] deliver::DeliveryError),
}
impl From<package::PackageError> for FencepackError {
    fn from(error: package::PackageError) -> Self {
        match error {
            package::PackageError::NoFiles => Self::NoFilesFound,
            other => Self::Packaging(other),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Name handed to the delivery sink, `<projectName>.zip`.
    pub archive_name: String,
    /// Paths of every extracted file, in extraction order (duplicates included).
    pub files: Vec<String>,
}

/// Structured result returned to callers; never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub success: bool,
    pub files_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
impl From<Result<Outcome, FencepackError>> for Report {
    fn from(result: Result<Outcome, FencepackError>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                files_count: outcome.files.len(),
                files: outcome.files,
                archive_name: Some(outcome.archive_name),
                error: None,
            },
            Err(error) => Self {
                success: false,
                files_count: 0,
                files: Vec::new(),
                archive_name: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// Extracts the files embedded in `text`, packages them and hands the archive to `sink`.
///
/// # Errors
///
/// Returns a [`FencepackError`] if:
///
/// - `text` contains no recognizable file (nothing is packaged or delivered).
/// - A base64 payload cannot be decoded, or a path is rejected in strict mode.
/// - The sink fails to save the archive.
pub fn try_process(
    text: &str,
    project_name: Option<&str>,
    options: &PackOptions,
    sink: &mut dyn DeliverySink,
) -> Result<Outcome, FencepackError> {
    let files = extract(text);

    log::debug!("extracted {} file(s)", files.len());

    if files.is_empty() {
        return Err(FencepackError::NoFilesFound);
    }

    let archive = package::package_with(&files, options)?;

    let archive_name = deliver::deliver(sink, &archive.bytes, project_name)?;

    Ok(Outcome {
        archive_name,
        files: files.into_iter().map(|file| file.path).collect(),
    })
}

/// Same as [`try_process`], folded into a [`Report`].
pub fn process_response(
    text: &str,
    project_name: Option<&str>,
    options: &PackOptions,
    sink: &mut dyn DeliverySink,
) -> Report {
    let result = try_process(text, project_name, options, sink);

    if let Err(error) = &result {
        log::error!("processing response failed: {}", error);
    }

    Report::from(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deliver::DeliveryError;
    use std::io::{Cursor, Read};

    #[derive(Default)]
    struct RecordingSink {
        delivered: Vec<(String, Vec<u8>)>,
    }
    impl DeliverySink for RecordingSink {
        fn deliver(&mut self, archive: &[u8], file_name: &str) -> Result<(), DeliveryError> {
            self.delivered.push((file_name.to_string(), archive.to_vec()));
            Ok(())
        }
    }

    struct FailingSink;
    impl DeliverySink for FailingSink {
        fn deliver(&mut self, _archive: &[u8], file_name: &str) -> Result<(), DeliveryError> {
            Err(crate::errors::IoError::new(
                crate::errors::FileOperation::Write,
                file_name.into(),
                std::io::Error::other("disk full"),
            )
            .into())
        }
    }

    fn entries(bytes: &[u8]) -> Vec<(String, String)> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        (0..zip.len())
            .map(|i| {
                let mut entry = zip.by_index(i).unwrap();
                let mut contents = String::new();
                entry.read_to_string(&mut contents).unwrap();
                (entry.name().to_string(), contents)
            })
            .collect()
    }

    #[test]
    fn two_file_site_is_delivered_as_mysite_zip() {
        let text = "Here you go:\n```html:index.html\n<h1>Hi</h1>\n```\n```css:css/styles.css\nbody{color:red}\n```\n";
        let mut sink = RecordingSink::default();

        let report = process_response(text, Some("mysite"), &PackOptions::default(), &mut sink);

        assert_eq!(
            report,
            Report {
                success: true,
                files_count: 2,
                files: vec!["index.html".into(), "css/styles.css".into()],
                archive_name: Some("mysite.zip".into()),
                error: None,
            }
        );
        assert_eq!(sink.delivered.len(), 1);
        assert_eq!(sink.delivered[0].0, "mysite.zip");
        assert_eq!(
            entries(&sink.delivered[0].1),
            vec![
                ("index.html".to_string(), "<h1>Hi</h1>".to_string()),
                ("css/styles.css".to_string(), "body{color:red}".to_string()),
            ]
        );
    }

    #[test]
    fn prose_only_reports_no_files_found() {
        let mut sink = RecordingSink::default();

        let result = try_process("Just chatting.", None, &PackOptions::default(), &mut sink);
        assert!(matches!(result, Err(FencepackError::NoFilesFound)));

        let report = process_response("Just chatting.", None, &PackOptions::default(), &mut sink);
        assert!(!report.success);
        assert_eq!(report.files_count, 0);
        assert!(report.error.is_some());
        assert!(sink.delivered.is_empty());
    }

    #[test]
    fn later_block_wins_in_delivered_archive() {
        let text = "```js:app.js\nold()\n```\n```js:app.js\nnew()\n```";
        let mut sink = RecordingSink::default();

        let outcome = try_process(text, None, &PackOptions::default(), &mut sink).unwrap();

        assert_eq!(outcome.files, vec!["app.js", "app.js"]);
        assert_eq!(outcome.archive_name, "web-project.zip");
        assert_eq!(
            entries(&sink.delivered[0].1),
            vec![("app.js".to_string(), "new()".to_string())]
        );
    }

    #[test]
    fn bad_payload_delivers_nothing() {
        let text = "```html:index.html\n<p></p>\n```\n[a.png](data:image/png;base64,%%%%)";
        let mut sink = RecordingSink::default();

        let result = try_process(text, None, &PackOptions::default(), &mut sink);

        assert!(matches!(result, Err(FencepackError::Packaging(_))));
        assert!(sink.delivered.is_empty());
    }

    #[test]
    fn delivery_failure_is_reported() {
        let text = "```html:index.html\n<p></p>\n```";

        let report = process_response(text, Some("x"), &PackOptions::default(), &mut FailingSink);

        assert!(!report.success);
        assert_eq!(report.files_count, 0);
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = Report {
            success: true,
            files_count: 1,
            files: vec!["index.html".into()],
            archive_name: Some("site.zip".into()),
            error: None,
        };

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "filesCount": 1,
                "files": ["index.html"],
                "archiveName": "site.zip"
            })
        );
    }
}
