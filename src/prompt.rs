use inquire::Confirm;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PromptError {
    #[error("unable to read confirmation")]
    #[diagnostic(
        code(fencepack::prompt::confirm),
        help("Pass --yes when running without an interactive terminal")
    )]
    Confirm(#[from] inquire::InquireError),
}

/// Asks the user whether `file_name` should be saved.
pub fn confirm_delivery(file_name: &str) -> Result<bool, PromptError> {
    let answer = Confirm::new(&format!("Save {}?", file_name))
        .with_default(true)
        .prompt()?;

    Ok(answer)
}
