use std::path::{Component, Path};

/// Fallback used when no project name is given.
pub const DEFAULT_PROJECT_NAME: &str = "web-project";

/// Returns the project name unchanged, or [`DEFAULT_PROJECT_NAME`] when it is missing or empty.
pub fn project_name_or_default(project_name: Option<&str>) -> &str {
    match project_name {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_PROJECT_NAME,
    }
}

/// Checks that an archive entry path stays inside the archive root once extracted.
///
/// Absolute paths, drive prefixes and any `..` segment are rejected.
pub fn is_safe_entry_path(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return false;
    }

    Path::new(path).components().all(|component| match component {
        Component::CurDir | Component::Normal(_) => true,
        Component::ParentDir | Component::RootDir | Component::Prefix(_) => false,
    }) && !path.split(['/', '\\']).any(|segment| segment == "..")
}
