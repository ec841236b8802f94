use crate::vfs::VirtualFile;
use regex::Regex;

lazy_static::lazy_static! {
    static ref FENCED_BLOCK_REGEX: Regex = Regex::new(
        r"(?xis)      # extended, case-insensitive, dot matches newline
        ```
        (?:html|css|javascript|js)?   # optional language hint
        :[\ \t]*
        ([\w/.\-]+)                   # 1) path
        [\ \t]*\r?\n
        (.*?)                         # 2) body, up to the first closing fence
        ```"
    ).expect("a valid regex pattern");

    static ref BRACKET_ASSET_REGEX: Regex = Regex::new(
        r"(?xi)
        \[
        ([^\]]+\.(?:png|jpg|jpeg|gif|svg|ico|webp))   # 1) file name
        \]
        \(data:([^;]+);base64,                        # 2) mime type
        ([^)]+)                                       # 3) payload
        \)"
    ).expect("a valid regex pattern");

    static ref BOLD_ASSET_REGEX: Regex = Regex::new(
        r"(?xi)
        \*\*
        ([^*]+\.(?:png|jpg|jpeg|gif|svg|ico|webp|woff2|woff|ttf))   # 1) file name
        \*\*:[\ \t]*
        data:([^;]+);base64,                                        # 2) mime type
        (\S+)                                                       # 3) payload
        "
    ).expect("a valid regex pattern");
}

/// Scans `text` for embedded files.
///
/// Results are ordered by pattern kind first (fenced blocks, then bracket assets,
/// then bold-label assets) and by position within each kind. Packaging relies on
/// this order for last-write-wins on duplicate paths.
///
/// The three scans are independent, so a span may be claimed by more than one of
/// them. Text that matches nothing yields an empty vector.
pub fn extract(text: &str) -> Vec<VirtualFile> {
    let mut files = fenced_blocks(text);
    files.extend(assets(&BRACKET_ASSET_REGEX, text));
    files.extend(assets(&BOLD_ASSET_REGEX, text));

    files
}

fn fenced_blocks(text: &str) -> Vec<VirtualFile> {
    let mut files = Vec::new();

    for captures in FENCED_BLOCK_REGEX.captures_iter(text) {
        let path = captures[1].trim();
        let content = captures[2].trim();

        if path.is_empty() || content.is_empty() {
            log::debug!("skipping empty code block for '{}'", path);
            continue;
        }

        log::debug!("found code block: {}", path);

        files.push(VirtualFile::text(path, content));
    }

    files
}

fn assets(pattern: &Regex, text: &str) -> Vec<VirtualFile> {
    let mut files = Vec::new();

    for captures in pattern.captures_iter(text) {
        // both captures are non-empty by construction and kept verbatim
        let path = &captures[1];
        let mime_type = &captures[2];
        let payload = &captures[3];

        log::debug!("found base64 asset: {} ({})", path, mime_type);

        files.push(VirtualFile::base64(path, payload));
    }

    files
}
