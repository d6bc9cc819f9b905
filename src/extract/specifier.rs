use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use super::extensions::ExtensionTable;

/// How a module specifier is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecifierKind {
    /// Package names, URLs, absolute paths: anything not starting with `./` or `../`.
    Bare,
    /// `./x`, `../x` and `..`.
    Relative,
    /// Exactly `.`: the importing file's own directory.
    SelfDir,
}

impl SpecifierKind {
    /// Classify a raw specifier by its surface form.
    pub fn of(raw: &str) -> Self {
        if raw == "." {
            SpecifierKind::SelfDir
        } else if raw == ".." || raw.starts_with("./") || raw.starts_with("../") {
            SpecifierKind::Relative
        } else {
            SpecifierKind::Bare
        }
    }
}

/// A module specifier in canonical form.
///
/// For relative and self specifiers `normalized_path` is relative to the importing
/// file's directory, starts with `./` or `../`, and has every `.` and `..` segment
/// collapsed except the leading `..` run that climbs out of that directory. A path
/// ending in `/` names a directory (`./` for `.`). Bare specifiers are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedSpecifier {
    pub kind: SpecifierKind,
    pub normalized_path: String,
    pub has_explicit_extension: bool,
}

impl ResolvedSpecifier {
    pub fn is_bare(&self) -> bool {
        self.kind == SpecifierKind::Bare
    }

    /// True for `./`, `../`, `../../`: a reference to a directory rather than a file.
    pub fn is_directory(&self) -> bool {
        !self.is_bare() && self.normalized_path.ends_with('/')
    }

    /// The recognized extension token, without the dot.
    pub fn extension(&self) -> Option<&str> {
        if self.has_explicit_extension {
            extension_token(&self.normalized_path)
        } else {
            None
        }
    }

    /// The specifier as it should appear in emitted output whose modules all carry
    /// `ext`: extensionless relative files gain the extension and directories point
    /// at their index file. Bare and already-extensioned specifiers are unchanged.
    pub fn with_emit_extension(&self, ext: &str) -> String {
        let ext = ext.trim_start_matches('.');
        if self.is_bare() || self.has_explicit_extension {
            self.normalized_path.clone()
        } else if self.is_directory() {
            format!("{}index.{ext}", self.normalized_path)
        } else {
            format!("{}.{ext}", self.normalized_path)
        }
    }
}

/// Normalize `raw` as written in `from_file`.
///
/// Relative and self specifiers are joined with the importing file's directory,
/// collapsed with a segment stack and re-expressed relative to that directory again.
/// A `..` that climbs above the root is kept as a leading `..` rather than rejected;
/// whether that path exists is the file-system resolver's problem.
pub fn normalize_specifier(
    raw: &str,
    from_file: &Path,
    table: &ExtensionTable,
) -> ResolvedSpecifier {
    let kind = SpecifierKind::of(raw);
    let normalized_path = match kind {
        SpecifierKind::Bare => raw.to_owned(),
        SpecifierKind::Relative | SpecifierKind::SelfDir => relative_to_importer(raw, from_file),
    };
    let has_explicit_extension =
        extension_token(&normalized_path).is_some_and(|ext| table.is_recognized(ext));

    ResolvedSpecifier {
        kind,
        normalized_path,
        has_explicit_extension,
    }
}

/// Push one path segment onto a collapsing stack.
fn push_segment(stack: &mut Vec<String>, segment: &str) {
    match segment {
        "" | "." => {}
        ".." => {
            if stack.last().is_some_and(|s| s.as_str() != "..") {
                stack.pop();
            } else {
                stack.push("..".to_owned());
            }
        }
        s => stack.push(s.to_owned()),
    }
}

/// Collapsed segments of the directory containing `from_file`.
///
/// Root and prefix components are dropped: the importing directory and the target
/// share them, so they never affect the relative result.
fn directory_segments(from_file: &Path) -> Vec<String> {
    let mut stack = Vec::new();
    if let Some(dir) = from_file.parent() {
        for component in dir.components() {
            match component {
                Component::Normal(s) => push_segment(&mut stack, &s.to_string_lossy()),
                Component::ParentDir => push_segment(&mut stack, ".."),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
    }
    stack
}

fn relative_to_importer(raw: &str, from_file: &Path) -> String {
    let base = directory_segments(from_file);

    let mut target = base.clone();
    for segment in raw.split('/') {
        push_segment(&mut target, segment);
    }

    // `target` always extends a prefix of `base` (only trailing normal segments can be
    // popped), so the part of `base` past the common prefix holds no `..`.
    let common = base.iter().zip(&target).take_while(|(a, b)| a == b).count();
    let mut segments: Vec<&str> = vec![".."; base.len() - common];
    segments.extend(target[common..].iter().map(String::as_str));

    if segments.is_empty() {
        "./".to_owned()
    } else if segments.iter().all(|s| *s == "..") {
        format!("{}/", segments.join("/"))
    } else if segments[0] == ".." {
        segments.join("/")
    } else {
        format!("./{}", segments.join("/"))
    }
}

/// The suffix after the last `.` of the last path segment, if the segment has a
/// non-empty stem.
fn extension_token(path: &str) -> Option<&str> {
    let last = path.rsplit('/').next()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.trim_matches('.').is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Join a normalized relative path onto a directory, collapsing `..` the same way
/// the normalizer does.
pub(crate) fn join_normalized(base_dir: &Path, relative: &str) -> PathBuf {
    let mut out = PathBuf::new();
    // Normal segments currently poppable from `out`.
    let mut depth = 0usize;

    fn parent(out: &mut PathBuf, depth: &mut usize) {
        if *depth > 0 {
            out.pop();
            *depth -= 1;
        } else {
            out.push("..");
        }
    }

    for component in base_dir.components() {
        match component {
            Component::Normal(s) => {
                out.push(s);
                depth += 1;
            }
            Component::ParentDir => parent(&mut out, &mut depth),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
        }
    }
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => parent(&mut out, &mut depth),
            s => {
                out.push(s);
                depth += 1;
            }
        }
    }
    out
}
