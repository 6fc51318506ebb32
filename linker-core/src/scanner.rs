//! Splits raw module text into import references, extension directives and plain body lines.
//!
//! Only `#import` and `#extension` lines get special treatment. Every other line is opaque
//! body text and is copied through untouched, including blank lines and other preprocessor
//! directives.

use crate::ResolveError;
use std::borrow::Cow;

/// Name of the caller-supplied top-level module. It is never fetched.
pub const ROOT_MODULE: &str = "[main]";

const IMPORT_DIRECTIVE: &str = "#import";
const EXTENSION_DIRECTIVE: &str = "#extension";

/// Scanner settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Wrap every non-root body in `//-- begin import <name> --` / `//-- end import <name> --`
    /// comment lines. Purely cosmetic.
    pub import_markers: bool,
}

/// Classification of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// An `#import` line. `None` when the quoted path is missing or malformed.
    Import(Option<&'a str>),
    /// An `#extension` line, hoisted out of the body.
    Extension,
    /// Any other line, kept as written.
    Body,
}

/// An import that has been read from the text but not yet linked to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImport {
    /// Quoted module path.
    pub name: String,
    /// Byte offset into the importing module's body where the dependency is spliced.
    pub offset: usize,
    /// 1-based line of the directive in the module source.
    pub line: usize,
}

/// Result of scanning one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedModule {
    /// Module name, or [`ROOT_MODULE`] for the root.
    pub name: String,
    /// Source text without import and extension lines.
    pub body: String,
    /// Extension lines in order of appearance, each ending in `\n`, without repeats.
    pub extensions: Vec<String>,
    /// Imports in file order; offsets are non-decreasing.
    pub imports: Vec<PendingImport>,
}

/// Classifies a line by its trimmed form.
#[must_use]
pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix(IMPORT_DIRECTIVE) {
        if rest.is_empty() {
            return LineKind::Import(None);
        }
        if rest.starts_with(char::is_whitespace) {
            return LineKind::Import(parse_quoted(rest.trim()));
        }
    }
    if let Some(rest) = trimmed.strip_prefix(EXTENSION_DIRECTIVE) {
        if rest.starts_with(char::is_whitespace) {
            return LineKind::Extension;
        }
    }
    LineKind::Body
}

/// Extracts the path from `"path"`. The path must be non-empty and free of quotes.
fn parse_quoted(argument: &str) -> Option<&str> {
    let inner = argument.strip_prefix('"')?.strip_suffix('"')?;
    if inner.is_empty() || inner.contains('"') {
        None
    } else {
        Some(inner)
    }
}

fn normalize_newlines(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Scans `raw` as the text of `module`.
///
/// Ordinary lines keep their own terminator, so an import-free module scans to itself.
/// Each import records the body length at the point it was read; that is where the
/// dependency's text belongs once resolved.
///
/// # Errors
///
/// `MalformedDirective` for an `#import` line without a well-formed quoted path, and
/// `SelfImport` when the quoted path names `module` itself.
pub fn scan(raw: &str, module: &str, options: ScanOptions) -> Result<ScannedModule, ResolveError> {
    let text = normalize_newlines(raw);
    let wrap = options.import_markers && module != ROOT_MODULE;

    let mut scanned = ScannedModule {
        name: module.to_owned(),
        ..ScannedModule::default()
    };
    if wrap {
        scanned.body.push_str(&format!("//-- begin import {module} --\n"));
    }

    for (index, line) in text.split_inclusive('\n').enumerate() {
        let content = line.strip_suffix('\n').unwrap_or(line);
        match classify(content) {
            LineKind::Import(Some(name)) => {
                if name == module {
                    return Err(ResolveError::SelfImport {
                        module: module.to_owned(),
                    });
                }
                scanned.imports.push(PendingImport {
                    name: name.to_owned(),
                    offset: scanned.body.len(),
                    line: index + 1,
                });
            }
            LineKind::Import(None) => {
                return Err(ResolveError::MalformedDirective {
                    module: module.to_owned(),
                    line: index + 1,
                    text: content.trim().to_owned(),
                });
            }
            LineKind::Extension => {
                let extension = format!("{content}\n");
                if !scanned.extensions.contains(&extension) {
                    scanned.extensions.push(extension);
                }
            }
            LineKind::Body => scanned.body.push_str(line),
        }
    }

    if wrap {
        if !scanned.body.ends_with('\n') {
            scanned.body.push('\n');
        }
        scanned
            .body
            .push_str(&format!("//-- end import {module} --\n"));
    }

    log::trace!(
        "Scanned '{}': {} body bytes, {} imports, {} extensions",
        module,
        scanned.body.len(),
        scanned.imports.len(),
        scanned.extensions.len()
    );
    Ok(scanned)
}
