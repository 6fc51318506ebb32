use linker_core::{FetchError, ModuleFetcher};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Reads modules from an ordered list of asset root directories.
///
/// A module name is a `/`-separated path relative to an asset root, such as
/// `Common/ShaderLib/Lighting.glsllib`. Roots are searched in order and the first file found
/// wins.
#[derive(Debug, Clone, Default)]
pub struct DirFetcher {
    roots: Vec<PathBuf>,
}

impl DirFetcher {
    /// Creates a fetcher searching `roots` in order.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends a root searched after the existing ones.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Asset roots in search order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Module names must stay inside an asset root.
fn relative_module_path(name: &str) -> Result<&Path, FetchError> {
    let invalid = |reason: &str| FetchError::InvalidName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };

    if name.trim().is_empty() {
        return Err(invalid("empty module name"));
    }
    let path = Path::new(name);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(invalid("'..' is not allowed in module names")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("module names are relative to an asset root"))
            }
        }
    }
    Ok(path)
}

impl ModuleFetcher for DirFetcher {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        let relative = relative_module_path(name)?;

        for root in &self.roots {
            let path = root.join(relative);
            match fs::read_to_string(&path) {
                Ok(text) => {
                    log::debug!("Loaded module '{}' from {:?}", name, path);
                    return Ok(text);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::trace!("'{}' not under {:?}", name, root);
                }
                Err(e) => {
                    return Err(FetchError::Io {
                        name: name.to_owned(),
                        source: e,
                    });
                }
            }
        }
        Err(FetchError::NotFound(name.to_owned()))
    }
}
