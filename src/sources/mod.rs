//! Built-in source implementations.
//!
//! `Defaults` and `Env` run the tag-driven passes. `Preset` and the file
//! formats produce a whole same-shaped layer that is merged into the target.

mod defaults;
mod env_source;

#[cfg(feature = "json")]
mod json_source;
#[cfg(feature = "toml")]
mod toml_source;
#[cfg(feature = "yaml")]
mod yaml_source;

pub use defaults::{Defaults, Preset};
pub use env_source::Env;

#[cfg(feature = "json")]
pub use json_source::Json;
#[cfg(feature = "toml")]
pub use toml_source::Toml;
#[cfg(feature = "yaml")]
pub use yaml_source::Yaml;

#[cfg(any(feature = "toml", feature = "json", feature = "yaml"))]
pub(crate) use file_layer::FileLayer;

#[cfg(any(feature = "toml", feature = "json", feature = "yaml"))]
mod file_layer {
    use std::io::ErrorKind;
    use std::path::PathBuf;

    use tracing::debug;

    use crate::env::ConfigEnv;
    use crate::error::{ConfigError, SourceErrorKind};
    use crate::field::{FieldMeta, Layered, Value};
    use crate::source::merge_layer;

    /// Where a file-format layer reads its text from.
    #[derive(Debug, Clone)]
    enum Text {
        File(PathBuf),
        String { content: String, name: String },
    }

    /// Settings shared by every file-format source.
    #[derive(Debug, Clone)]
    pub(crate) struct FileLayer {
        text: Text,
        required: bool,
        name: Option<String>,
    }

    impl FileLayer {
        pub(crate) fn file(path: impl Into<PathBuf>) -> Self {
            Self {
                text: Text::File(path.into()),
                required: true,
                name: None,
            }
        }

        pub(crate) fn string(content: impl Into<String>) -> Self {
            Self {
                text: Text::String {
                    content: content.into(),
                    name: "<string>".to_string(),
                },
                required: true,
                name: None,
            }
        }

        pub(crate) fn set_required(&mut self, required: bool) {
            self.required = required;
        }

        pub(crate) fn set_name(&mut self, name: String) {
            self.name = Some(name);
        }

        pub(crate) fn name(&self) -> &str {
            match &self.name {
                Some(name) => name,
                None => match &self.text {
                    Text::File(path) => path.to_str().unwrap_or("<file>"),
                    Text::String { name, .. } => name,
                },
            }
        }

        /// Read the layer text. `Ok(None)` means an optional file is absent.
        fn read(&self, env: &dyn ConfigEnv) -> Result<Option<String>, ConfigError> {
            let path = match &self.text {
                Text::String { content, .. } => return Ok(Some(content.clone())),
                Text::File(path) => path,
            };

            match env.read_file(path) {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    if self.required {
                        Err(ConfigError::decode(
                            self.name(),
                            SourceErrorKind::NotFound {
                                path: path.display().to_string(),
                            },
                        ))
                    } else {
                        debug!(path = %path.display(), "optional configuration file not found");
                        Ok(None)
                    }
                }
                Err(e) => Err(ConfigError::decode(
                    self.name(),
                    SourceErrorKind::Io {
                        message: e.to_string(),
                    },
                )),
            }
        }

        /// Read and parse the text, fit the document onto a zero scratch tree,
        /// and merge the scratch into `target`.
        ///
        /// `target` is untouched unless the whole document fits.
        pub(crate) fn load<T, P>(
            &self,
            target: &mut T,
            env: &dyn ConfigEnv,
            parse: P,
        ) -> Result<(), ConfigError>
        where
            T: Layered,
            P: FnOnce(&str) -> Result<Value, SourceErrorKind>,
        {
            let Some(content) = self.read(env)? else {
                return Ok(());
            };

            let document = parse(&content).map_err(|kind| ConfigError::decode(self.name(), kind))?;
            let mut scratch = T::zero();
            scratch
                .decode(&FieldMeta::ROOT, document)
                .map_err(|kind| ConfigError::decode(self.name(), kind))?;
            debug!(source = self.name(), "decoded configuration layer");
            merge_layer(target, scratch);
            Ok(())
        }
    }
}

/// 1-based line and column of a byte offset.
#[cfg(feature = "toml")]
pub(crate) fn position_from_offset(content: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(content.len());
    let before = &content.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |p| p + 1);
    (line as u32, (offset - line_start + 1) as u32)
}

#[cfg(all(test, feature = "toml"))]
mod tests {
    use super::*;

    #[test]
    fn test_position_from_offset() {
        let content = "a = 1\nb = 2\nc = x";
        assert_eq!(position_from_offset(content, 0), (1, 1));
        assert_eq!(position_from_offset(content, 4), (1, 5));
        assert_eq!(position_from_offset(content, 6), (2, 1));
        assert_eq!(position_from_offset(content, 16), (3, 5));
        assert_eq!(position_from_offset(content, 999), (3, 6));
    }
}
