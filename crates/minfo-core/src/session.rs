//! Session: one library handle, one open input, one result tree.
//!
//! The session owns its backend exclusively. The handle is released when
//! the backend is dropped, which happens on every exit path: explicit
//! [`Session::close`], a failed construction, or the session going out
//! of scope.

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "native")]
use crate::backend::NativeBackend;
use crate::backend::MediaBackend;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::lang::{self, LanguageTable};
use crate::models::ResultTree;
use crate::options;
use crate::policy::NormalizationPolicy;
use crate::schema::FieldSchema;

pub struct Session {
    backend: Box<dyn MediaBackend>,
    config: SessionConfig,
    schema: FieldSchema,
    policy: NormalizationPolicy,
    tree: ResultTree,
    current: Option<PathBuf>,
}

impl Session {
    /// Build a session over the native library.
    #[cfg(feature = "native")]
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_backend(Box::new(NativeBackend::open_default()?), config)
    }

    /// Build a session over any backend: apply the session toggles, load
    /// the field schema, then apply the language table.
    pub fn with_backend(mut backend: Box<dyn MediaBackend>, config: SessionConfig) -> Result<Self> {
        backend.option(options::COMPLETE, options::flag(config.complete))?;
        backend.option(
            options::PARSE_UNKNOWN_EXTENSIONS,
            options::flag(config.parse_unknown_extensions),
        )?;

        let schema = FieldSchema::load(backend.as_mut())?;

        let language = match &config.language {
            Some(text) => Some(Arc::new(LanguageTable::parse(text)?)),
            None => lang::default_language(),
        };
        if let Some(table) = language {
            backend.option(options::LANGUAGE, &table.to_option_value())?;
        }

        Ok(Self {
            backend,
            config,
            schema,
            policy: NormalizationPolicy::default(),
            tree: ResultTree::new(),
            current: None,
        })
    }

    /// Build a session and open `path` right away.
    pub fn load(
        backend: Box<dyn MediaBackend>,
        config: SessionConfig,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let mut session = Self::with_backend(backend, config)?;
        session.open(path)?;
        Ok(session)
    }

    /// Open an input and run a full extraction pass.
    ///
    /// The previous tree is discarded first, so a failed open leaves the
    /// session empty rather than describing the old input.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<&ResultTree> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidInput("empty path".into()));
        }
        if !path.exists() {
            return Err(Error::InvalidInput(format!("no such file: {}", path.display())));
        }

        self.tree = ResultTree::new();
        self.current = None;
        self.backend.close()?;

        if !self.backend.open(path)? {
            log::warn!("minfo: library rejected {}", path.display());
            return Err(Error::load_failure(path));
        }

        self.tree = extract(self.backend.as_ref(), &self.schema, &self.policy, &self.config)?;
        self.current = Some(path.to_path_buf());
        log::debug!("minfo: extracted {}", path.display());
        Ok(&self.tree)
    }

    /// Forward a translation table. With `apply_globally` it also becomes
    /// the default for sessions built later.
    pub fn set_language(&mut self, table: &LanguageTable, apply_globally: bool) -> Result<()> {
        self.backend.option(options::LANGUAGE, &table.to_option_value())?;
        if apply_globally {
            lang::set_default_language(Some(table.clone()));
        }
        Ok(())
    }

    /// The library's formatted report for the current input, honoring
    /// any template set through `ReportTemplate`.
    pub fn report_text(&self) -> Result<String> {
        if self.current.is_none() {
            return Err(Error::InvalidInput("no file loaded".into()));
        }
        self.backend.inform()
    }

    pub fn result_tree(&self) -> &ResultTree {
        &self.tree
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn version(&mut self) -> Result<String> {
        self.backend.option(options::VERSION, "")
    }

    /// Set a library option. `ReportTemplate` is an alias for `Inform`.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<String> {
        self.backend.option(options::resolve_alias(name), value)
    }

    /// Query a library option.
    ///
    /// Setter options are read through their `<name>_Get` twin: passing
    /// an empty value to the setter itself would reset it.
    pub fn option(&mut self, name: &str) -> Result<String> {
        self.backend
            .option(&options::getter(options::resolve_alias(name)), "")
    }

    /// Close the current input and release the handle.
    pub fn close(mut self) -> Result<()> {
        self.current = None;
        self.backend.close()
    }
}
