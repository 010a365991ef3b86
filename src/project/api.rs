//! Build primitives handed to the project script.
//!
//! [`BuildApi`] is the only door between a script and the build: it owns the
//! session state (options, metadata, toolchain, scheduler) and is installed
//! into the script engine explicitly with [`BuildApi::install`].

use super::ProjectError;
use super::meta::{ProjectMeta, Version};
use super::options::{compile_options, cython_options};
use crate::files;
use crate::platform::Platform;
use crate::scheduler::{ChainReport, Observer, Scheduler, Summary};
use crate::synth::{
    CompileOptions, CythonOptions, SynthError, Toolchain, compile_command, cython_chain,
    normalize_path, normalize_paths,
};
use crate::ui;
use rhai::{Array, Dynamic, Engine, EvalAltResult, INT, Map};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A command-line option value after `on`/`off` coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag(bool),
    Text(String),
}

impl OptionValue {
    pub fn coerce(value: &str) -> Self {
        match value {
            "on" => OptionValue::Flag(true),
            "off" => OptionValue::Flag(false),
            _ => OptionValue::Text(value.to_string()),
        }
    }

    fn into_dynamic(self) -> Dynamic {
        match self {
            OptionValue::Flag(b) => Dynamic::from(b),
            OptionValue::Text(s) => Dynamic::from(s),
        }
    }
}

/// Mutable state of one `ph` invocation.
pub struct Session {
    pub toolchain: Toolchain,
    /// Absolute project directory, anchor for relative paths
    pub root: String,
    pub options: BTreeMap<String, String>,
    pub meta: ProjectMeta,
    pub scheduler: Scheduler,
    pub observer: Box<dyn Observer>,
}

impl Session {
    pub fn new(toolchain: Toolchain, root: impl Into<String>, scheduler: Scheduler) -> Self {
        Self {
            toolchain,
            root: root.into(),
            options: BTreeMap::new(),
            meta: ProjectMeta::default(),
            scheduler,
            observer: Box::new(crate::scheduler::Silent),
        }
    }

    pub fn with_options(mut self, options: BTreeMap<String, String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }
}

fn script_err(e: impl std::fmt::Display) -> Box<EvalAltResult> {
    e.to_string().into()
}

#[derive(Clone)]
pub struct BuildApi {
    session: Rc<RefCell<Session>>,
}

impl BuildApi {
    pub fn new(session: Session) -> Self {
        Self {
            session: Rc::new(RefCell::new(session)),
        }
    }

    // --- Options ---

    pub fn get_option(&self, name: &str) -> Option<OptionValue> {
        self.session
            .borrow()
            .options
            .get(name)
            .map(|v| OptionValue::coerce(v))
    }

    pub fn set_option(&self, name: &str, value: &str) {
        self.session
            .borrow_mut()
            .options
            .insert(name.to_string(), value.to_string());
    }

    pub fn options(&self) -> BTreeMap<String, String> {
        self.session.borrow().options.clone()
    }

    // --- Metadata ---

    pub fn meta(&self) -> ProjectMeta {
        self.session.borrow().meta.clone()
    }

    /// One argument is free text; several must each be an integer.
    pub fn set_version(&self, parts: &[Dynamic]) -> Result<(), ProjectError> {
        let version = match parts {
            [single] => Version::Text(single.to_string()),
            _ => Version::Parts(
                parts
                    .iter()
                    .map(|p| {
                        p.as_int().ok().or_else(|| {
                            p.clone()
                                .into_string()
                                .ok()
                                .and_then(|s| s.trim().parse::<INT>().ok())
                        })
                    })
                    .map(|n| n.ok_or_else(|| ProjectError::InvalidVersion(version_text(parts))))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };
        self.session.borrow_mut().meta.version = Some(version);
        Ok(())
    }

    pub fn set_declared_options(&self, options: &Map) -> Result<(), ProjectError> {
        let mut declared = BTreeMap::new();
        for (name, description) in options {
            let description = description.clone().into_string().map_err(|_| {
                ProjectError::InvalidOptions(format!(
                    "description of option '{}' must be a string",
                    name
                ))
            })?;
            declared.insert(name.to_string(), description);
        }
        self.session.borrow_mut().meta.options = declared;
        Ok(())
    }

    // --- Chains ---

    /// Synthesize and register a Cython chain. Returns whether it was new.
    pub fn cython(&self, opts: &CythonOptions) -> Result<bool, SynthError> {
        let mut session = self.session.borrow_mut();
        let plan = cython_chain(&session.toolchain, &session.root, opts)?;
        Ok(session.scheduler.register(plan.steps))
    }

    /// Synthesize and register a one-step compile chain.
    pub fn compile(&self, opts: &CompileOptions) -> Result<bool, SynthError> {
        let mut session = self.session.borrow_mut();
        let platform = session.toolchain.platform;
        let root = session.root.clone();
        let opts = CompileOptions {
            source: normalize_path(&opts.source, &root, platform),
            output: normalize_path(&opts.output, &root, platform),
            includes: normalize_paths(&opts.includes, &root, platform),
            library_dirs: normalize_paths(&opts.library_dirs, &root, platform),
            ..opts.clone()
        };
        let command = compile_command(&session.toolchain, &opts)?;
        Ok(session.scheduler.register(vec![command]))
    }

    pub fn chain(&self, commands: Vec<String>) -> bool {
        self.session.borrow_mut().scheduler.register(commands)
    }

    /// Run every registered chain that is not done yet.
    pub fn dispatch(&self) -> Summary {
        let mut guard = self.session.borrow_mut();
        let session = &mut *guard;
        session.scheduler.run_all(session.observer.as_mut())
    }

    pub fn reports(&self) -> Vec<ChainReport> {
        self.session.borrow().scheduler.reports()
    }

    // --- Files & platform ---

    /// Delete paths matching a glob, relative patterns anchored at the root.
    pub fn delete(&self, pattern: &str) -> anyhow::Result<usize> {
        let root = self.session.borrow().root.clone();
        files::delete(&normalize_path(pattern, &root, Platform::detect()))
    }

    pub fn platform(&self) -> Platform {
        self.session.borrow().toolchain.platform
    }

    /// Register every build primitive on `engine`.
    pub fn install(&self, engine: &mut Engine) {
        engine.on_print(|msg| ui::log(msg));

        let api = self.clone();
        engine.register_fn("project_name", move |name: &str| {
            api.session.borrow_mut().meta.name = Some(name.to_string());
        });
        let api = self.clone();
        engine.register_fn("project_description", move |text: &str| {
            api.session.borrow_mut().meta.description = Some(text.to_string());
        });
        let api = self.clone();
        engine.register_fn("project_link", move |link: &str| {
            api.session.borrow_mut().meta.link = Some(link.to_string());
        });
        let api = self.clone();
        engine.register_fn("project_options", move |options: Map| {
            api.set_declared_options(&options).map_err(script_err)
        });

        let api = self.clone();
        engine.register_fn("project_version", move |v: Dynamic| {
            api.set_version(&[v]).map_err(script_err)
        });
        let api = self.clone();
        engine.register_fn("project_version", move |a: Dynamic, b: Dynamic| {
            api.set_version(&[a, b]).map_err(script_err)
        });
        let api = self.clone();
        engine.register_fn(
            "project_version",
            move |a: Dynamic, b: Dynamic, c: Dynamic| api.set_version(&[a, b, c]).map_err(script_err),
        );
        let api = self.clone();
        engine.register_fn(
            "project_version",
            move |a: Dynamic, b: Dynamic, c: Dynamic, d: Dynamic| {
                api.set_version(&[a, b, c, d]).map_err(script_err)
            },
        );

        let api = self.clone();
        engine.register_fn("get_option", move |name: &str| {
            api.get_option(name)
                .unwrap_or(OptionValue::Flag(false))
                .into_dynamic()
        });
        let api = self.clone();
        engine.register_fn("get_option", move |name: &str, default: Dynamic| {
            match api.get_option(name) {
                Some(value) => value.into_dynamic(),
                None if default.is_string() => OptionValue::coerce(&default.to_string()).into_dynamic(),
                None => default,
            }
        });
        let api = self.clone();
        engine.register_fn("set_option", move |name: &str, value: Dynamic| {
            let text = match value.as_bool() {
                Ok(true) => "on".to_string(),
                Ok(false) => "off".to_string(),
                Err(_) => value.to_string(),
            };
            api.set_option(name, &text);
        });

        let api = self.clone();
        engine.register_fn("cython", move |options: Map| {
            let opts = cython_options(&options).map_err(script_err)?;
            api.cython(&opts).map_err(script_err)
        });
        let api = self.clone();
        engine.register_fn("cython", move |source: &str| {
            api.cython(&CythonOptions::new(source)).map_err(script_err)
        });
        let api = self.clone();
        engine.register_fn("compile", move |options: Map| {
            let opts = compile_options(&options).map_err(script_err)?;
            api.compile(&opts).map_err(script_err)
        });
        let api = self.clone();
        engine.register_fn("chain", move |commands: Array| {
            let commands = commands
                .into_iter()
                .enumerate()
                .map(|(i, c)| {
                    c.into_string().map_err(|_| {
                        script_err(SynthError::InvalidOptionType {
                            field: format!("chain[{}]", i),
                            expected: "a string",
                        })
                    })
                })
                .collect::<Result<Vec<String>, _>>()?;
            Ok::<_, Box<EvalAltResult>>(api.chain(commands))
        });
        let api = self.clone();
        engine.register_fn("dispatch", move || api.dispatch().success());

        let api = self.clone();
        engine.register_fn("delete", move |pattern: &str| {
            api.delete(pattern)
                .map(|n| n as INT)
                .map_err(|e| script_err(format!("{:#}", e)))
        });

        let api = self.clone();
        engine.register_fn("platform_name", move || api.platform().name().to_string());
        let api = self.clone();
        engine.register_fn("platform_binary_extension", move || {
            api.platform().binary_ext().to_string()
        });
        let api = self.clone();
        engine.register_fn("platform_library_extension", move || {
            api.platform().shared_ext().to_string()
        });

        engine.register_fn("log", |msg: Dynamic| ui::log(&msg.to_string()));
        engine.register_fn("log", || ui::log(""));
    }
}

fn version_text(parts: &[Dynamic]) -> String {
    parts
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
