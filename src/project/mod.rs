//! Project scripts (`project.ph`).
//!
//! A project file is a rhai script. Its top-level statements declare
//! metadata (`project_name`, `project_version`, `project_options`, ...) and
//! it may define `fn run()`, which synthesizes and registers build chains.
//!
//! ```text
//! project_name("spam");
//! project_version(1, 0, 0);
//! project_options(#{ build: "Build the extension modules" });
//!
//! fn run() {
//!     if get_option("build") {
//!         cython(#{ source: "./src/spam.pyx", output: "spam" });
//!     }
//! }
//! ```

mod api;
mod meta;
mod options;

pub use api::{BuildApi, OptionValue, Session};
pub use meta::{ProjectMeta, Version};
pub use options::{compile_options, cython_options};

use rhai::{AST, CallFnOptions, Dynamic, Engine, Scope};
use std::path::{Path, PathBuf};

pub const DEFAULT_FILENAME: &str = "project.ph";

/// Error type for project loading
#[derive(Debug)]
pub enum ProjectError {
    /// The project file does not exist
    NotFound(PathBuf),
    /// The script failed to compile or raised an error
    Script { path: PathBuf, message: String },
    /// `project_version` got a part that is not a number
    InvalidVersion(String),
    /// `project_options` got something other than name -> description
    InvalidOptions(String),
    /// IO error
    Io(std::io::Error),
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::NotFound(path) => {
                write!(f, "Invalid project file was specified '{}'", path.display())
            }
            ProjectError::Script { path, message } => {
                write!(f, "Error inside the project file '{}': {}", path.display(), message)
            }
            ProjectError::InvalidVersion(parts) => {
                write!(f, "Invalid version number in call to project_version({})", parts)
            }
            ProjectError::InvalidOptions(msg) => write!(f, "Invalid project options: {}", msg),
            ProjectError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ProjectError {}

impl From<std::io::Error> for ProjectError {
    fn from(e: std::io::Error) -> Self {
        ProjectError::Io(e)
    }
}

/// Resolve the project file: the given path, or `project.ph` in the
/// current directory.
pub fn locate_project_file(given: Option<&str>) -> Result<PathBuf, ProjectError> {
    let path = PathBuf::from(given.unwrap_or(DEFAULT_FILENAME));
    if path.is_file() {
        Ok(path)
    } else {
        Err(ProjectError::NotFound(path))
    }
}

/// Absolute directory containing the project file.
pub fn project_root(project_file: &Path) -> Result<PathBuf, ProjectError> {
    let absolute = std::path::absolute(project_file)?;
    Ok(absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/")))
}

/// A loaded project script, ready to have its `run()` called.
pub struct Project {
    path: PathBuf,
    engine: Engine,
    ast: AST,
    scope: Scope<'static>,
    api: BuildApi,
}

impl Project {
    /// Compile the script and evaluate its top-level statements.
    pub fn load(path: &Path, api: BuildApi) -> Result<Self, ProjectError> {
        if !path.is_file() {
            return Err(ProjectError::NotFound(path.to_path_buf()));
        }

        let mut engine = Engine::new();
        api.install(&mut engine);

        let script_error = |e: Box<rhai::EvalAltResult>| ProjectError::Script {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let ast = engine
            .compile_file(path.to_path_buf())
            .map_err(script_error)?;
        let mut scope = Scope::new();
        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(script_error)?;

        Ok(Self {
            path: path.to_path_buf(),
            engine,
            ast,
            scope,
            api,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn api(&self) -> &BuildApi {
        &self.api
    }

    pub fn meta(&self) -> ProjectMeta {
        self.api.meta()
    }

    pub fn has_run(&self) -> bool {
        self.ast
            .iter_functions()
            .any(|f| f.name == "run" && f.params.is_empty())
    }

    /// Call the script's `run()` function.
    pub fn run(&mut self) -> Result<(), ProjectError> {
        if !self.has_run() {
            return Err(ProjectError::Script {
                path: self.path.clone(),
                message: "the project file defines no run() function".to_string(),
            });
        }

        let options = CallFnOptions::new().eval_ast(false);
        self.engine
            .call_fn_with_options::<Dynamic>(options, &mut self.scope, &self.ast, "run", ())
            .map(|_| ())
            .map_err(|e| ProjectError::Script {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }
}
