//! Conversion of script option maps into synthesizer option sets.
//!
//! Project scripts pass object maps such as
//! `cython(#{ source: "foo.pyx", cplus: true, directives: #{ boundscheck: false } })`.
//! Every key is checked against the option it feeds and every value against
//! the shape that option expects; nothing is launched when one is wrong.

use crate::synth::{CompileOptions, CythonOptions, Embed, Language, LanguageLevel, SynthError};
use rhai::{Dynamic, Map};

fn invalid(field: &str, expected: &'static str) -> SynthError {
    SynthError::InvalidOptionType {
        field: field.to_string(),
        expected,
    }
}

fn string(field: &str, value: &Dynamic) -> Result<String, SynthError> {
    value
        .clone()
        .into_string()
        .map_err(|_| invalid(field, "a string"))
}

fn boolean(field: &str, value: &Dynamic) -> Result<bool, SynthError> {
    value.as_bool().map_err(|_| invalid(field, "a boolean"))
}

/// A list of strings; a single string is accepted as a one-element list.
fn string_list(field: &str, value: &Dynamic) -> Result<Vec<String>, SynthError> {
    const EXPECTED: &str = "a string or an array of strings";

    if value.is_string() {
        return Ok(vec![string(field, value)?]);
    }
    let array = value
        .clone()
        .into_array()
        .map_err(|_| invalid(field, EXPECTED))?;
    array
        .iter()
        .map(|item| item.clone().into_string().map_err(|_| invalid(field, EXPECTED)))
        .collect()
}

/// Directive values may be any scalar and are rendered as text.
fn scalar(field: &str, value: &Dynamic) -> Result<String, SynthError> {
    if value.is_string() {
        return string(field, value);
    }
    if let Ok(b) = value.as_bool() {
        // Cython spells booleans the Python way
        return Ok(if b { "True" } else { "False" }.to_string());
    }
    if value.is_int() || value.is_float() {
        return Ok(value.to_string());
    }
    Err(invalid(field, "a string, number or boolean"))
}

pub fn cython_options(map: &Map) -> Result<CythonOptions, SynthError> {
    let mut opts = CythonOptions::default();
    let mut source = None;

    for (key, value) in map {
        let key = key.as_str();
        match key {
            "source" => source = Some(string(key, value)?),
            "output" => opts.output = Some(string(key, value)?),
            "include_dirs" | "includes" => opts.include_dirs = string_list(key, value)?,
            "directives" => {
                let directives = value
                    .clone()
                    .try_cast::<Map>()
                    .ok_or_else(|| invalid(key, "an object map"))?;
                for (name, v) in &directives {
                    let field = format!("directives.{}", name);
                    opts.directives.insert(name.to_string(), scalar(&field, v)?);
                }
            }
            "timestamps" => opts.timestamps = boolean(key, value)?,
            "force" => opts.force = boolean(key, value)?,
            "quiet" => opts.quiet = boolean(key, value)?,
            "verbose" => opts.verbose = boolean(key, value)?,
            "embed_positions" => opts.embed_positions = boolean(key, value)?,
            "cleanup" => {
                opts.cleanup = if let Ok(on) = value.as_bool() {
                    on.then_some(1)
                } else {
                    let level = value
                        .as_int()
                        .ok()
                        .and_then(|n| u32::try_from(n).ok())
                        .ok_or_else(|| invalid(key, "a boolean or a non-negative integer"))?;
                    (level > 0).then_some(level)
                }
            }
            "gdb" => opts.gdb = boolean(key, value)?,
            "no_docstrings" => opts.no_docstrings = boolean(key, value)?,
            "annotate" => opts.annotate = boolean(key, value)?,
            "line_directives" => opts.line_directives = boolean(key, value)?,
            "cplus" => opts.cplus = boolean(key, value)?,
            "embed" => {
                opts.embed = if let Ok(on) = value.as_bool() {
                    if on { Embed::Main } else { Embed::Off }
                } else if value.is_string() {
                    Embed::Named(string(key, value)?)
                } else {
                    return Err(invalid(key, "a boolean or an entry point name"));
                }
            }
            "language_level" => {
                opts.language_level = match value.as_int() {
                    Ok(2) => LanguageLevel::Python2,
                    Ok(3) => LanguageLevel::Python3,
                    _ => return Err(invalid(key, "2 or 3")),
                }
            }
            "python2" => {
                if boolean(key, value)? {
                    opts.language_level = LanguageLevel::Python2;
                }
            }
            "python3" => {
                if boolean(key, value)? {
                    opts.language_level = LanguageLevel::Python3;
                }
            }
            "fast_fail" => opts.fast_fail = boolean(key, value)?,
            "warning_errors" => opts.warning_errors = boolean(key, value)?,
            "warning_extra" => opts.warning_extra = boolean(key, value)?,
            _ => return Err(SynthError::UnknownOption(key.to_string())),
        }
    }

    opts.source = source.ok_or(SynthError::MissingOption("source"))?;
    Ok(opts)
}

pub fn compile_options(map: &Map) -> Result<CompileOptions, SynthError> {
    let mut opts = CompileOptions::default();

    for (key, value) in map {
        let key = key.as_str();
        match key {
            "source" => opts.source = string(key, value)?,
            "output" => opts.output = string(key, value)?,
            "includes" => opts.includes = string_list(key, value)?,
            "libraries" => opts.libraries = string_list(key, value)?,
            "library_dirs" => opts.library_dirs = string_list(key, value)?,
            "language" => {
                let lang = string(key, value)?;
                opts.language = Language::parse(&lang).ok_or_else(|| invalid(key, "\"c\" or \"c++\""))?;
            }
            "shared" => opts.shared = boolean(key, value)?,
            _ => return Err(SynthError::UnknownOption(key.to_string())),
        }
    }

    if opts.source.is_empty() {
        return Err(SynthError::MissingOption("source"));
    }
    if opts.output.is_empty() {
        return Err(SynthError::MissingOption("output"));
    }
    Ok(opts)
}
