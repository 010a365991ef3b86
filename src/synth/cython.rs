use super::cc::{compile_command, quote, resolve_front_end};
use super::path::{file_stem, normalize_path, normalize_paths, split_file_name};
use super::types::{
    CompileOptions, CythonOptions, CythonPlan, Embed, Language, LanguageLevel, SynthError,
    Toolchain,
};

/// Build the Cython transpile command alone.
///
/// `source` and `intermediate` must already be normalized.
pub fn cython_command(
    toolchain: &Toolchain,
    opts: &CythonOptions,
    include_dirs: &[String],
    source: &str,
    intermediate: &str,
) -> String {
    let platform = toolchain.platform;
    let mut args = vec![toolchain.cython.clone()];

    for dir in include_dirs {
        args.push("-I".to_string());
        args.push(quote(dir, platform));
    }

    // Canonical switch order
    let switches: [(bool, &str); 5] = [
        (opts.timestamps, "-t"),
        (opts.force, "-f"),
        (opts.quiet, "-q"),
        (opts.verbose, "-v"),
        (opts.embed_positions, "-p"),
    ];
    args.extend(switches.iter().filter(|(on, _)| *on).map(|(_, f)| f.to_string()));

    if let Some(level) = opts.cleanup {
        args.push(format!("--cleanup {}", level));
    }

    let switches: [(bool, &str); 5] = [
        (opts.gdb, "--gdb"),
        (opts.no_docstrings, "-D"),
        (opts.annotate, "-a"),
        (opts.line_directives, "--line-directives"),
        (opts.cplus, "--cplus"),
    ];
    args.extend(switches.iter().filter(|(on, _)| *on).map(|(_, f)| f.to_string()));

    match &opts.embed {
        Embed::Off => {}
        Embed::Main => args.push("--embed".to_string()),
        Embed::Named(name) => args.push(format!("--embed={}", name)),
    }

    match opts.language_level {
        LanguageLevel::Default => {}
        LanguageLevel::Python2 => args.push("-2".to_string()),
        LanguageLevel::Python3 => args.push("-3".to_string()),
    }

    let switches: [(bool, &str); 3] = [
        (opts.fast_fail, "--fast-fail"),
        (opts.warning_errors, "--warning-errors"),
        (opts.warning_extra, "--warning-extra"),
    ];
    args.extend(switches.iter().filter(|(on, _)| *on).map(|(_, f)| f.to_string()));

    if !opts.directives.is_empty() {
        let directives: Vec<String> = opts
            .directives
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        args.push("-X".to_string());
        args.push(quote(&directives.join(","), platform));
    }

    args.push(quote(source, platform));
    args.push("-o".to_string());
    args.push(quote(intermediate, platform));

    args.join(" ")
}

/// Synthesize a transpile-then-compile chain for one `.pyx` module.
///
/// The generated C file lands next to the source; the artifact keeps the
/// directory of the requested output name and gets the platform's binary
/// extension when embedding an entry point, the shared-library extension
/// otherwise.
pub fn cython_chain(
    toolchain: &Toolchain,
    root: &str,
    opts: &CythonOptions,
) -> Result<CythonPlan, SynthError> {
    if opts.source.is_empty() {
        return Err(SynthError::MissingOption("source"));
    }

    let language = if opts.cplus { Language::Cxx } else { Language::C };
    // Fail before anything is assembled when there is no compiler
    resolve_front_end(toolchain, language)?;

    let platform = toolchain.platform;
    let source = normalize_path(&opts.source, root, platform);
    let include_dirs = normalize_paths(&opts.include_dirs, root, platform);

    let ext = if opts.cplus { "cpp" } else { "c" };
    let intermediate = format!("{}.{}", file_stem(&source), ext);
    let (source_dir, _) = split_file_name(&source);
    let intermediate_path = format!("{}{}", source_dir, intermediate);

    let output = match &opts.output {
        Some(name) if !name.is_empty() => normalize_path(name, root, platform),
        _ => format!("{}{}", source_dir, file_stem(&source)),
    };
    let (output_dir, _) = split_file_name(&output);
    let artifact_ext = if opts.embed.is_on() {
        platform.binary_ext()
    } else {
        platform.shared_ext()
    };
    let artifact = with_extension(file_stem(&output), artifact_ext);
    let artifact_path = format!("{}{}", output_dir, artifact);

    let python = &toolchain.python;
    let compile = CompileOptions {
        source: intermediate_path.clone(),
        output: artifact_path,
        includes: python.include.iter().cloned().collect(),
        libraries: python.lib.iter().cloned().collect(),
        library_dirs: python.lib_dir.iter().cloned().collect(),
        language,
        shared: !opts.embed.is_on(),
    };

    let steps = vec![
        cython_command(toolchain, opts, &include_dirs, &source, &intermediate_path),
        compile_command(toolchain, &compile)?,
    ];

    Ok(CythonPlan {
        intermediate,
        artifact,
        steps,
    })
}

fn with_extension(stem: &str, ext: &str) -> String {
    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, ext)
    }
}
