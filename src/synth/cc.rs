use super::types::{CompileOptions, Language, SynthError, Toolchain};
use crate::platform::{FrontEnd, Platform};

/// Quote an argument for the shell that runs the target's steps.
///
/// Arguments made only of path-safe characters pass through. Anything else
/// is single-quoted for `sh` (an embedded `'` becomes `'\''`) or
/// double-quoted for `cmd`.
pub(crate) fn quote(arg: &str, platform: Platform) -> String {
    let windows = platform.is_windows();
    let plain = |c: char| {
        c.is_ascii_alphanumeric()
            || "/._-+,=:@".contains(c)
            || (windows && c == '\\')
            || (!windows && c == '%')
    };
    if !arg.is_empty() && arg.chars().all(plain) {
        return arg.to_string();
    }

    if windows {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Resolve the compiler command and its flag syntax.
pub fn resolve_front_end(
    toolchain: &Toolchain,
    language: Language,
) -> Result<(String, FrontEnd), SynthError> {
    if let Some(cc) = &toolchain.cc {
        return Ok((
            cc.clone(),
            FrontEnd::GCC {
                cc: "cc",
                cxx: "c++",
            },
        ));
    }

    match toolchain.platform.front_end() {
        Some(front_end @ FrontEnd::GCC { cc, cxx }) => {
            let cmd = if language == Language::Cxx { cxx } else { cc };
            Ok((cmd.to_string(), front_end))
        }
        Some(FrontEnd::MSVC) => Ok(("cl".to_string(), FrontEnd::MSVC)),
        None => Err(SynthError::UnsupportedPlatform(toolchain.platform)),
    }
}

/// Build the compile-and-link command for one source file.
///
/// Includes, libraries and library directories keep the caller's order;
/// empty entries are skipped.
pub fn compile_command(toolchain: &Toolchain, opts: &CompileOptions) -> Result<String, SynthError> {
    if opts.source.is_empty() {
        return Err(SynthError::MissingOption("source"));
    }
    if opts.output.is_empty() {
        return Err(SynthError::MissingOption("output"));
    }

    let (compiler, front_end) = resolve_front_end(toolchain, opts.language)?;
    let platform = toolchain.platform;
    let non_empty = |v: &[String]| -> Vec<String> {
        v.iter()
            .filter(|s| !s.is_empty())
            .map(|s| quote(s, platform))
            .collect()
    };
    let includes = non_empty(&opts.includes);
    let libraries = non_empty(&opts.libraries);
    let library_dirs = non_empty(&opts.library_dirs);

    // The compiler is a configured command line and may carry its own flags
    let mut args = vec![compiler];

    if front_end.uses_msvc_flags() {
        args.push("/nologo".to_string());
        if opts.language == Language::Cxx {
            args.push("/EHsc".to_string());
        }
        args.push(quote(&opts.source, platform));
        args.push(format!("/Fe{}", quote(&opts.output, platform)));
        if opts.shared {
            args.push("/LD".to_string());
        }
        args.extend(includes.iter().map(|i| format!("/I{}", i)));
        if !libraries.is_empty() || !library_dirs.is_empty() {
            args.push("/link".to_string());
            args.extend(library_dirs.iter().map(|d| format!("/LIBPATH:{}", d)));
            args.extend(libraries.iter().map(|l| {
                if l.ends_with(".lib") {
                    l.clone()
                } else {
                    format!("{}.lib", l)
                }
            }));
        }
    } else {
        args.push(quote(&opts.source, platform));
        args.push("-o".to_string());
        args.push(quote(&opts.output, platform));
        if opts.shared {
            args.push("-shared".to_string());
            args.push("-fPIC".to_string());
        }
        args.extend(includes.iter().map(|i| format!("-I{}", i)));
        args.extend(libraries.iter().map(|l| format!("-l{}", l)));
        args.extend(library_dirs.iter().map(|d| format!("-L{}", d)));
    }

    Ok(args.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn opts() -> CompileOptions {
        CompileOptions {
            source: "foo.c".into(),
            output: "foo.so".into(),
            includes: vec!["/usr/include/python2.7/".into(), "".into()],
            libraries: vec!["python2.7".into(), "m".into()],
            library_dirs: vec!["/opt/lib".into()],
            language: Language::C,
            shared: true,
        }
    }

    #[test]
    fn test_gcc_layout() {
        let tc = Toolchain::new(Platform::Linux);
        assert_eq!(
            compile_command(&tc, &opts()).unwrap(),
            "gcc foo.c -o foo.so -shared -fPIC -I/usr/include/python2.7/ -lpython2.7 -lm -L/opt/lib"
        );
    }

    #[test]
    fn test_gcc_executable_cxx() {
        let tc = Toolchain::new(Platform::Linux);
        let o = CompileOptions {
            source: "main.cpp".into(),
            output: "app".into(),
            language: Language::Cxx,
            ..Default::default()
        };
        assert_eq!(compile_command(&tc, &o).unwrap(), "g++ main.cpp -o app");
    }

    #[test]
    fn test_msvc_layout() {
        let tc = Toolchain::new(Platform::Windows);
        let o = CompileOptions {
            source: "foo.c".into(),
            output: "foo.dll".into(),
            includes: vec!["C:\\Python27\\include".into()],
            libraries: vec!["python27".into()],
            library_dirs: vec!["C:\\Python27\\libs".into()],
            language: Language::C,
            shared: true,
        };
        assert_eq!(
            compile_command(&tc, &o).unwrap(),
            "cl /nologo foo.c /Fefoo.dll /LD /IC:\\Python27\\include /link /LIBPATH:C:\\Python27\\libs python27.lib"
        );
    }

    #[test]
    fn test_explicit_compiler_overrides_platform() {
        let mut tc = Toolchain::new(Platform::Other);
        assert_eq!(
            compile_command(&tc, &opts()),
            Err(SynthError::UnsupportedPlatform(Platform::Other))
        );

        tc.cc = Some("clang".into());
        assert!(compile_command(&tc, &opts()).unwrap().starts_with("clang foo.c -o foo.so"));
    }

    #[test]
    fn test_paths_with_spaces_are_quoted() {
        let tc = Toolchain::new(Platform::Linux);
        let o = CompileOptions {
            source: "/my proj/a.c".into(),
            output: "a".into(),
            ..Default::default()
        };
        assert_eq!(compile_command(&tc, &o).unwrap(), "gcc '/my proj/a.c' -o a");

        let tc = Toolchain::new(Platform::Windows);
        assert_eq!(
            compile_command(&tc, &o).unwrap(),
            "cl /nologo \"/my proj/a.c\" /Fea"
        );
    }

    #[test]
    fn test_quote_shell_metacharacters() {
        assert_eq!(quote("/tmp/it's/a", Platform::Linux), "'/tmp/it'\\''s/a'");
        assert_eq!(quote("/p/$HOME;x&y", Platform::Mac), "'/p/$HOME;x&y'");
        assert_eq!(quote("C:\\a b\\\"q\"", Platform::Windows), "\"C:\\a b\\\\\"q\\\"\"");
        assert_eq!(quote("C:\\proj\\a.c", Platform::Windows), "C:\\proj\\a.c");
    }

    #[test]
    fn test_explicit_compiler_keeps_its_arguments() {
        let mut tc = Toolchain::new(Platform::Linux);
        tc.cc = Some("ccache gcc".into());
        assert!(compile_command(&tc, &opts()).unwrap().starts_with("ccache gcc foo.c -o foo.so"));
    }

    #[cfg(unix)]
    #[test]
    fn test_awkward_paths_parse_in_sh() {
        let tc = Toolchain::new(Platform::Linux);
        let o = CompileOptions {
            source: "/tmp/proj(1)/a.c".into(),
            output: "/tmp/it's/a".into(),
            includes: vec!["/tmp/$dir; rm -rf x/inc".into(), "/tmp/\"q\" & b".into()],
            ..Default::default()
        };
        let command = compile_command(&tc, &o).unwrap();

        let status = std::process::Command::new("sh")
            .args(["-n", "-c", &command])
            .status()
            .unwrap();
        assert!(status.success(), "sh rejected: {}", command);

        // Each path comes back as one word, unchanged
        let output = std::process::Command::new("sh")
            .args(["-c", &format!("printf '%s\\n' {}", &command["gcc ".len()..])])
            .output()
            .unwrap();
        let words: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(String::from)
            .collect();
        assert_eq!(
            words,
            vec![
                "/tmp/proj(1)/a.c",
                "-o",
                "/tmp/it's/a",
                "-I/tmp/$dir; rm -rf x/inc",
                "-I/tmp/\"q\" & b",
            ]
        );
    }

    #[test]
    fn test_missing_source() {
        let tc = Toolchain::new(Platform::Linux);
        let o = CompileOptions {
            output: "a".into(),
            ..Default::default()
        };
        assert_eq!(
            compile_command(&tc, &o),
            Err(SynthError::MissingOption("source"))
        );
    }

    #[test]
    fn test_deterministic() {
        let tc = Toolchain::new(Platform::Mac);
        let first = compile_command(&tc, &opts()).unwrap();
        for _ in 0..10 {
            assert_eq!(compile_command(&tc, &opts()).unwrap(), first);
        }
    }
}
