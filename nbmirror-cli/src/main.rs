// Command-line interface for nbmirror
//
// This binary mirrors notebooks as plain text scripts and back. It is the only place in the
// toolchain that touches the disk: files are read here, handed to nbmirror-babel as strings
// and the results written back out.
//
// Converting:
//
// The conversion needs a source and a target. The source format and language are detected
// from the header, the cell markers or the file extension, and can be forced with --from and
// --language. The target is `ipynb`, a format id, or a mirror target in the `ext:format` form.
// Usage:
//  nbmirror <input> --to <target> [--from <format>] [--language <id>] [-o <file>]  - Convert (default)
//  nbmirror convert <input> --to <target> ...           - Same as above (explicit)
//  nbmirror detect <input> [--language <id>]            - Print the detected format and language
//  nbmirror normalize <input> [--from] [--language]     - Re-save in canonical form
//  nbmirror --list-formats                              - List available formats
//
// Logging goes to stderr and is controlled with NBMIRROR_LOG (default: warn).

mod ipynb;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use nbmirror_babel::pairing::{FormatTarget, AUTO_EXTENSION};
use nbmirror_babel::transforms;
use nbmirror_babel::{DetectHint, MarshalOptions, MirrorRegistry, Notebook};
use nbmirror_config::{Loader, MirrorConfig};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "NBMIRROR_LOG";
const SUBCOMMANDS: &[&str] = &["convert", "detect", "normalize", "help"];

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Input file path")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn from_arg() -> Arg {
    Arg::new("from")
        .long("from")
        .help("Source format (detected from the header or cell markers if not specified)")
        .value_hint(ValueHint::Other)
}

fn language_arg() -> Arg {
    Arg::new("language")
        .long("language")
        .help("Host language id or alias (detected from the header or extension if not specified)")
        .value_hint(ValueHint::Other)
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .help("Output file path (defaults to stdout)")
        .value_hint(ValueHint::FilePath)
}

fn build_cli() -> Command {
    Command::new("nbmirror")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mirror notebooks as plain text scripts and back")
        .long_about(
            "nbmirror converts notebooks to text scripts of their host language and back.\n\n\
            Commands:\n  \
            - convert:   Convert between ipynb and the text formats (default command)\n  \
            - detect:    Print the format and language of a text mirror\n  \
            - normalize: Re-save a file in canonical form\n\n\
            Examples:\n  \
            nbmirror Hello.ipynb --to java:percent       # Notebook to a percent script (stdout)\n  \
            nbmirror Hello.java --to ipynb -o Hello.ipynb # Script back to a notebook\n  \
            nbmirror Hello.java --to light               # Change the text format\n  \
            nbmirror detect Hello.java                   # Prints e.g. 'percent java'",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available text formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a nbmirror.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between ipynb and the text formats (default command)")
                .long_about(
                    "Convert a notebook or a text mirror.\n\n\
                    Targets:\n  \
                    - ipynb:        the notebook JSON\n  \
                    - <format>:     a text format id (see --list-formats)\n  \
                    - <ext>:<fmt>:  a mirror target, e.g. java:percent or py:light\n  \
                    - <ext>:        a mirror target in the configured default format\n\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(input_arg())
                .arg(from_arg())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target: ipynb, a format id, or ext:format")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(language_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("detect")
                .about("Print the detected format and language of a text mirror")
                .arg(input_arg())
                .arg(language_arg()),
        )
        .subcommand(
            Command::new("normalize")
                .about("Re-save a notebook or text mirror in canonical form")
                .long_about(
                    "Parse the input and write it back in its own format.\n\n\
                    Running normalize on its own output changes nothing.",
                )
                .arg(input_arg())
                .arg(from_arg())
                .arg(language_arg())
                .arg(output_arg()),
        )
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    // Try to parse args. If no subcommand is provided, inject "convert"
    let args: Vec<String> = std::env::args().collect();
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            if args.len() > 1 && !args[1].starts_with('-') && !SUBCOMMANDS.contains(&args[1].as_str())
            {
                let mut new_args = vec![args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let registry = config.registry().unwrap_or_else(|err| {
        eprintln!("Invalid configuration: {err}");
        std::process::exit(1);
    });

    if matches.get_flag("list-formats") {
        handle_list_formats_command(&registry);
        return;
    }

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            let source = read_source(&registry, &config, input, sub_matches);
            handle_convert_command(&registry, &config, source, to, output);
        }
        Some(("detect", sub_matches)) => {
            let input = required(sub_matches, "input");
            handle_detect_command(&registry, &config, input, sub_matches);
        }
        Some(("normalize", sub_matches)) => {
            let input = required(sub_matches, "input");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_normalize_command(&registry, &config, input, output, sub_matches);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    match matches.get_one::<String>(id) {
        Some(value) => value.as_str(),
        None => {
            eprintln!("Error: missing required argument '{id}'");
            std::process::exit(1);
        }
    }
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{context}: {err}");
    std::process::exit(1);
}

fn is_ipynb(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ipynb"))
}

/// A loaded input: notebook JSON, or a text mirror with its resolved format and language
enum Source {
    Notebook(Notebook),
    Text {
        content: String,
        format: String,
        language: String,
    },
}

impl Source {
    fn into_notebook(self, registry: &MirrorRegistry) -> Notebook {
        match self {
            Source::Notebook(notebook) => notebook,
            Source::Text {
                content,
                format,
                language,
            } => registry
                .parse(&content, &language, &format)
                .unwrap_or_else(|err| fail("Parse error", err)),
        }
    }
}

/// Resolve the format and language of a text input
fn resolve_text(
    registry: &MirrorRegistry,
    config: &MirrorConfig,
    input: &str,
    text: &str,
    from: Option<&str>,
    language: Option<&str>,
) -> (String, String) {
    let mut hint = DetectHint::from_filename(input);
    if let Some(language) = language {
        hint = hint.with_language(language);
    }
    let mut detected = registry
        .detect(text, &hint)
        .unwrap_or_else(|err| fail("Detection error", err));
    if detected.is_none() {
        if let Some(fallback) = config.detect.default_language() {
            debug!(language = fallback, "falling back to the configured default language");
            detected = registry
                .detect(text, &hint.with_language(fallback))
                .unwrap_or_else(|err| fail("Detection error", err));
        }
    }
    let Some(detected) = detected else {
        eprintln!("Error: Could not detect the language of '{input}'");
        eprintln!("Please specify --language explicitly");
        std::process::exit(1);
    };

    let format = from.map(str::to_string).unwrap_or(detected.format_id);
    (format, detected.language_id)
}

fn read_source(
    registry: &MirrorRegistry,
    config: &MirrorConfig,
    input: &str,
    matches: &ArgMatches,
) -> Source {
    let content = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });
    let from = matches.get_one::<String>("from").map(|s| s.as_str());

    if from == Some("ipynb") || (from.is_none() && is_ipynb(input)) {
        let notebook = ipynb::read_ipynb(&content).unwrap_or_else(|err| fail("Parse error", err));
        return Source::Notebook(notebook);
    }

    let language = matches.get_one::<String>("language").map(|s| s.as_str());
    let (format, language) = resolve_text(registry, config, input, &content, from, language);
    info!(%format, %language, input, "reading text mirror");
    Source::Text {
        content,
        format,
        language,
    }
}

fn write_output(output: Option<&str>, text: &str) {
    match output {
        Some(path) => fs::write(path, text).unwrap_or_else(|e| {
            eprintln!("Error writing file '{path}': {e}");
            std::process::exit(1);
        }),
        None => print!("{text}"),
    }
}

/// Where a conversion writes to
enum Target {
    Notebook,
    Text { format: String, extension: Option<String> },
}

fn parse_target(registry: &MirrorRegistry, config: &MirrorConfig, to: &str) -> Target {
    if registry.has_format(to) {
        return Target::Text {
            format: to.to_string(),
            extension: None,
        };
    }
    let target = FormatTarget::parse(to).unwrap_or_else(|err| fail("Error", err));
    target
        .validate(registry.languages(), |id| registry.has_format(id))
        .unwrap_or_else(|err| fail("Error", err));
    if target.is_notebook() {
        return Target::Notebook;
    }
    Target::Text {
        format: target
            .format
            .unwrap_or_else(|| config.marshal.default_format.clone()),
        extension: (target.extension != AUTO_EXTENSION).then_some(target.extension),
    }
}

fn handle_convert_command(
    registry: &MirrorRegistry,
    config: &MirrorConfig,
    source: Source,
    to: &str,
    output: Option<&str>,
) {
    let mut notebook = source.into_notebook(registry);
    let text = match parse_target(registry, config, to) {
        Target::Notebook => {
            ipynb::write_ipynb(&notebook).unwrap_or_else(|err| fail("Serialization error", err))
        }
        Target::Text { format, extension } => {
            // A notebook without a declared language takes the one of the target extension
            if notebook.declared_language().is_none() {
                if let Some(syntax) = extension
                    .as_deref()
                    .and_then(|ext| registry.languages().by_extension(ext))
                {
                    notebook = notebook.with_language(&syntax.id);
                }
            }
            info!(%format, cells = notebook.cells.len(), "writing text mirror");
            let options = MarshalOptions::from(&config.marshal);
            registry
                .marshal(&notebook, &format, &options)
                .unwrap_or_else(|err| fail("Serialization error", err))
        }
    };
    write_output(output, &text);
}

fn handle_detect_command(
    registry: &MirrorRegistry,
    config: &MirrorConfig,
    input: &str,
    matches: &ArgMatches,
) {
    let text = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });
    let language = matches.get_one::<String>("language").map(|s| s.as_str());
    let (format, language) = resolve_text(registry, config, input, &text, None, language);
    println!("{format} {language}");
}

fn handle_normalize_command(
    registry: &MirrorRegistry,
    config: &MirrorConfig,
    input: &str,
    output: Option<&str>,
    matches: &ArgMatches,
) {
    let text = match read_source(registry, config, input, matches) {
        Source::Text {
            content,
            format,
            language,
        } => {
            let options = MarshalOptions::from(&config.marshal);
            transforms::reformat(registry, &content, &language, &format, &options)
                .unwrap_or_else(|err| fail("Normalize error", err))
        }
        Source::Notebook(notebook) => ipynb::write_ipynb(&registry.normalize(&notebook))
            .unwrap_or_else(|err| fail("Serialization error", err)),
    };
    write_output(output, &text);
}

/// Handle the list-formats command
fn handle_list_formats_command(registry: &MirrorRegistry) {
    println!("Available formats:\n");
    for id in registry.list_formats() {
        if let Ok(format) = registry.format(&id) {
            println!("  {id:<10} {}", format.description);
        }
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> MirrorConfig {
    let loader = Loader::new().with_optional_file("nbmirror.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}
