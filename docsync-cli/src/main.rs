// Command-line interface for docsync
//
// This binary exposes the docsync-core conversions and the sync engine to the shell.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected from the file extension, while being overwrittable by an explicit --from flag.
// Usage:
//  docsync <input> --to <format> [--from <format>] [--output <file>]           - Convert between formats (default)
//  docsync convert <input> --to <format> [--from <format>] [--output <file>]   - Same as above (explicit)
//  docsync validate <markup-file>                                              - Check markup against the supported vocabulary
//  docsync replay <initial-text> <script.json>                                 - Drive the sync engine through a scripted session
//  docsync --list-formats                                                      - List available formats
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix; known configuration keys (debounce-ms, auto-save,
// bullet-marker) override the loaded configuration, anything else is passed to the format.
// Example:
//  docsync resume.html --to text --extra-bullet-marker "*"
//
// Logging goes to stderr and is controlled by the DOCSYNC_LOG environment variable
// (tracing EnvFilter syntax, defaults to "warn").

mod replay;

use clap::{Arg, ArgAction, Command, ValueHint};
use docsync_config::{DocsyncConfig, Loader};
use docsync_core::formats::text::{BulletMarker, TextFormat, TextOptions};
use docsync_core::{validate_markup_compatibility, FormatRegistry};
use std::collections::HashMap;
use std::fs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "DOCSYNC_LOG";

/// Split `--extra-*` parameters out of the command line.
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Accepted forms:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            let has_value = i + 1 < args.len() && !args[i + 1].starts_with("--");

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("docsync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert structured documents and replay editing sessions")
        .long_about(
            "docsync works with structured documents made of headings, paragraphs,\n\
            bullet lists and bold text, in three representations: plain text,\n\
            editor markup (HTML) and the persisted JSON model.\n\n\
            Commands:\n  \
            - convert:  Transform between text, html and json (default command)\n  \
            - validate: Check editor markup against the supported vocabulary\n  \
            - replay:   Run a scripted editing session through the sync engine\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            docsync resume.txt --to html                # Render markup (stdout)\n  \
            docsync resume.html --to json -o doc.json   # Persisted form to a file\n  \
            docsync validate pasted.html                # Is this markup supported?\n  \
            docsync replay resume.txt session.json      # Print saved snapshots",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a docsync.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - text: Plain text with # headings and - bullets (.txt)\n  \
                    - html: Editor markup fragment (.html, .htm)\n  \
                    - json: Persisted document model (.json)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check editor markup against the supported vocabulary")
                .long_about(
                    "Prints 'compatible' when the markup only uses headings, paragraphs,\n\
                    lists, bold and line breaks. Otherwise prints the reason to stderr\n\
                    and exits with status 1.",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the markup file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Run a scripted editing session through the sync engine")
                .long_about(
                    "Creates a sync engine from the initial text and applies the steps of a\n\
                    JSON script on a simulated clock:\n\n  \
                    {\"html\": \"<p>...</p>\"}   markup edit from the widget\n  \
                    {\"json\": {...}}          whole-document replacement\n  \
                    {\"wait_ms\": 300}         advance time, firing a due save\n  \
                    {\"save\": true}           explicit save\n  \
                    {\"reset\": true}          back to the initial document\n\n\
                    Every persisted snapshot is printed to stdout as one JSON line.",
                )
                .arg(
                    Arg::new("initial")
                        .help("Plain text file with the initial document")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("script")
                        .help("JSON replay script")
                        .required(true)
                        .index(2)
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    // If no subcommand is given and the first argument looks like a file, inject "convert"
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !["convert", "validate", "replay", "help"].contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").expect("to is required");

            let registry = registry_from_config(&config);
            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => match registry.detect_format_from_filename(input) {
                    Some(detected) => detected,
                    None => {
                        eprintln!("Error: Could not detect format from filename '{input}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }
                },
            };

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&registry, input, &from, to, output, &extra_params);
        }
        Some(("validate", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            handle_validate_command(path);
        }
        Some(("replay", sub_matches)) => {
            let initial = sub_matches
                .get_one::<String>("initial")
                .expect("initial is required");
            let script = sub_matches
                .get_one::<String>("script")
                .expect("script is required");
            handle_replay_command(initial, script, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available formats:\n");
    for name in registry.list_formats() {
        if let Ok(format) = registry.get(&name) {
            let extensions = format.file_extensions().join(", ");
            println!("  {name:<6} {} ({extensions})", format.description());
        }
    }
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
) {
    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = read_file(input);

    let doc = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let result = registry
        .serialize_with_options(&doc, to, extra_params)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });

    match output {
        Some(path) => {
            fs::write(path, result).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => println!("{result}"),
    }
}

/// Handle the validate command
fn handle_validate_command(path: &str) {
    let markup = read_file(path);
    match validate_markup_compatibility(&markup) {
        Ok(()) => println!("compatible"),
        Err(reason) => {
            eprintln!("incompatible: {reason}");
            std::process::exit(1);
        }
    }
}

/// Handle the replay command
fn handle_replay_command(initial: &str, script: &str, config: &DocsyncConfig) {
    let initial_text = read_file(initial);
    let steps = replay::parse_script(&read_file(script)).unwrap_or_else(|e| {
        eprintln!("Error in '{script}': {e}");
        std::process::exit(1);
    });

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = replay::run(&initial_text, &steps, config.sync_options(), &mut out) {
        eprintln!("Replay error: {e}");
        std::process::exit(1);
    }
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn load_cli_config(explicit_path: Option<&str>) -> DocsyncConfig {
    let loader = Loader::new().with_optional_file("docsync.toml");
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

/// Default formats, with the text format following the configured options.
fn registry_from_config(config: &DocsyncConfig) -> FormatRegistry {
    let mut registry = FormatRegistry::default();
    registry.register(TextFormat::new(TextOptions::from(&config.text)));
    registry
}

fn apply_config_overrides(config: &mut DocsyncConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = take_override(extra_params, &["debounce-ms", "debounce"]) {
        config.sync.debounce_ms = raw.parse().unwrap_or_else(|_| {
            eprintln!("Invalid value '{raw}' for --extra-debounce-ms (expected milliseconds)");
            std::process::exit(1);
        });
    }
    if let Some(raw) = take_override(extra_params, &["auto-save", "autosave"]) {
        config.sync.auto_save = parse_bool_arg("auto-save", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["bullet-marker", "bullet"]) {
        config.text.bullet_marker = raw.parse::<BulletMarker>().unwrap_or_else(|e| {
            eprintln!("Invalid value for --extra-bullet-marker: {e}");
            std::process::exit(1);
        });
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}
