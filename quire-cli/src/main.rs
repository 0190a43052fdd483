// Command-line interface for quire
//
// This binary drives the legacy page migration: converting pages between formats, and migrating
// pages in a content directory to their canonical block documents.
//
// The core capabilities live in the quire-babel crate. This crate only wires arguments, config
// and logging to it.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected from the file extension,
// while being overwrittable by an explicit --from flag.
// Usage:
//  quire <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  quire convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  quire migrate <content_path>          - Migrate a stored page to content.json
//  quire load <content_path>             - Print a stored page and its format
//  quire cover <content_path> --url <url> [--position <n>] | --remove
//  quire --list-formats                  - List available formats
//
// Content paths are relative to the store root: --root, else store.root from the config.
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format.
// Example:
//  quire page.html --to html --extra-title "Intro to Git"

use clap::{Arg, ArgAction, ArgGroup, Command, ValueHint};
use quire_babel::formats::html::RenderOptions;
use quire_babel::ir::nodes::CoverImage;
use quire_babel::store::{FsStore, PageContent, PageStore, StoreLayout};
use quire_babel::{Format, FormatRegistry, StoreError};
use quire_config::{Loader, QuireConfig, PROJECT_CONFIG_FILE};
use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "migrate", "load", "cover", "help"];
const DEFAULT_COVER_POSITION: f64 = 50.0;

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));

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

fn content_path_arg() -> Arg {
    Arg::new("content_path")
        .help("Page directory, relative to the store root")
        .required(true)
        .index(1)
        .value_hint(ValueHint::DirPath)
}

fn build_cli() -> Command {
    Command::new("quire")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate legacy editor pages to structured block documents")
        .long_about(
            "quire converts pages written with the legacy rich-text editor into typed block\n\
            documents, and keeps a page directory's content.json up to date.\n\n\
            Commands:\n  \
            - convert: Transform a single file between formats (html, json, treeviz)\n  \
            - migrate: Write a stored page's content.json from its legacy index.html\n  \
            - load:    Print a stored page\n  \
            - cover:   Set or remove a stored page's cover image\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            quire page.html --to json                   # Migrate a page (outputs to stdout)\n  \
            quire page.html --to treeviz                # Inspect the migrated block tree\n  \
            quire content.json --to html -o page.html   # Render blocks back to HTML\n  \
            quire --root site migrate lessons/git       # Migrate site/lessons/git/index.html",
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
                .help("Path to a quire.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .help("Store root for page commands (overrides store.root)")
                .value_hint(ValueHint::DirPath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - html:    Legacy editor pages on input, rendered pages on output (.html)\n  \
                    - json:    Canonical block document (.json)\n  \
                    - treeviz: Tree view of the blocks (output only)\n\n\
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
            Command::new("migrate")
                .about("Migrate a stored page to its canonical block document")
                .long_about(
                    "Reads the page's content.json, or migrates its legacy index.html when there\n\
                    is none, and writes content.json back. Any cover image is kept. The legacy\n\
                    HTML file is never deleted.",
                )
                .arg(content_path_arg()),
        )
        .subcommand(
            Command::new("load")
                .about("Print a stored page and the format it is stored in")
                .arg(content_path_arg()),
        )
        .subcommand(
            Command::new("cover")
                .about("Set or remove a stored page's cover image")
                .arg(content_path_arg())
                .arg(
                    Arg::new("url")
                        .long("url")
                        .help("Cover image URL")
                        .value_hint(ValueHint::Url),
                )
                .arg(
                    Arg::new("position")
                        .long("position")
                        .help("Vertical focus of the cover image, in percent (default 50)")
                        .value_parser(clap::value_parser!(f64))
                        .requires("url"),
                )
                .arg(
                    Arg::new("remove")
                        .long("remove")
                        .help("Remove the cover image")
                        .action(ArgAction::SetTrue),
                )
                .group(
                    ArgGroup::new("change")
                        .args(["url", "remove"])
                        .required(true),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A leading file argument means the implicit convert command
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
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

    let config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        matches.get_one::<String>("root").map(|s| s.as_str()),
    );
    init_logging(&config);

    if matches.get_flag("list-formats") {
        handle_list_formats_command(&config);
        return;
    }

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").expect("to is required");

            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => {
                    let registry = registry_from_config(&config);
                    match registry.detect_format_from_filename(input) {
                        Some(detected) => detected,
                        None => {
                            eprintln!("Error: Could not detect format from filename '{input}'");
                            eprintln!("Please specify --from explicitly");
                            std::process::exit(1);
                        }
                    }
                }
            };

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output, &extra_params, &config);
        }
        Some(("migrate", sub_matches)) => {
            let content_path = content_path(sub_matches);
            handle_migrate_command(content_path, &config);
        }
        Some(("load", sub_matches)) => {
            let content_path = content_path(sub_matches);
            handle_load_command(content_path, &config);
        }
        Some(("cover", sub_matches)) => {
            let content_path = content_path(sub_matches);
            let cover = sub_matches.get_one::<String>("url").map(|url| {
                let position = sub_matches
                    .get_one::<f64>("position")
                    .copied()
                    .unwrap_or(DEFAULT_COVER_POSITION);
                CoverImage::new(url.as_str(), position)
            });
            handle_cover_command(content_path, cover, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn content_path(matches: &clap::ArgMatches) -> &str {
    matches
        .get_one::<String>("content_path")
        .expect("content_path is required")
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &QuireConfig,
) {
    let registry = registry_from_config(config);

    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    debug!(input, from, to, "converting");
    let result = registry
        .convert(&source, from, to, extra_params)
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });

    match output {
        Some(path) => {
            fs::write(path, result).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{result}"),
    }
}

/// Handle the migrate command
fn handle_migrate_command(content_path: &str, config: &QuireConfig) {
    let pages = page_store(config);
    let doc = run_store_task(pages.migrate_page(content_path));
    println!(
        "Wrote {} ({} blocks)",
        pages.layout().json_path(content_path),
        doc.blocks.len()
    );
}

/// Handle the load command
fn handle_load_command(content_path: &str, config: &QuireConfig) {
    let pages = page_store(config);
    let content = run_store_task(pages.load_page_content(content_path));

    println!("format: {}", content.format());
    match content {
        PageContent::None => {}
        PageContent::Html(html) => print!("{html}"),
        PageContent::Json(doc) => {
            let json = serde_json::to_string_pretty(&doc).unwrap_or_else(|e| {
                eprintln!("Serialization error: {e}");
                std::process::exit(1);
            });
            println!("{json}");
        }
    }
}

/// Handle the cover command
fn handle_cover_command(content_path: &str, cover: Option<CoverImage>, config: &QuireConfig) {
    let pages = page_store(config);
    let doc = run_store_task(pages.save_page_cover_image(content_path, cover));
    match &doc.cover_image {
        Some(cover) => println!("Cover set to {} at {}%", cover.url, cover.position),
        None => println!("Cover removed"),
    }
}

/// Handle the list-formats command
fn handle_list_formats_command(config: &QuireConfig) {
    let registry = registry_from_config(config);
    println!("Available formats:\n");
    for format_name in registry.list_formats() {
        if let Ok(format) = registry.get(&format_name) {
            let direction = match (format.supports_parsing(), format.supports_serialization()) {
                (true, true) => "in/out",
                (true, false) => "in",
                (false, true) => "out",
                (false, false) => "-",
            };
            println!("  {format_name:<10} {direction:<7} {}", format.description());
        }
    }
}

fn registry_from_config(config: &QuireConfig) -> FormatRegistry {
    let render = RenderOptions::default().with_cover(config.render.include_cover);
    FormatRegistry::with_options((&config.migrate).into(), render)
}

fn page_store(config: &QuireConfig) -> PageStore<FsStore> {
    let store = FsStore::new(config.store.root.clone());
    PageStore::with_layout(
        store,
        StoreLayout::from(&config.store),
        (&config.migrate).into(),
    )
}

fn run_store_task<T>(task: impl Future<Output = Result<T, StoreError>>) -> T {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to start runtime: {e}");
            std::process::exit(1);
        });

    runtime.block_on(task).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    })
}

fn load_cli_config(explicit_path: Option<&str>, root: Option<&str>) -> QuireConfig {
    let loader = Loader::new().with_optional_file(PROJECT_CONFIG_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    let mut config = loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    });

    if let Some(root) = root {
        config.store.root = PathBuf::from(root);
    }
    config
}

/// RUST_LOG wins over the configured level. Logs go to stderr so converted output stays clean.
fn init_logging(config: &QuireConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.level.as_str()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_extra_args_with_values_and_flags() {
        let (cleaned, extras) = parse_extra_args(&strings(&[
            "quire",
            "page.html",
            "--extra-title",
            "Intro",
            "--to",
            "html",
            "--extra-show-props",
        ]));
        assert_eq!(cleaned, strings(&["quire", "page.html", "--to", "html"]));
        assert_eq!(extras.get("title").map(String::as_str), Some("Intro"));
        assert_eq!(extras.get("show-props").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_cover_requires_url_or_remove() {
        let cli = build_cli();
        assert!(cli
            .clone()
            .try_get_matches_from(["quire", "cover", "p"])
            .is_err());
        assert!(cli
            .clone()
            .try_get_matches_from(["quire", "cover", "p", "--url", "u", "--remove"])
            .is_err());
        assert!(cli
            .try_get_matches_from(["quire", "cover", "p", "--remove"])
            .is_ok());
    }

    #[test]
    fn test_registry_uses_configured_migration() {
        let mut config = quire_config::load_defaults().expect("defaults to load");
        config.migrate.default_code_language = "python".to_string();
        let registry = registry_from_config(&config);
        let doc = registry
            .parse(
                r#"<body><div class="code-block"><pre><code>x = 1</code></pre></div></body>"#,
                "html",
            )
            .expect("html to parse");
        assert_eq!(
            doc.blocks,
            vec![quire_babel::Block::code_block("python", "x = 1")]
        );
    }
}
