// Command-line interface for markview
//
// Renders user-authored markdown (directives, mentions, highlight markers, inline images)
// to HTML, JSON or a tree view, and exposes the intermediate stages for inspection.
//
// Usage:
//  markview <input> [--to <format>] [--output <file>]  - Render (default command)
//  markview render <input> [...]                        - Same as above (explicit)
//  markview inspect <path> [<transform>]                - Execute a transform
//  markview --list-transforms                           - List available transforms
//  markview --list-themes                               - List highlight themes
//
// Configuration:
//
// Defaults come from markview-config, then `markview.toml` in the working directory,
// then the file given with --config. Render flags override all of them.
//
// Logging goes to stderr and is controlled with RUST_LOG (default `markview=warn`).

use markview_cli::transforms::{self, TransformSettings};

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use markview_config::{Loader, MarkviewConfig, LOCAL_CONFIG_FILE};
use markview_core::highlight::SyntectHighlighter;
use markview_core::{DocumentView, FormatRegistry, ImageClassifier, ImageUrlPattern, RenderTree};
use std::fs;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

const SUBCOMMANDS: &[&str] = &["render", "inspect", "help"];

fn build_cli() -> Command {
    Command::new("markview")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render and inspect user-authored markdown")
        .long_about(
            "markview renders markdown written by users: headings with copyable anchors,\n\
            safe external links, inline images, :high[...] highlights, @mentions and\n\
            directives.\n\n\
            Commands:\n  \
            - render:  Render a markdown file (default command)\n  \
            - inspect: View intermediate representations\n\n\
            Examples:\n  \
            markview notes.md                          # Standalone HTML page on stdout\n  \
            markview notes.md --to treeviz             # Render tree visualization\n  \
            markview notes.md -o notes.html            # Format detected from the file name\n  \
            markview notes.md --nested --nofollow      # Rendering for embedded text\n  \
            markview inspect notes.md ast-treeviz      # Parsed document tree",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("list-themes")
                .long("list-themes")
                .help("List available code highlight themes")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a markview.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("render")
                .about("Render a markdown file (default command)")
                .long_about(
                    "Render a markdown file.\n\n\
                    Formats:\n  \
                    - html:    Standalone page with embedded CSS\n  \
                    - json:    Render tree as JSON\n  \
                    - treeviz: Render tree visualization\n\n\
                    Without --to the format is detected from --output, falling back to html.\n\
                    Output goes to stdout unless --output is given.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Output format (html, json, treeviz)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("top-level")
                        .long("top-level")
                        .help("Render as a top-level document (anchors, large images)")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("nested"),
                )
                .arg(
                    Arg::new("nested")
                        .long("nested")
                        .help("Render as embedded text (headings shifted down, small images)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-fragments")
                        .long("no-fragments")
                        .help("Omit heading ids and anchor links")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("nofollow")
                        .long("nofollow")
                        .help("Use rel=\"nofollow\" on external links")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("probe")
                        .long("probe")
                        .help("Ask the network whether links without an image extension are images")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("theme")
                        .long("theme")
                        .help("Code highlight theme (see --list-themes)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect intermediate representations of a markdown file")
                .long_about(
                    "View a markdown file at different processing stages.\n\n\
                    Transforms (stage-format):\n  \
                    - ast-json, ast-treeviz:     Parsed and transformed document tree\n  \
                    - urls:                      Distinct link targets\n  \
                    - classify-json:             Image classification by extension\n  \
                    - render-json, render-treeviz, render-html: Render tree\n\n\
                    The default transform comes from [inspect] default_transform.",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply (stage-format)")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "markview=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    // If the first argument is not a subcommand, treat it as a file and inject "render"
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            if args.len() > 1 && !args[1].starts_with('-') && !SUBCOMMANDS.contains(&args[1].as_str())
            {
                let mut new_args = vec![args[0].clone(), "render".to_string()];
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

    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return;
    }
    if matches.get_flag("list-themes") {
        handle_list_themes_command();
        return;
    }

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());

    match matches.subcommand() {
        Some(("render", sub_matches)) => {
            let config = load_cli_config(config_path, render_overrides(sub_matches));
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            let to = resolve_format(sub_matches.get_one::<String>("to"), output);
            handle_render_command(input, &to, output, &config);
        }
        Some(("inspect", sub_matches)) => {
            let config = load_cli_config(config_path, Vec::new());
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            let transform = sub_matches
                .get_one::<String>("transform")
                .cloned()
                .unwrap_or_else(|| config.inspect.default_transform.clone());
            handle_inspect_command(path, &transform, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Config keys set by render flags. Flags only ever switch a setting on.
fn render_overrides(matches: &ArgMatches) -> Vec<(&'static str, ConfigValue)> {
    let mut overrides = Vec::new();
    if matches.get_flag("top-level") {
        overrides.push(("render.top_level", ConfigValue::Bool(true)));
    }
    if matches.get_flag("nested") {
        overrides.push(("render.top_level", ConfigValue::Bool(false)));
    }
    if matches.get_flag("no-fragments") {
        overrides.push(("render.no_fragments", ConfigValue::Bool(true)));
    }
    if matches.get_flag("nofollow") {
        overrides.push(("render.nofollow", ConfigValue::Bool(true)));
    }
    if matches.get_flag("probe") {
        overrides.push(("images.probe", ConfigValue::Bool(true)));
    }
    if let Some(theme) = matches.get_one::<String>("theme") {
        overrides.push(("highlight.theme", ConfigValue::Text(theme.clone())));
    }
    overrides
}

enum ConfigValue {
    Bool(bool),
    Text(String),
}

fn load_cli_config(
    explicit_path: Option<&str>,
    overrides: Vec<(&'static str, ConfigValue)>,
) -> MarkviewConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    let mut loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    for (key, value) in overrides {
        let applied = match value {
            ConfigValue::Bool(flag) => loader.set_override(key, flag),
            ConfigValue::Text(text) => loader.set_override(key, text),
        };
        loader = applied.unwrap_or_else(|err| {
            eprintln!("Invalid setting for {key}: {err}");
            std::process::exit(1);
        });
    }

    let config = loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    });
    tracing::debug!(?config, "loaded configuration");
    config
}

/// `--to`, else the format matching the output file name, else html
fn resolve_format(explicit: Option<&String>, output: Option<&str>) -> String {
    if let Some(format) = explicit {
        return format.clone();
    }
    output
        .and_then(|path| FormatRegistry::default().detect_format_from_filename(path))
        .unwrap_or_else(|| "html".to_string())
}

fn read_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, transform: &str, config: &MarkviewConfig) {
    let source = read_source(path);
    let highlighter = SyntectHighlighter::new(&config.highlight.theme);
    let settings = TransformSettings {
        options: config.render_options(),
        pattern: ImageUrlPattern::from(&config.images),
        highlighter: &highlighter,
    };

    let output = transforms::execute_transform(&source, transform, &settings).unwrap_or_else(|e| {
        eprintln!("Execution error: {e}");
        std::process::exit(1);
    });

    print!("{output}");
}

/// Handle the render command
fn handle_render_command(input: &str, to: &str, output: Option<&str>, config: &MarkviewConfig) {
    let registry = FormatRegistry::default();
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = read_source(input);
    let highlighter = SyntectHighlighter::new(&config.highlight.theme);

    let tree = if config.images.probe {
        render_probed(&source, config, highlighter).unwrap_or_else(|e| {
            eprintln!("Render error: {e}");
            std::process::exit(1);
        })
    } else {
        let settings = TransformSettings {
            options: config.render_options(),
            pattern: ImageUrlPattern::from(&config.images),
            highlighter: &highlighter,
        };
        transforms::render_tree(&source, &settings)
    };

    let result = registry.serialize(&tree, to).unwrap_or_else(|e| {
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
        None => print!("{result}"),
    }
}

/// Render after every link target has been probed
fn render_probed(
    source: &str,
    config: &MarkviewConfig,
    highlighter: SyntectHighlighter,
) -> Result<RenderTree, String> {
    let probe = markview_core::classify::HttpImageProbe::new(config.images.probe_timeout())
        .map_err(|e| format!("could not build the probe client: {e}"))?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("could not start the async runtime: {e}"))?;

    runtime.block_on(async {
        let classifier =
            ImageClassifier::new(probe).with_pattern(ImageUrlPattern::from(&config.images));
        let mut view = DocumentView::new(classifier, config.render_options())
            .with_highlighter(Arc::new(highlighter));
        view.set_text(source).map_err(|e| e.to_string())?;
        tracing::debug!(in_flight = view.classifier().in_flight(), "probing links");
        view.settle().await;
        Ok::<_, String>(view.render())
    })
}

/// Handle the list-transforms command
fn handle_list_transforms_command() {
    println!("Available transforms:\n");
    println!("Stages:");
    println!("  ast       - Parsed document tree after the directive pass");
    println!("  urls      - Distinct link targets");
    println!("  classify  - Image classification of link targets");
    println!("  render    - Render tree\n");

    println!("Available transform combinations:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }

    println!("\nRender formats:");
    let registry = FormatRegistry::default();
    for format_name in registry.list_formats() {
        if let Ok(format) = registry.get(&format_name) {
            println!("  {format_name:<8} {}", format.description());
        }
    }
}

/// Handle the list-themes command
fn handle_list_themes_command() {
    for theme in SyntectHighlighter::theme_names() {
        println!("{theme}");
    }
}
