use lanegraph::svg::{SvgRenderOptions, render_svg};
use lanegraph::{CommitHistory, RenderConfig, RenderOutput, layout_history};
use serde::Serialize;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Graph(lanegraph::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Graph(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<lanegraph::Error> for CliError {
    fn from(value: lanegraph::Error) -> Self {
        Self::Graph(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Render,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    pretty: bool,
    lenient: bool,
    diagram_id: Option<String>,
    background: Option<String>,
    out: Option<String>,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    commits: usize,
    config: &'a RenderConfig,
    layout: &'a RenderOutput,
}

fn usage() -> &'static str {
    "lanegraph-cli\n\
\n\
USAGE:\n\
  lanegraph-cli [layout] [--pretty] [--config <path>] [--lenient] [<path>|-]\n\
  lanegraph-cli render [--config <path>] [--lenient] [--id <diagram-id>] [--background <css-color>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the history JSON is read from stdin.\n\
  - --config reads an effective-config JSON object; keys live under `graph`.\n\
    graph.circleRadius, graph.columnWidth and graph.rowHeight are required there;\n\
    without --config the built-in defaults (4/16/24) are used.\n\
  - --lenient skips child references that are not part of the history instead of failing.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - Set RUST_LOG=lanegraph=debug for render diagnostics, LANEGRAPH_RENDER_TIMING=1 for timings.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--lenient" => args.lenient = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(id.clone());
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.background = Some(bg.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "-" => args.input = None,
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => args.input = Some(path.to_string()),
        }
    }

    Ok(args)
}

fn read_input(path: Option<&str>) -> Result<String, CliError> {
    match path {
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(p) => Ok(std::fs::read_to_string(p)?),
    }
}

fn load_config(args: &Args) -> Result<RenderConfig, CliError> {
    let config = match args.config.as_deref() {
        None => RenderConfig::default(),
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            RenderConfig::from_json(&value)?
        }
    };
    Ok(if args.lenient {
        config.with_strict_topology(false)
    } else {
        config
    })
}

fn write_output(out: Option<&str>, text: &str) -> Result<(), CliError> {
    match out {
        None => {
            println!("{text}");
            Ok(())
        }
        Some(path) => Ok(std::fs::write(path, text)?),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    tracing::debug!(
        command = ?args.command,
        config_source = args.config.as_deref().unwrap_or("<defaults>"),
        input = args.input.as_deref().unwrap_or("<stdin>"),
        ?config,
        "loaded render config"
    );
    let text = read_input(args.input.as_deref())?;
    let history: CommitHistory = serde_json::from_str(&text)?;
    let layout = layout_history(&history, &config)?;
    tracing::debug!(
        commits = history.commits.len(),
        paths = layout.paths.len(),
        "laid out history"
    );

    match args.command {
        Command::Layout => {
            let out = LayoutOut {
                commits: history.commits.len(),
                config: &config,
                layout: &layout,
            };
            let json = if args.pretty {
                serde_json::to_string_pretty(&out)?
            } else {
                serde_json::to_string(&out)?
            };
            write_output(args.out.as_deref(), &json)
        }
        Command::Render => {
            let svg = render_svg(
                &layout,
                &SvgRenderOptions {
                    diagram_id: args.diagram_id.clone(),
                    background: args.background.clone(),
                },
            );
            write_output(args.out.as_deref(), &svg)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
