use framewalk::{
    Matrix, MatrixEntry, NodeId, Point, ResolveOptions, Resolver, SnapshotDocument,
};
use serde::Serialize;
use std::io::Read;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Resolve(framewalk::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Resolve(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<framewalk::Error> for CliError {
    fn from(value: framewalk::Error) -> Self {
        Self::Resolve(value)
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
    Resolve,
    Walk,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    target: Option<String>,
    container: Option<String>,
    root_container: Option<String>,
    config: Option<String>,
    target_info: bool,
    pretty: bool,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EntryOut<'a> {
    Target { node: &'a str, matrix: &'a Matrix },
    Offset { node: &'a str, matrix: &'a Matrix },
    SvgPendingOffset { node: &'a str, origin: Point },
}

#[derive(Serialize)]
struct WalkOut<'a> {
    entries: Vec<EntryOut<'a>>,
    root_entries: Vec<EntryOut<'a>>,
    is_3d: bool,
}

fn usage() -> &'static str {
    "framewalk-cli\n\
\n\
USAGE:\n\
  framewalk-cli [resolve] [--target <id>] [--container <id>] [--root-container <id>] [--config <path>] [--target-info] [--pretty] [<path>|-]\n\
  framewalk-cli walk --target <id> [--container <id>] [--root-container <id>] [--config <path>] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - <path> is a JSON document snapshot. If omitted or '-', it is read from stdin.\n\
  - resolve prints element info JSON; --target-info adds the pre-transform origin and client rects.\n\
  - walk prints the resolved chain entries, root-to-target.\n\
  - --config reads resolve options (force_3d, svg_offset, solver) from a JSON file.\n\
  - Set FRAMEWALK_LOG (e.g. FRAMEWALK_LOG=framewalk=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "resolve" => args.command = Command::Resolve,
            "walk" => args.command = Command::Walk,
            "--pretty" => args.pretty = true,
            "--target-info" => args.target_info = true,
            "--target" | "--container" | "--root-container" | "--config" => {
                let Some(value) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let slot = match a.as_str() {
                    "--target" => &mut args.target,
                    "--container" => &mut args.container,
                    "--root-container" => &mut args.root_container,
                    _ => &mut args.config,
                };
                *slot = Some(value.clone());
            }
            other if other.starts_with("--") => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Walk) && args.target.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn read_options(path: Option<&str>) -> Result<ResolveOptions, CliError> {
    match path {
        None => Ok(ResolveOptions::default()),
        Some(path) => Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn lookup(doc: &SnapshotDocument, id: Option<&str>) -> Result<Option<NodeId>, CliError> {
    id.map(|id| doc.resolve_id(id))
        .transpose()
        .map_err(CliError::from)
}

fn entries_out<'a>(doc: &'a SnapshotDocument, entries: &'a [MatrixEntry<NodeId>]) -> Vec<EntryOut<'a>> {
    entries
        .iter()
        .map(|entry| match entry {
            MatrixEntry::Target { node, matrix } => EntryOut::Target {
                node: doc.id(*node),
                matrix,
            },
            MatrixEntry::Offset { node, matrix } => EntryOut::Offset {
                node: doc.id(*node),
                matrix,
            },
            MatrixEntry::SvgPendingOffset { node, origin } => EntryOut::SvgPendingOffset {
                node: doc.id(*node),
                origin: *origin,
            },
        })
        .collect()
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("FRAMEWALK_LOG")
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let doc = SnapshotDocument::from_json(&text)?;
    let options = read_options(args.config.as_deref())?;

    let target = lookup(&doc, args.target.as_deref())?;
    let container = lookup(&doc, args.container.as_deref())?;
    let root_container = lookup(&doc, args.root_container.as_deref())?;
    tracing::debug!(?target, ?container, ?root_container, "resolving");

    let resolver = Resolver::new(&doc).with_options(options);
    match args.command {
        Command::Resolve if args.target_info => {
            let info = resolver.target_info(target, container, container, root_container)?;
            write_json(&info, args.pretty)
        }
        Command::Resolve => {
            let info = resolver.element_info(target, container, root_container)?;
            write_json(&info, args.pretty)
        }
        Command::Walk => {
            let Some(target) = target else {
                return Err(CliError::Usage(usage()));
            };
            let stack = resolver.matrix_stack(target, container, root_container)?;
            let out = WalkOut {
                entries: entries_out(&doc, &stack.entries),
                root_entries: entries_out(&doc, &stack.root_entries),
                is_3d: stack.result.is_3d,
            };
            write_json(&out, args.pretty)
        }
    }
}

fn main() {
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

    init_logging();

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
