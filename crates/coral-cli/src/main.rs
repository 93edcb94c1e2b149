use coral::{Edge, ForceOptions, Graph, Node, Point, Viewport};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Layout(coral::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<coral::Error> for CliError {
    fn from(value: coral::Error) -> Self {
        Self::Layout(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Inspect,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    width: f64,
    height: f64,
    iterations: Option<usize>,
    out: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphDoc {
    #[serde(default)]
    nodes: Vec<NodeDoc>,
    #[serde(default)]
    edges: Vec<EdgeDoc>,
}

#[derive(Debug, Deserialize)]
struct NodeDoc {
    id: String,
    #[serde(default)]
    relevance: f64,
}

#[derive(Debug, Deserialize)]
struct EdgeDoc {
    source: String,
    target: String,
    #[serde(default)]
    kind: String,
    #[serde(default = "default_weight")]
    weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Serialize)]
struct ViewportOut {
    width: f64,
    height: f64,
}

#[derive(Serialize, Clone, Copy)]
struct PointOut {
    x: f64,
    y: f64,
}

impl From<Point> for PointOut {
    fn from(value: Point) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Serialize)]
struct SegmentOut<'a> {
    source: &'a str,
    target: &'a str,
    kind: &'a str,
    weight: f64,
    from: PointOut,
    to: PointOut,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    viewport: ViewportOut,
    positions: IndexMap<&'a str, PointOut>,
    edges: Vec<SegmentOut<'a>>,
}

#[derive(Serialize)]
struct DanglingOut<'a> {
    source: &'a str,
    target: &'a str,
    missing: Vec<&'a str>,
}

#[derive(Serialize)]
struct InspectOut<'a> {
    nodes: usize,
    edges: usize,
    dangling: Vec<DanglingOut<'a>>,
}

fn usage() -> &'static str {
    "coral-cli\n\
\n\
USAGE:\n\
  coral-cli [layout] [--pretty] [--width <w>] [--height <h>] [--iterations <n>] [--out <path>] [<path>|-]\n\
  coral-cli inspect [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input is a JSON graph document: {\"nodes\": [{\"id\", \"relevance\"}], \"edges\": [{\"source\", \"target\", \"kind\", \"weight\"}]}.\n\
  - layout prints the viewport, one position per node, and resolved edge segments; dangling edges are omitted.\n\
  - inspect prints node/edge counts and dangling edge references without running the simulation.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Layout,
        width: 800.0,
        height: 500.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "inspect" => args.command = Command::Inspect,
            "--pretty" => args.pretty = true,
            "--width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.height = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--iterations" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.iterations = Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
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

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match out {
        None => {
            println!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn to_graph(doc: &GraphDoc) -> Graph {
    Graph {
        nodes: doc
            .nodes
            .iter()
            .map(|n| Node {
                id: n.id.clone(),
                relevance: n.relevance,
            })
            .collect(),
        edges: doc
            .edges
            .iter()
            .map(|e| Edge {
                source: e.source.clone(),
                target: e.target.clone(),
                kind: e.kind.clone(),
                weight: e.weight,
            })
            .collect(),
    }
}

fn run_layout(doc: &GraphDoc, args: &Args) -> Result<(), CliError> {
    let graph = to_graph(doc);
    let viewport = Viewport {
        width: args.width,
        height: args.height,
    };
    let mut opts = ForceOptions::default();
    if let Some(n) = args.iterations {
        opts.iterations = n;
    }
    let result = coral::layout(&graph, viewport, &opts)?;

    let mut positions: IndexMap<&str, PointOut> = IndexMap::with_capacity(result.positions.len());
    for (id, p) in &result.positions {
        positions.insert(id.as_str(), PointOut::from(*p));
    }

    let mut edges: Vec<SegmentOut<'_>> = Vec::new();
    for e in &doc.edges {
        let (Some(from), Some(to)) = (
            result.positions.get(e.source.as_str()),
            result.positions.get(e.target.as_str()),
        ) else {
            continue;
        };
        edges.push(SegmentOut {
            source: e.source.as_str(),
            target: e.target.as_str(),
            kind: e.kind.as_str(),
            weight: e.weight,
            from: PointOut::from(*from),
            to: PointOut::from(*to),
        });
    }

    let out = LayoutOut {
        viewport: ViewportOut {
            width: viewport.width,
            height: viewport.height,
        },
        positions,
        edges,
    };
    write_json(&out, args.pretty, args.out.as_deref())
}

fn run_inspect(doc: &GraphDoc, args: &Args) -> Result<(), CliError> {
    let graph = to_graph(doc);
    graph.validate()?;

    let ids: std::collections::BTreeSet<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
    let mut dangling: Vec<DanglingOut<'_>> = Vec::new();
    for e in &doc.edges {
        let mut missing: Vec<&str> = Vec::new();
        if !ids.contains(e.source.as_str()) {
            missing.push(e.source.as_str());
        }
        if !ids.contains(e.target.as_str()) {
            missing.push(e.target.as_str());
        }
        if !missing.is_empty() {
            dangling.push(DanglingOut {
                source: e.source.as_str(),
                target: e.target.as_str(),
                missing,
            });
        }
    }

    let out = InspectOut {
        nodes: doc.nodes.len(),
        edges: doc.edges.len(),
        dangling,
    };
    write_json(&out, args.pretty, args.out.as_deref())
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let doc: GraphDoc = serde_json::from_str(&text)?;
    match args.command {
        Command::Layout => run_layout(&doc, &args),
        Command::Inspect => run_inspect(&doc, &args),
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

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
