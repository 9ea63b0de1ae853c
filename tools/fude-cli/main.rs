use clap::Parser;
use fude::prelude::*;
use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the editor's diagram export and are only used here for conversion.

#[derive(Deserialize)]
struct RawDiagram {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    links: Vec<RawLink>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    coordinates: [f64; 2],
    #[serde(default)]
    inputs: Vec<RawPort>,
    #[serde(default)]
    outputs: Vec<RawPort>,
    #[serde(default)]
    data: Option<RawNodeData>,
    #[serde(default)]
    collapsed: Option<RawDiagram>,
}

#[derive(Deserialize)]
struct RawPort {
    id: String,
    #[serde(default)]
    alignment: Option<String>,
}

#[derive(Deserialize)]
struct RawNodeData {
    #[serde(default, alias = "nodeType")]
    op: Option<String>,
    #[serde(default)]
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct RawLink {
    input: String,
    output: String,
}

// --- Converter Implementation ---
// This implements the conversion from the raw JSON model to Fude's canonical Schema.

impl IntoSchema for RawDiagram {
    fn into_schema(self) -> std::result::Result<Schema, ConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|raw| {
                let mut node = Node::new(raw.id, raw.coordinates);
                node.inputs = convert_ports(raw.inputs)?;
                node.outputs = convert_ports(raw.outputs)?;
                if let Some(data) = raw.data {
                    node.data = NodeData {
                        op: data.op,
                        params: data.params,
                    };
                }
                node.collapsed = raw.collapsed.map(IntoSchema::into_schema).transpose()?;
                Ok(node)
            })
            .collect::<std::result::Result<Vec<_>, ConversionError>>()?;

        let links = self
            .links
            .into_iter()
            .map(|raw| Link {
                input: raw.input,
                output: raw.output,
            })
            .collect();

        Ok(Schema { nodes, links })
    }
}

fn convert_ports(raw: Vec<RawPort>) -> std::result::Result<Vec<Port>, ConversionError> {
    raw.into_iter()
        .map(|p| {
            let mut port = Port::new(p.id);
            port.alignment = match p.alignment.as_deref() {
                None => None,
                Some("left") => Some(PortAlignment::Left),
                Some("right") => Some(PortAlignment::Right),
                Some("top") => Some(PortAlignment::Top),
                Some("bottom") => Some(PortAlignment::Bottom),
                Some(other) => {
                    return Err(ConversionError::ValidationError(format!(
                        "unknown port alignment '{}'",
                        other
                    )))
                }
            };
            Ok(port)
        })
        .collect()
}

/// Stands in for the host application's renderers so diagrams can be
/// compiled and test-rendered without it. Emits a flat mid-grey image.
struct PlaceholderRenderer;

impl Renderer for PlaceholderRenderer {
    fn render(&self, sources: &[&Image]) -> std::result::Result<Image, RenderError> {
        let (width, height) = sources
            .first()
            .map(|s| (s.width(), s.height()))
            .unwrap_or((1, 1));
        Ok(Image::filled(width, height, [128, 128, 128, 255]))
    }
}

/// A brush diagram compiler and transform plan inspector CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the brush schema JSON file
    schema_path: Option<String>,

    /// Input port fed externally; repeatable, order assigns source slots
    #[arg(short, long = "external")]
    externals: Vec<String>,

    /// Compile without the plan optimiser
    #[arg(long)]
    no_optimise: bool,

    /// Render a test stroke using flat grey source images of this size
    #[arg(long)]
    test_render: Option<u32>,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.human {
        run_interactive();
    } else {
        run_non_interactive(cli);
    }
}

fn run_compilation(
    schema_path: String,
    externals: Vec<String>,
    optimise: bool,
    test_render: Option<u32>,
) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let load_start = Instant::now();
    let schema_json = fs::read_to_string(&schema_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read schema file '{}': {}",
            &schema_path, e
        ))
    });
    let load_duration = load_start.elapsed();

    // --- 2. Parsing and Conversion ---
    let raw_diagram: RawDiagram = serde_json::from_str(&schema_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse schema JSON: {}", e)));
    let schema = raw_diagram
        .into_schema()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert diagram: {}", e)));

    let mut ops = Vec::new();
    collect_ops(&schema, &mut ops);
    println!(
        "Loaded '{}': {} nodes, {} links, {} distinct operations",
        schema_path,
        schema.nodes.len(),
        schema.links.len(),
        ops.len()
    );

    // --- 3. Compilation ---
    println!("\nStarting Fude Brush Compilation...");
    let compile_start = Instant::now();
    let mut builder = Compiler::builder(schema).with_externals(externals);
    for op in &ops {
        builder = builder.with_renderer(op, Arc::new(PlaceholderRenderer));
    }
    if !optimise {
        builder = builder.without_optimisation();
    }

    let brush = builder
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("Compilation failed: {}", e)));
    let compile_duration = compile_start.elapsed();

    println!(
        "Compilation Successful! {} transforms over {} slots in {:?}",
        brush.plan.len(),
        brush.plan.slot_count(),
        compile_duration
    );

    // --- 4. Plan Inspection ---
    let name = schema_path
        .rsplit('/')
        .next()
        .and_then(|f| f.split('.').next())
        .unwrap_or("brush");
    println!("\n{}", visualize_plan(&brush.plan, name));

    // --- 5. Test Render (optional) ---
    let render_duration = test_render.map(|size| {
        println!("Running test render with {} flat grey source(s)...", brush.plan.source_count());
        let render_start = Instant::now();
        let sources: Vec<Image> = (0..brush.plan.source_count())
            .map(|_| Image::filled(size, size, [128, 128, 128, 255]))
            .collect();
        let result = brush
            .plan
            .execute(&sources)
            .unwrap_or_else(|e| exit_with_error(&format!("Test render failed: {}", e)));
        let render_duration = render_start.elapsed();
        println!("Test render produced {:?}", result);
        render_duration
    });

    // --- 6. Performance Summary ---
    let total_duration = total_start.elapsed();
    println!("\n--- Performance Summary ---");
    println!("File Loading:         {:?}", load_duration);
    println!("Compilation:          {:?}", compile_duration);
    if let Some(duration) = render_duration {
        println!("Test Render:          {:?}", duration);
    }
    println!("-----------------------------");
    println!("Total Execution:      {:?}", total_duration);
    println!("Optimiser:            {}", if optimise { "on" } else { "off" });
    println!();
}

/// Collects every distinct operation name, descending into collapsed nodes
/// because they compile through the same registry.
fn collect_ops(schema: &Schema, ops: &mut Vec<String>) {
    for node in &schema.nodes {
        if let Some(op) = &node.data.op {
            if !ops.contains(op) {
                ops.push(op.clone());
            }
        }
        if let Some(inner) = &node.collapsed {
            collect_ops(inner, ops);
        }
    }
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let schema_path = cli.schema_path.unwrap_or_else(|| {
        exit_with_error("Schema path is required in non-interactive mode.");
    });

    run_compilation(schema_path, cli.externals, !cli.no_optimise, cli.test_render);
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive() {
    println!("--- Fude Interactive Mode ---");

    let schema_path = ask_or("Brush schema path", "data/brush.json");
    let externals: Vec<String> = ask("External ports, comma-separated, blank for none")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let optimise = loop {
        match ask_or("Run the plan optimiser? (y/n)", "y").as_str() {
            "y" | "Y" => break true,
            "n" | "N" => break false,
            _ => println!("Invalid choice. Please enter y or n."),
        }
    };

    let test_render = match ask("Test render size in pixels, blank to skip") {
        Some(raw) => match raw.parse() {
            Ok(size) => Some(size),
            Err(_) => exit_with_error(&format!("Invalid render size '{}'", raw)),
        },
        None => None,
    };

    run_compilation(schema_path, externals, optimise, test_render);
}

/// Prints a prompt and reads one line from stdin; empty input yields `None`.
fn ask(question: &str) -> Option<String> {
    print!("{}: ", question);
    io::stdout().flush().expect("stdout closed");

    let mut line = String::new();
    io::stdin().read_line(&mut line).expect("stdin closed");
    let answer = line.trim();
    (!answer.is_empty()).then(|| answer.to_string())
}

/// Like `ask`, but falls back to a default shown in brackets.
fn ask_or(question: &str, fallback: &str) -> String {
    ask(&format!("{} [{}]", question, fallback)).unwrap_or_else(|| fallback.to_string())
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
