use clap::Parser;
use fude::prelude::*;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::fs;

/// A CLI tool to generate random brush schemas for the Fude compiler
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_brush.json")]
    output: String,

    /// The number of layers between the sources and the final merge
    #[arg(long, default_value_t = 3)]
    layers: usize,

    /// The number of nodes per layer
    #[arg(long, default_value_t = 3)]
    width: usize,

    /// Seed for reproducible output; omit for a random schema
    #[arg(long)]
    seed: Option<u64>,
}

const SOURCE_OPS: [&str; 3] = ["noise", "gradient", "speckle"];
const FILTER_OPS: [&str; 4] = ["blur", "sharpen", "tint", "smudge"];
const BLEND_OPS: [&str; 4] = ["multiply", "screen", "overlay", "grain-merge"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.layers == 0 || cli.width == 0 {
        eprintln!(
            "Error: --layers ({}) and --width ({}) must both be at least 1",
            cli.layers, cli.width
        );
        std::process::exit(1);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    println!(
        "Generating brush schema ({} layers of {} nodes)...",
        cli.layers, cli.width
    );

    let schema = generate_schema(&mut rng, cli.layers, cli.width);
    let json_output = serde_json::to_string_pretty(&schema)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved a schema with {} nodes and {} links to '{}'",
        schema.nodes.len(),
        schema.links.len(),
        cli.output
    );

    Ok(())
}

/// Builds a layered diagram: a row of source nodes, `layers` rows of filter
/// and blend nodes wired to the row above, and one final merge node. Nodes
/// that end up unconsumed are left in place; the plan optimiser prunes them.
fn generate_schema(rng: &mut StdRng, layers: usize, width: usize) -> Schema {
    let mut ids = IdAllocator::new();
    let mut nodes = Vec::new();
    let mut links = Vec::new();

    let mut previous: Vec<(String, String)> = (0..width)
        .map(|i| {
            let node = source_node(rng, &mut ids, i);
            let pair = (node.id.clone(), node.outputs[0].id.clone());
            nodes.push(node);
            pair
        })
        .collect();
    println!("-> Generated {} source node(s).", width);

    for layer in 1..=layers {
        let current: Vec<(String, String)> = (0..width)
            .map(|i| {
                let node = layered_node(rng, &mut ids, &mut links, &previous, layer, i);
                let pair = (node.id.clone(), node.outputs[0].id.clone());
                nodes.push(node);
                pair
            })
            .collect();
        println!("-> Generated layer {} with {} node(s).", layer, width);
        previous = current;
    }

    let merge = merge_node(rng, &mut ids, &mut links, &previous, layers + 1);
    nodes.push(merge);
    println!("-> Generated final merge node.");

    Schema::new(nodes, links)
}

fn source_node(rng: &mut StdRng, ids: &mut IdAllocator, index: usize) -> Node {
    let op = SOURCE_OPS.choose(rng).copied().unwrap_or("noise");
    let mut node = Node::new(ids.node_id(), position(0, index));
    node.outputs = vec![output_port(ids)];
    node.data = NodeData {
        op: Some(op.to_string()),
        params: serde_json::json!({ "seed": rng.random_range(0..u32::MAX) }),
    };
    node
}

fn layered_node(
    rng: &mut StdRng,
    ids: &mut IdAllocator,
    links: &mut Vec<Link>,
    previous: &[(String, String)],
    layer: usize,
    index: usize,
) -> Node {
    let max_fan_in = previous.len().min(2);
    let fan_in = rng.random_range(1..=max_fan_in);
    let op = if fan_in == 1 {
        FILTER_OPS.choose(rng).copied().unwrap_or("blur")
    } else {
        BLEND_OPS.choose(rng).copied().unwrap_or("multiply")
    };

    let mut node = Node::new(ids.node_id(), position(layer, index));
    for _ in 0..fan_in {
        let port = input_port(ids);
        // every input port gets exactly one feed, so the plan always lowers
        let (_, producer_port) = previous.choose(rng).cloned().unwrap_or_default();
        links.push(Link::new(producer_port, port.id.clone()));
        node.inputs.push(port);
    }
    node.outputs = vec![output_port(ids)];
    node.data = NodeData {
        op: Some(op.to_string()),
        params: serde_json::json!({ "strength": rng.random_range(0.0..1.0) }),
    };
    node
}

fn merge_node(
    rng: &mut StdRng,
    ids: &mut IdAllocator,
    links: &mut Vec<Link>,
    previous: &[(String, String)],
    layer: usize,
) -> Node {
    let op = BLEND_OPS.choose(rng).copied().unwrap_or("overlay");
    let mut node = Node::new(ids.node_id(), position(layer, 0));
    for (_, producer_port) in previous {
        let port = input_port(ids);
        links.push(Link::new(producer_port.clone(), port.id.clone()));
        node.inputs.push(port);
    }
    node.outputs = vec![output_port(ids)];
    node.data = NodeData::with_op(op);
    node
}

fn input_port(ids: &mut IdAllocator) -> Port {
    let mut port = Port::new(ids.port_id());
    port.alignment = Some(PortAlignment::Left);
    port
}

fn output_port(ids: &mut IdAllocator) -> Port {
    let mut port = Port::new(ids.port_id());
    port.alignment = Some(PortAlignment::Right);
    port
}

/// Editor-canvas spacing; purely cosmetic but keeps generated diagrams
/// readable when imported back into an editor.
fn position(layer: usize, index: usize) -> Coords {
    [layer as f64 * 220.0, index as f64 * 140.0]
}
