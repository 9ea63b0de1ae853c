//! Common test utilities for building brush schemas and stub renderers.
use fude::prelude::*;
use std::sync::{Arc, Mutex};

/// A renderer that tags its output and logs every invocation.
///
/// Output is a 1x1 image whose bytes encode the call: byte 0 is this
/// renderer's tag, byte 1 folds the tags of its sources in order, byte 2 is
/// the source count. Tests can assert both which renderers ran and what fed
/// them without real pixel work.
pub struct StubRenderer {
    op: String,
    tag: u8,
    arity: Option<usize>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Renderer for StubRenderer {
    fn arity(&self) -> Option<usize> {
        self.arity
    }

    fn render(&self, sources: &[&Image]) -> std::result::Result<Image, RenderError> {
        self.log.lock().unwrap().push(self.op.clone());
        let mut folded: u8 = 0;
        for source in sources {
            folded = folded.wrapping_mul(31).wrapping_add(source.pixels()[0]);
        }
        Image::from_pixels(1, 1, vec![self.tag, folded, sources.len() as u8, 255])
    }
}

/// A shared invocation log for stub renderers.
#[allow(dead_code)]
pub fn render_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Creates a logging stub renderer with no arity requirement.
#[allow(dead_code)]
pub fn stub(op: &str, tag: u8, log: &Arc<Mutex<Vec<String>>>) -> Arc<StubRenderer> {
    Arc::new(StubRenderer {
        op: op.to_string(),
        tag,
        arity: None,
        log: Arc::clone(log),
    })
}

/// Creates a logging stub renderer that insists on a fixed source count.
#[allow(dead_code)]
pub fn strict_stub(
    op: &str,
    tag: u8,
    arity: usize,
    log: &Arc<Mutex<Vec<String>>>,
) -> Arc<StubRenderer> {
    Arc::new(StubRenderer {
        op: op.to_string(),
        tag,
        arity: Some(arity),
        log: Arc::clone(log),
    })
}

/// Creates a node with no inputs and a single output port.
#[allow(dead_code)]
pub fn source_node(id: &str, output: &str, op: &str) -> Node {
    let mut node = Node::new(id, [0.0, 0.0]);
    node.outputs = vec![Port::new(output)];
    node.data = NodeData::with_op(op);
    node
}

/// Creates a node with one input and one output port.
#[allow(dead_code)]
pub fn filter_node(id: &str, input: &str, output: &str, op: &str) -> Node {
    let mut node = Node::new(id, [0.0, 0.0]);
    node.inputs = vec![Port::new(input)];
    node.outputs = vec![Port::new(output)];
    node.data = NodeData::with_op(op);
    node
}

/// Creates a node with two inputs and one output port.
#[allow(dead_code)]
pub fn merge_node(id: &str, left: &str, right: &str, output: &str, op: &str) -> Node {
    let mut node = Node::new(id, [0.0, 0.0]);
    node.inputs = vec![Port::new(left), Port::new(right)];
    node.outputs = vec![Port::new(output)];
    node.data = NodeData::with_op(op);
    node
}

/// Creates a link from a producing port to a consuming port.
#[allow(dead_code)]
pub fn link(output: &str, input: &str) -> Link {
    Link::new(output, input)
}

/// Two sources merging into one sink: `A` and `B` both feed `C`.
#[allow(dead_code)]
pub fn abc_schema() -> Schema {
    Schema::new(
        vec![
            source_node("A", "port-a", "noise"),
            source_node("B", "port-b", "noise"),
            merge_node("C", "port-c1", "port-c2", "port-c3", "merge"),
        ],
        vec![link("port-a", "port-c1"), link("port-b", "port-c2")],
    )
}

/// A three-node pipeline: `A -> B -> C`.
#[allow(dead_code)]
pub fn chain_schema() -> Schema {
    Schema::new(
        vec![
            source_node("A", "port-a", "noise"),
            filter_node("B", "port-b-in", "port-b-out", "blur"),
            filter_node("C", "port-c-in", "port-c-out", "sharpen"),
        ],
        vec![link("port-a", "port-b-in"), link("port-b-out", "port-c-in")],
    )
}

/// Installs a test-friendly tracing subscriber so `--nocapture` runs show
/// the engine's debug events. Safe to call from every test.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
