use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use pipeflow_editor::{
    CreateNode, CreateNodeLink, CreateSuperNode, FlowEditor, MoveObjects, PipelineFlow,
};
use pipeflow_model::Node;

/// Editor holding a linear chain of `node_count` linked execution nodes.
fn chain_editor(node_count: usize) -> FlowEditor {
    let mut editor = FlowEditor::new(PipelineFlow::new("bench", "main"));
    for i in 0..node_count {
        let node = Node::execution(format!("node-{i}"), "transform")
            .with_position((i as f64) * 80.0, 40.0);
        editor.execute(CreateNode::new("main", node).into()).unwrap();
        if i > 0 {
            editor
                .execute(
                    CreateNodeLink::new("main", format!("node-{}", i - 1), format!("node-{i}"))
                        .into(),
                )
                .unwrap();
        }
    }
    editor
}

fn execute_chain_of_actions(c: &mut Criterion) {
    c.bench_function("execute_100_node_chain", |b| {
        b.iter(|| chain_editor(black_box(100)))
    });
}

fn undo_redo_cycle(c: &mut Criterion) {
    let mut editor = chain_editor(50);
    for i in 0..50 {
        editor
            .execute(MoveObjects::new("main", vec![format!("node-{i}")], 5.0, 5.0).into())
            .unwrap();
    }
    // Each pass unwinds the 50 moves and replays them, leaving the
    // document where it started.
    c.bench_function("undo_redo_50_moves", |b| {
        b.iter(|| {
            editor.undo_multi(black_box(50)).unwrap();
            while editor.redo().unwrap() {}
        })
    });
}

fn collapse_selection_into_supernode(c: &mut Criterion) {
    let base = chain_editor(60);
    let selection: Vec<String> = (20..40).map(|i| format!("node-{i}")).collect();
    c.bench_function("create_supernode_20_nodes", |b| {
        b.iter_batched(
            || FlowEditor::new(base.flow().clone()),
            |mut editor| {
                editor
                    .execute(CreateSuperNode::new("main", selection.clone()).into())
                    .unwrap();
                editor
            },
            BatchSize::SmallInput,
        )
    });
}

fn save_large_flow(c: &mut Criterion) {
    let editor = chain_editor(500);
    c.bench_function("save_500_nodes", |b| b.iter(|| editor.save().unwrap()));
}

criterion_group!(
    benches,
    execute_chain_of_actions,
    undo_redo_cycle,
    collapse_selection_into_supernode,
    save_large_flow
);
criterion_main!(benches);
