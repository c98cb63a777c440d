//! Breadth-first search driver.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;

use surge::algorithms::Bfs;
use surge::cli::GraphArgs;
use surge::formats::Csr;
use surge::graph::{self, Properties};
use surge::{validate, Profiler, Queue};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = GraphArgs::parse();

    let csr: Csr<u32> = args
        .load_csr()
        .with_context(|| format!("reading {}", args.path.display()))?;

    let queue = Queue::new();
    let properties = Properties {
        directed: !args.undirected,
        weighted: false,
    };
    let graph = graph::build(&queue, &csr, properties, GraphArgs::graph_location())?;
    info!(
        "graph: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    let source = args.resolve_source(graph.vertex_count())?;
    let profiler = Arc::new(Profiler::new());
    let mut bfs = Bfs::new(&graph).with_profiler(profiler.clone());
    bfs.init(source)?;

    info!("running bfs from source {source}");
    let started = Instant::now();
    bfs.run()?;
    eprintln!("time: {:.3} ms", started.elapsed().as_secs_f64() * 1e3);
    eprint!("{}", profiler.report());

    if args.validate {
        let reference = validate::bfs_reference(&csr, source);
        let mismatches = validate::count_mismatches(&reference, &bfs.distances()?);
        if mismatches == 0 {
            eprintln!("validation: success");
        } else {
            eprintln!("validation: failed with {mismatches} mismatches");
        }
    }

    if args.print_output {
        let sentinel = (graph.vertex_count() + 1) as u32;
        println!("{:<10}{:<10}", "vertex", "distance");
        for (vertex, distance) in bfs.distances()?.into_iter().enumerate() {
            if distance != sentinel {
                println!("{vertex:<10}{distance:<10}");
            }
        }
    }

    Ok(())
}
