//! Single-source shortest paths driver.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;

use surge::algorithms::Sssp;
use surge::cli::GraphArgs;
use surge::formats::Csr;
use surge::graph::{self, Properties};
use surge::{validate, Profiler, Queue};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = GraphArgs::parse();

    let csr: Csr<f32> = args
        .load_csr()
        .with_context(|| format!("reading {}", args.path.display()))?;

    let queue = Queue::new();
    let properties = Properties {
        directed: !args.undirected,
        weighted: true,
    };
    let graph = graph::build(&queue, &csr, properties, GraphArgs::graph_location())?;
    info!(
        "graph: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    let source = args.resolve_source(graph.vertex_count())?;
    let profiler = Arc::new(Profiler::new());
    let mut sssp = Sssp::new(&graph).with_profiler(profiler.clone());
    sssp.init(source)?;

    info!("running sssp from source {source}");
    let started = Instant::now();
    sssp.run()?;
    eprintln!("time: {:.3} ms", started.elapsed().as_secs_f64() * 1e3);
    eprint!("{}", profiler.report());

    if args.validate {
        let reference = validate::sssp_reference(&csr, source);
        let mismatches = validate::count_mismatches(&reference, &sssp.distances()?);
        if mismatches == 0 {
            eprintln!("validation: success");
        } else {
            eprintln!("validation: failed with {mismatches} mismatches");
        }
    }

    if args.print_output {
        println!("{:<10}{:<12}", "vertex", "distance");
        for (vertex, distance) in sssp.distances()?.into_iter().enumerate() {
            if distance < f32::MAX {
                println!("{vertex:<10}{distance:<12}");
            }
        }
    }

    Ok(())
}
