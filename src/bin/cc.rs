//! Connected-components driver.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;

use surge::algorithms::ConnectedComponents;
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

    let profiler = Arc::new(Profiler::new());
    let mut cc = ConnectedComponents::new(&graph).with_profiler(profiler.clone());
    cc.init()?;

    info!("running connected components");
    let started = Instant::now();
    cc.run()?;
    eprintln!("time: {:.3} ms", started.elapsed().as_secs_f64() * 1e3);
    eprint!("{}", profiler.report());

    if args.validate {
        let reference = validate::cc_reference(&csr);
        let mismatches = validate::count_mismatches(&reference, &cc.labels()?);
        if mismatches == 0 {
            eprintln!("validation: success");
        } else {
            eprintln!("validation: failed with {mismatches} mismatches");
        }
    }

    if args.print_output {
        println!("{:<10}{:<10}", "vertex", "label");
        for (vertex, label) in cc.labels()?.into_iter().enumerate() {
            println!("{vertex:<10}{label:<10}");
        }
    }

    Ok(())
}
