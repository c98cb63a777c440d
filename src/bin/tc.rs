//! Triangle-counting driver.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;

use surge::algorithms::TriangleCount;
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
        directed: false,
        weighted: false,
    };
    let graph = graph::build(&queue, &csr, properties, GraphArgs::graph_location())?;
    info!(
        "graph: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    let profiler = Arc::new(Profiler::new());
    let mut tc = TriangleCount::new(&graph).with_profiler(profiler.clone());
    tc.init()?;

    info!("running triangle counting");
    let started = Instant::now();
    tc.run()?;
    let total = tc.total()?;
    eprintln!("time: {:.3} ms", started.elapsed().as_secs_f64() * 1e3);
    eprint!("{}", profiler.report());
    println!("triangles: {total}");

    if args.validate {
        let reference = validate::tc_reference(&csr);
        if reference == total {
            eprintln!("validation: success");
        } else {
            eprintln!("validation: failed, expected {reference} got {total}");
        }
    }

    if args.print_output {
        println!("{:<10}{:<10}", "vertex", "triangles");
        for (vertex, count) in tc.per_vertex()?.into_iter().enumerate() {
            if count > 0 {
                println!("{vertex:<10}{count:<10}");
            }
        }
    }

    Ok(())
}
