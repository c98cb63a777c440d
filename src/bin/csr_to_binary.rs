//! Converts a text graph (COO or MatrixMarket) to the binary CSR format.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use surge::cli::GraphArgs;
use surge::formats::Csr;
use surge::io;

#[derive(Parser, Debug)]
struct Args {
    #[command(flatten)]
    graph: GraphArgs,

    /// Output path for the binary CSR.
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let csr: Csr<u32> = args
        .graph
        .load_csr()
        .with_context(|| format!("reading {}", args.graph.path.display()))?;

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    io::binary::write_csr(&csr, &mut writer)
        .with_context(|| format!("writing {}", args.output.display()))?;

    eprintln!(
        "wrote {} row offsets and {} nonzeros to {}",
        csr.row_offsets().len(),
        csr.edge_count(),
        args.output.display()
    );
    Ok(())
}
