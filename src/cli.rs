//! Shared command-line surface of the algorithm binaries.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use rand::Rng;

use crate::device::MemorySpace;
use crate::error::{Error, Result};
use crate::formats::Csr;
use crate::io;
use crate::types::{VertexId, Weight};

/// Environment variable selecting where the CSR arrays live.
const GRAPH_LOCATION_VAR: &str = "GRAPH_LOCATION";

/// Arguments common to every algorithm binary.
#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Path to the graph file (COO text unless -b or -m).
    pub path: PathBuf,

    /// Input is binary CSR.
    #[arg(short = 'b', conflicts_with = "matrix_market")]
    pub binary: bool,

    /// Input is MatrixMarket.
    #[arg(short = 'm')]
    pub matrix_market: bool,

    /// Treat the input as undirected: duplicate each COO edge.
    #[arg(short = 'u')]
    pub undirected: bool,

    /// Print per-vertex output.
    #[arg(short = 'p')]
    pub print_output: bool,

    /// Run the CPU reference validator after the kernel run.
    #[arg(short = 'v')]
    pub validate: bool,

    /// Source vertex; uniformly random when absent.
    #[arg(short = 's')]
    pub source: Option<VertexId>,
}

impl GraphArgs {
    /// Loads the graph in the format the flags select.
    pub fn load_csr<W: Weight>(&self) -> Result<Csr<W>> {
        let file = File::open(&self.path).map_err(|err| {
            Error::InvalidInput(format!("could not open {}: {err}", self.path.display()))
        })?;
        let mut reader = BufReader::new(file);

        if self.binary {
            io::binary::read_csr(&mut reader)
        } else if self.matrix_market {
            let (coo, vertices) = io::matrix_market::from_reader(reader)?;
            io::csr::from_coo_with_vertex_count(&coo, vertices)
        } else {
            let (coo, vertices) = io::coo::from_reader(reader, self.undirected)?;
            io::csr::from_coo_with_vertex_count(&coo, vertices)
        }
    }

    /// The requested source, or a uniformly random one.
    pub fn resolve_source(&self, vertex_count: usize) -> Result<VertexId> {
        if vertex_count == 0 {
            return Err(Error::InvalidInput("the graph has no vertices".into()));
        }
        match self.source {
            Some(source) => {
                if (source as usize) < vertex_count {
                    Ok(source)
                } else {
                    Err(Error::InvalidInput(format!(
                        "source vertex {source} out of range for {vertex_count} vertices"
                    )))
                }
            }
            None => Ok(rand::thread_rng().gen_range(0..vertex_count as VertexId)),
        }
    }

    /// CSR residence from the `GRAPH_LOCATION` environment variable
    /// (defaults to shared).
    pub fn graph_location() -> MemorySpace {
        std::env::var(GRAPH_LOCATION_VAR)
            .ok()
            .and_then(|text| text.parse().ok())
            .unwrap_or(MemorySpace::Shared)
    }
}
