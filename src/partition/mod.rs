//! Round-robin spec partitioning
//!
//! The spec at discovery position `i` lands in bin `i % workers`. Cost is
//! never estimated: operators steer which specs share a worker through the
//! directory layout, e.g. by placing slow suites at adjacent positions so
//! they end up in different bins.

use thiserror::Error;
use tracing::debug;

use crate::discovery::SpecFile;

/// Separator between spec paths in a bin filter
pub const FILTER_SEPARATOR: &str = ",";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PartitionError {
    #[error("Cannot partition specs into {0} bins")]
    InvalidWorkerCount(usize),
}

/// The specs assigned to one worker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bin {
    index: usize,
    files: Vec<SpecFile>,
}

impl Bin {
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn files(&self) -> &[SpecFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Comma-joined spec list handed to the runner
    pub fn filter(&self) -> String {
        self.files
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(FILTER_SEPARATOR)
    }
}

/// All bins for one run, ordered by index
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    bins: Vec<Bin>,
}

impl Partition {
    /// Distribute specs over `workers` bins in discovery order
    pub fn round_robin(specs: Vec<SpecFile>, workers: usize) -> Result<Self, PartitionError> {
        if workers == 0 {
            return Err(PartitionError::InvalidWorkerCount(workers));
        }

        let mut bins: Vec<Bin> = (0..workers)
            .map(|index| Bin {
                index,
                files: Vec::new(),
            })
            .collect();

        for (i, spec) in specs.into_iter().enumerate() {
            bins[i % workers].files.push(spec);
        }

        for bin in &bins {
            debug!("Bin {} holds {} specs", bin.index, bin.len());
        }

        Ok(Self { bins })
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn into_bins(self) -> Vec<Bin> {
        self.bins
    }

    pub fn total_files(&self) -> usize {
        self.bins.iter().map(Bin::len).sum()
    }

    pub fn empty_bins(&self) -> usize {
        self.bins.iter().filter(|b| b.is_empty()).count()
    }
}
