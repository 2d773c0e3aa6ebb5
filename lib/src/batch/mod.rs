//! Filling many layers at once.
//!
//! A configured [`Fill`] serves as the prototype. Every job gets its own
//! duplicate, so jobs share nothing mutable and one failing layer does not
//! affect the others. Results come back in job order whatever the thread
//! count.

use crate::geometry::Polylines;
use crate::infill::{Fill, FillParams};
use crate::slice::Surface;
use crate::{CoordF, Result};
use log::{debug, error};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One layer's worth of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillJob {
    pub layer_id: usize,
    /// Z of the layer (mm).
    pub z: CoordF,
    pub surface: Surface,
}

impl FillJob {
    pub fn new(layer_id: usize, z: CoordF, surface: Surface) -> Self {
        Self {
            layer_id,
            z,
            surface,
        }
    }
}

/// Fill every job on the rayon pool.
///
/// The prototype's state is copied into each job's generator before its layer
/// id and z are set.
pub fn fill_surfaces_parallel(
    prototype: &Fill<'_>,
    jobs: &[FillJob],
    params: &FillParams,
) -> Vec<Result<Polylines>> {
    debug!(
        "filling {} surfaces with {} on {} threads",
        jobs.len(),
        prototype.pattern(),
        rayon::current_num_threads()
    );
    jobs.par_iter()
        .map(|job| {
            let mut fill = prototype.duplicate();
            fill.state.layer_id = Some(job.layer_id);
            fill.state.z = job.z;
            fill.fill_surface(&job.surface, params).map_err(|err| {
                error!("layer {} ({}): {err}", job.layer_id, fill.pattern());
                err
            })
        })
        .collect()
}
