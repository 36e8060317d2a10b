use crate::config::OptimizationSpec;
use crate::error::{Result, StitchError};
use crate::join::join_pair;
use crate::model::{Composite, PageImage, StitchStats};
use crate::optimize;
use crate::plan::{self, ArrangementPlan, NodeRef};
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Stitches `inputs` into one near-square composite and optimizes it per
/// `spec`.
///
/// Sequence: validate -> classify/plan from dimensions -> execute joins in
/// plan order -> downscale + encode -> attach provenance. Each input is
/// consumed by exactly one join, so peak memory is the leaves still
/// awaiting their join plus the largest in-flight intermediate.
#[instrument(skip_all)]
pub fn stitch(inputs: Vec<PageImage>, spec: &OptimizationSpec) -> Result<Composite> {
    spec.validate()?;
    if inputs.is_empty() {
        return Err(StitchError::Empty);
    }
    for p in &inputs {
        if p.image.width() == 0 || p.image.height() == 0 {
            return Err(StitchError::InvalidInput(format!(
                "input {} has zero dimensions",
                p.key
            )));
        }
    }
    let dims: Vec<(u32, u32)> = inputs
        .iter()
        .map(|p| (p.image.width(), p.image.height()))
        .collect();
    let plan = plan::plan(&dims)?;
    execute(inputs, &plan, spec)
}

/// Fixed-arity variant for call sites whose contract requires an exact
/// image count (4 for the page-sheet flow, 2 for pairs). The count is
/// checked before any decode or join work happens.
pub fn stitch_exact(
    inputs: Vec<PageImage>,
    arity: usize,
    spec: &OptimizationSpec,
) -> Result<Composite> {
    if inputs.len() != arity {
        return Err(StitchError::WrongImageCount {
            expected: arity,
            actual: inputs.len(),
        });
    }
    stitch(inputs, spec)
}

/// Stitch and persist. The output file appears atomically: bytes are fully
/// encoded in memory first, written to a `.part` sibling, then renamed.
pub fn stitch_to_path(
    inputs: Vec<PageImage>,
    spec: &OptimizationSpec,
    path: &Path,
) -> Result<Composite> {
    let composite = stitch(inputs, spec)?;
    write_composite(&composite, path)?;
    Ok(composite)
}

/// Write a composite's encoded bytes to `path` via a `.part` sibling and
/// rename, so no half-written output is ever visible.
pub fn write_composite(composite: &Composite, path: &Path) -> Result<()> {
    let tmp = path.with_extension("part");
    fs::write(&tmp, &composite.encoded)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn execute(
    inputs: Vec<PageImage>,
    plan: &ArrangementPlan,
    spec: &OptimizationSpec,
) -> Result<Composite> {
    // Arena scoped to this call. Every node is taken exactly once (the plan
    // is a binary tree), so a consumed image frees as soon as its join ends.
    let mut leaves: Vec<Option<(RgbaImage, Vec<String>)>> = inputs
        .into_iter()
        .map(|p| Some((p.image.into_rgba8(), vec![p.key])))
        .collect();
    let mut joined: Vec<Option<(RgbaImage, Vec<String>)>> = Vec::with_capacity(plan.ops.len());

    for op in &plan.ops {
        let (left_img, left_prov) = take_node(op.left, &mut leaves, &mut joined)?;
        let (right_img, right_prov) = take_node(op.right, &mut leaves, &mut joined)?;
        let img = join_pair(&left_img, &right_img, op.axis)?;
        // Provenance reads left-to-right / top-to-bottom: left operand first.
        let mut prov = left_prov;
        prov.extend(right_prov);
        joined.push(Some((img, prov)));
    }

    let (image, provenance) = take_node(plan.root(), &mut leaves, &mut joined)?;
    let optimized = optimize::optimize(image, spec)?;
    let stats = StitchStats::new(
        optimized.image.width(),
        optimized.image.height(),
        optimized.encoded.len() as u64,
    );
    info!(
        strategy = ?plan.strategy,
        width = stats.width,
        height = stats.height,
        encoded_bytes = stats.encoded_bytes,
        "stitched composite"
    );
    Ok(Composite {
        image: optimized.image,
        provenance,
        encoded: optimized.encoded,
        format: spec.format,
        stats,
    })
}

type Slot = Option<(RgbaImage, Vec<String>)>;

fn take_node(
    node: NodeRef,
    leaves: &mut [Slot],
    joined: &mut [Slot],
) -> Result<(RgbaImage, Vec<String>)> {
    let slot = match node {
        NodeRef::Input(i) => leaves.get_mut(i),
        NodeRef::Joined(i) => joined.get_mut(i),
    };
    slot.and_then(Option::take).ok_or_else(|| {
        StitchError::InvalidInput(format!("plan references {node:?} twice or out of range"))
    })
}

/// One image set to compose in batch mode.
pub struct StitchJob {
    pub inputs: Vec<PageImage>,
    pub out_path: PathBuf,
}

/// Per-set outcome. A failed set is reported here instead of aborting the
/// batch.
pub struct JobOutcome {
    pub out_path: PathBuf,
    pub result: Result<StitchStats>,
}

/// Composes each job independently and writes its output. Sets share only
/// the read-only `spec`; with the `parallel` feature jobs run one worker
/// per set, with no ordering guarantee across sets.
pub fn stitch_batch(jobs: Vec<StitchJob>, spec: &OptimizationSpec) -> Vec<JobOutcome> {
    #[cfg(feature = "parallel")]
    {
        jobs.into_par_iter().map(|j| run_job(j, spec)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        jobs.into_iter().map(|j| run_job(j, spec)).collect()
    }
}

fn run_job(job: StitchJob, spec: &OptimizationSpec) -> JobOutcome {
    let out_path = job.out_path;
    let result = stitch_to_path(job.inputs, spec, &out_path).map(|c| c.stats);
    JobOutcome { out_path, result }
}
