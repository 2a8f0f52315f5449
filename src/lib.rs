//! Core of the scmask source-to-source masking compiler.
//!
//! The compiler rewrites a straight-line boolean / bit-vector program into a
//! functionally equivalent one in which every intermediate value is XOR-masked
//! with fresh random bits, so no single intermediate is statistically
//! dependent on any single secret input.
//!
//! The pipeline is a strict linear composition; each stage consumes its
//! predecessor by move:
//!
//! 1. [`pass::bitblast`] reduces multi-bit operations to single-bit ones
//!    through the SMT solver (behind the `z3-blast` feature);
//! 2. [`pass::divide`] cuts the instruction stream into minimal regions;
//! 3. [`pass::mask`] replaces each region with a masked gadget;
//! 4. [`pass::collect`] gathers the per-output XOR sets and the alias
//!    equivalence classes;
//! 5. [`pass::concat`] stitches the regions back together, swapping and
//!    patching random bits so that masks cancel consistently (behind the
//!    `gap-filling` feature).
//!
//! The front end and the emitter live in their own crates; this one consumes
//! a [`ir::Region`] plus the return [`ir::ValueInfo`] and produces the final
//! region.

pub mod eval;
pub mod ir;
pub mod pass;

mod error;

pub use error::{Error, Result};

use log::debug;

use ir::{Region, ValueInfo};
use pass::{RegionCollector, RegionConcatenator, TrivialRegionDivider, TrivialRegionMasker};

/// Runs the full pipeline on one function body.
pub fn transform(region: Region, ret: &ValueInfo) -> Result<Region> {
    let single_bit = blast_stage(region, ret)?;
    mask_program(single_bit)
}

/// Divides, masks, collects and concatenates an already single-bit region.
pub fn mask_program(region: Region) -> Result<Region> {
    debug!("masking:\n{}", region);
    let divided = TrivialRegionDivider::new(region);
    let masked = TrivialRegionMasker::new(divided)?;
    let collected = RegionCollector::collect(masked)?;
    let concatenated = RegionConcatenator::new(collected)?;
    let region = concatenated.into_region();
    debug!("masked:\n{}", region);
    Ok(region)
}

#[cfg(feature = "z3-blast")]
fn blast_stage(region: Region, ret: &ValueInfo) -> Result<Region> {
    pass::bitblast::blast(ret, region)
}

#[cfg(not(feature = "z3-blast"))]
fn blast_stage(region: Region, _ret: &ValueInfo) -> Result<Region> {
    Ok(region)
}
