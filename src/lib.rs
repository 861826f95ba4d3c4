//! A RaptorQ-style fountain code: a precode / intermediate-symbol engine
//! (constraint-matrix construction plus a five-phase structured Gaussian
//! elimination solver over GF(256)) wrapped in per-source-block
//! encoder/decoder cores and a multi-block session driver.
//!
//! The algorithmic core lives in [`constraint`], [`graph`], [`chooser`],
//! and [`solver`]; [`params`] supplies the precode dimensions and LT/PI
//! generator a given source-symbol count requires. [`encoder`] and
//! [`decoder`] turn that engine into a per-block symbol source/sink;
//! [`session`] owns one of each per source block number for a whole
//! transfer, and [`oti`] + [`partition`] describe how a transfer's wire
//! parameters carve an object into blocks and symbols.

mod bitmask;
mod chooser;
mod constraint;
mod decoder;
mod encoder;
mod error;
mod gf256;
mod graph;
mod io;
mod matrix;
mod oti;
mod params;
mod partition;
mod session;
mod solver;
mod sparse;

pub use decoder::DecoderCore;
pub use encoder::EncoderCore;
pub use error::{Error, Result};
pub use io::{IoContext, SliceIo};
pub use oti::{derive_scheme, fid, fid_esi, fid_sbn, pack_common, pack_scheme, unpack_common, unpack_scheme, Oti};
pub use params::K_MAX;
pub use partition::{block_symbols, partition as block_partition, symbol_offset, Partition};
pub use session::RaptorQSession;
