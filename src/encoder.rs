//! Per-source-block encoder state: source symbols are served directly
//! from the block's bytes; repair symbols require the constraint system
//! to be built and solved first, which is deferred until the first
//! repair symbol is actually requested.

use crate::constraint;
use crate::error::Result;
use crate::gf256;
use crate::matrix::Dense;
use crate::params::{self, PParams};
use crate::solver;

/// Encoder state for one source block.
pub struct EncoderCore {
    sbn: u8,
    num_symbols: u32,
    symbol_size: usize,
    prm: PParams,
    intermediate: Option<Dense>,
}

impl EncoderCore {
    /// Builds encoder state for source block `sbn`, which holds
    /// `num_symbols` symbols of `symbol_size` bytes each.
    pub fn new(sbn: u8, num_symbols: u32, symbol_size: usize) -> Result<Self> {
        let prm = params::lookup(num_symbols)?;
        Ok(Self {
            sbn,
            num_symbols,
            symbol_size,
            prm,
            intermediate: None,
        })
    }

    pub fn sbn(&self) -> u8 {
        self.sbn
    }

    pub fn num_symbols(&self) -> u32 {
        self.num_symbols
    }

    fn ensure_intermediate(&mut self, block: &[u8]) -> Result<&Dense> {
        if self.intermediate.is_none() {
            log::debug!(
                "sbn {}: building intermediate symbols for {} source symbols (K'={})",
                self.sbn, self.num_symbols, self.prm.k_padded
            );
            let a = constraint::build(&self.prm, 0);
            let mut d = Dense::zeros(self.prm.l as usize, self.symbol_size);
            let top = (self.prm.s + self.prm.h) as usize;
            let mut buf = vec![0u8; self.symbol_size];
            for sym in 0..self.num_symbols as usize {
                let start = sym * self.symbol_size;
                buf.fill(0);
                if start < block.len() {
                    let end = (start + self.symbol_size).min(block.len());
                    buf[..end - start].copy_from_slice(&block[start..end]);
                }
                d.set_row(top + sym, &buf);
            }
            let c = solver::solve(
                &a,
                &d,
                self.prm.s as usize,
                (self.prm.s + self.prm.h) as usize,
                self.prm.p as usize,
            )?;
            self.intermediate = Some(c);
        }
        Ok(self.intermediate.as_ref().unwrap())
    }

    /// Encodes the symbol at `esi`, reading source symbols directly out
    /// of `block` and lazily solving for repair symbols.
    pub fn encode(&mut self, esi: u32, block: &[u8]) -> Result<Vec<u8>> {
        if (esi as usize) < self.num_symbols as usize {
            let start = esi as usize * self.symbol_size;
            let mut out = vec![0u8; self.symbol_size];
            if start < block.len() {
                let end = (start + self.symbol_size).min(block.len());
                out[..end - start].copy_from_slice(&block[start..end]);
            }
            return Ok(out);
        }

        let isi = esi + (self.prm.k_padded - self.num_symbols);
        let idxs = params::indices(&self.prm, isi);
        let c = self.ensure_intermediate(block)?;
        let mut out = vec![0u8; self.symbol_size];
        for idx in idxs {
            gf256::axpy(&mut out, c.row(idx), 1);
        }
        Ok(out)
    }
}
