//! Per-source-block decoder state: accumulates received source and
//! repair symbols, and once enough have arrived, solves for the missing
//! source symbols by standing each received repair symbol's own G_ENC
//! row in for a missing source row (plus any surplus as overhead rows).

use crate::bitmask::Bitmask;
use crate::constraint;
use crate::error::{Error, Result};
use crate::gf256;
use crate::matrix::Dense;
use crate::params::{self, PParams};
use crate::solver;

/// Decoder state for one source block.
pub struct DecoderCore {
    sbn: u8,
    num_symbols: u32,
    symbol_size: usize,
    prm: PParams,
    source: Dense,
    repair: Vec<(u32, Vec<u8>)>,
    mask: Bitmask,
}

impl DecoderCore {
    /// Builds decoder state for source block `sbn`, which holds
    /// `num_symbols` symbols of `symbol_size` bytes each.
    pub fn new(sbn: u8, num_symbols: u32, symbol_size: usize) -> Result<Self> {
        let prm = params::lookup(num_symbols)?;
        Ok(Self {
            sbn,
            num_symbols,
            symbol_size,
            prm,
            source: Dense::zeros(num_symbols as usize, symbol_size),
            repair: Vec::new(),
            mask: Bitmask::new(num_symbols as usize),
        })
    }

    pub fn sbn(&self) -> u8 {
        self.sbn
    }

    pub fn is_complete(&self) -> bool {
        self.mask.gaps(self.num_symbols as usize) == 0
    }

    fn isi_of(&self, esi: u32) -> u32 {
        esi + (self.prm.k_padded - self.num_symbols)
    }

    /// Accepts the bytes for `esi`. A duplicate or (once every gap is
    /// already filled) surplus ESI is a silent no-op, matching a
    /// best-effort streaming decoder's tolerance for redundant input. An
    /// `esi` at or beyond `params::ESI_MAX` is rejected outright: it can
    /// never correspond to a symbol either side of the wire could have
    /// produced.
    pub fn accept(&mut self, esi: u32, data: &[u8]) -> Result<()> {
        if esi >= params::ESI_MAX {
            return Err(Error::InvalidEsi(esi));
        }
        if (esi as usize) < self.num_symbols as usize {
            if !self.mask.check(esi as usize) {
                let mut buf = vec![0u8; self.symbol_size];
                let n = data.len().min(self.symbol_size);
                buf[..n].copy_from_slice(&data[..n]);
                self.source.set_row(esi as usize, &buf);
                self.mask.set(esi as usize);
            }
            return Ok(());
        }
        if self.is_complete() {
            return Ok(());
        }
        if self.repair.iter().any(|&(e, _)| e == esi) {
            return Ok(());
        }
        let mut buf = vec![0u8; self.symbol_size];
        let n = data.len().min(self.symbol_size);
        buf[..n].copy_from_slice(&data[..n]);
        self.repair.push((esi, buf));
        Ok(())
    }

    /// Attempts to recover every missing source symbol and returns the
    /// full, in-order source block bytes.
    pub fn decode(&mut self) -> Result<Vec<u8>> {
        let gaps: Vec<usize> = (0..self.num_symbols as usize)
            .filter(|&e| !self.mask.check(e))
            .collect();

        if gaps.is_empty() {
            let mut out = Vec::with_capacity(self.num_symbols as usize * self.symbol_size);
            for row in 0..self.num_symbols as usize {
                out.extend_from_slice(self.source.row(row));
            }
            return Ok(out);
        }

        if self.repair.len() < gaps.len() {
            log::warn!(
                "sbn {}: {} gaps but only {} repair symbols received",
                self.sbn, gaps.len(), self.repair.len()
            );
            return Err(Error::InsufficientSymbols {
                gaps: gaps.len(),
                repairs: self.repair.len(),
            });
        }
        let overhead = self.repair.len() - gaps.len();
        log::debug!(
            "sbn {}: decoding {} gaps with {} repair symbols ({} overhead)",
            self.sbn, gaps.len(), self.repair.len(), overhead
        );

        let mut a = constraint::build(&self.prm, 0);
        a.grow_rows(overhead);
        let top = (self.prm.s + self.prm.h) as usize;

        let mut d = Dense::zeros(a.rows(), self.symbol_size);
        for esi in 0..self.num_symbols as usize {
            if self.mask.check(esi) {
                d.set_row(top + esi, self.source.row(esi));
            }
        }
        for (slot, &gap_esi) in gaps.iter().enumerate() {
            let (repair_esi, bytes) = &self.repair[slot];
            let isi = self.isi_of(*repair_esi);
            constraint::overwrite_row(&mut a, &self.prm, top + gap_esi, isi);
            d.set_row(top + gap_esi, bytes);
        }
        for (slot, (repair_esi, bytes)) in self.repair.iter().enumerate().skip(gaps.len()) {
            let isi = self.isi_of(*repair_esi);
            let row = self.prm.l as usize + (slot - gaps.len());
            constraint::overwrite_row(&mut a, &self.prm, row, isi);
            d.set_row(row, bytes);
        }

        let c = solver::solve(
            &a,
            &d,
            self.prm.s as usize,
            (self.prm.s + self.prm.h) as usize,
            self.prm.p as usize,
        )?;

        // A missing source symbol is recovered the same way a repair
        // symbol is produced: XOR the intermediate rows its own G_ENC
        // pattern names. There's no shortcut to `c.row(gap_esi)` — the
        // source/intermediate identity only holds for positions an
        // encoder skips solving for because it already has the bytes.
        for &gap_esi in &gaps {
            let mut recovered = vec![0u8; self.symbol_size];
            for idx in params::indices(&self.prm, gap_esi as u32) {
                gf256::axpy(&mut recovered, c.row(idx), 1);
            }
            self.source.set_row(gap_esi, &recovered);
            self.mask.set(gap_esi);
        }
        self.repair.clear();

        let mut out = Vec::with_capacity(self.num_symbols as usize * self.symbol_size);
        for row in 0..self.num_symbols as usize {
            out.extend_from_slice(self.source.row(row));
        }
        Ok(out)
    }
}
