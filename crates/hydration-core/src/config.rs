//! The recognized startup options of spec.md §6, consumed once when a
//! simulation is built. None of this is a command-line surface (that
//! stays with the external driver, per spec.md §1) — `SimulationConfig`
//! is a plain `serde`-deserializable struct a caller can build from
//! JSON with `serde_json::from_str`, or just default-construct.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalogue::PhaseId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CshGeom {
    Random,
    Plate,
}

impl Default for CshGeom {
    fn default() -> Self {
        CshGeom::Random
    }
}

/// `cap`/`scale` pair for the exponential-saturation nucleation law of
/// spec.md §4.G: `p = cap * (1 - exp(-pool / scale))`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NucleationLaw {
    pub cap: f64,
    pub scale: f64,
}

impl NucleationLaw {
    pub fn probability(&self, pool: u64) -> f64 {
        if self.scale <= 0.0 {
            return 0.0;
        }
        self.cap * (1.0 - (-(pool as f64) / self.scale).exp())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NucleationConfig {
    pub ch: NucleationLaw,
    pub c3ah6: NucleationLaw,
    pub fh3: NucleationLaw,
    pub gypsum: NucleationLaw,
}

impl Default for NucleationConfig {
    fn default() -> Self {
        NucleationConfig {
            ch: NucleationLaw { cap: 0.7, scale: 2500.0 },
            c3ah6: NucleationLaw { cap: 0.3, scale: 1500.0 },
            fh3: NucleationLaw { cap: 0.4, scale: 1000.0 },
            gypsum: NucleationLaw { cap: 0.5, scale: 2000.0 },
        }
    }
}

/// A value that is looked up by hydration cycle and otherwise holds
/// its last entry — used for `Molarvcsh[cycle]` and the fly-ash
/// reactivity ramp `PHfactor[cycle]` of spec.md §3/§6, both of which
/// are "function of cycle" lookup tables supplied externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleTable(Vec<f64>);

impl CycleTable {
    pub fn constant(v: f64) -> Self {
        CycleTable(vec![v])
    }

    pub fn at(&self, cycle: i64) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        let idx = cycle.max(0) as usize;
        self.0[idx.min(self.0.len() - 1)]
    }
}

impl Default for CycleTable {
    fn default() -> Self {
        // 25.0 cm^3/mol is a typical room-temperature CSH molar
        // volume baseline; PHfactor defaults to 1.0 (no damping).
        CycleTable::constant(1.0)
    }
}

fn default_molarvcsh() -> CycleTable {
    CycleTable::constant(108.0)
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Micrometers per voxel.
    pub res: f64,
    pub cshgeom: CshGeom,
    /// Enable CH growth on inert-aggregate/limestone surfaces.
    pub chflag: bool,
    /// Per-phase overrides of the catalogue's default solubility flag
    /// (spec.md §3 `Soluble[phase_id]`).
    pub soluble_overrides: HashMap<PhaseId, bool>,
    pub molarvcsh: CycleTable,
    pub crackcycle: i64,
    pub ettrgrow: f64,
    pub chgrow: f64,
    pub chgrowagg: f64,
    pub c3ah6grow: f64,
    pub c3aettr: f64,
    pub solid_c3a_gyp: f64,
    pub c3a_gyp: f64,
    pub solid_c4af_gyp: f64,
    pub agrate: f64,
    pub gyp_abs_prob: f64,
    pub phfactor: CycleTable,
    pub psfume: f64,
    pub pamsil: f64,
    pub temp_cur: f64,
    pub alpha_cur: f64,
    pub alpha_fa_cur: f64,
    pub csh_porosity: f64,
    pub pozzcsh_porosity: f64,
    pub slagcsh_porosity: f64,
    /// Grams of cement represented by the modeled volume — spec.md
    /// §4.H's "cement... mass totals" input, supplied externally
    /// rather than derived from the lattice (the density/volume
    /// bookkeeping that produces this belongs to whatever component
    /// built the seed lattice).
    pub cement_mass_g: f64,
    pub pozzolan_mass_g: f64,
    /// Total leachable K⁺/Na⁺, mol per gram cement, at full hydration.
    pub tot_k_per_g: f64,
    pub tot_na_per_g: f64,
    /// Fraction of `tot_k_per_g`/`tot_na_per_g` actually released at
    /// `alpha = 1`.
    pub rs_k: f64,
    pub rs_na: f64,
    pub fa_tot_k_per_g: f64,
    pub fa_tot_na_per_g: f64,
    pub fa_rs_k: f64,
    pub fa_rs_na: f64,
    /// Hydration-cycle-to-wall-clock-hours conversion, used only by
    /// the chemistry solver's first-hour alkali-release ramp.
    pub hours_per_cycle: f64,
    pub nucleation: NucleationConfig,
    #[serde(default = "default_true")]
    pub ettr_soluble: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            seed: 0,
            res: 1.0,
            cshgeom: CshGeom::default(),
            chflag: false,
            soluble_overrides: HashMap::new(),
            molarvcsh: default_molarvcsh(),
            crackcycle: i64::MAX,
            ettrgrow: 0.5,
            chgrow: 0.5,
            chgrowagg: 0.2,
            c3ah6grow: 0.3,
            c3aettr: 0.2,
            solid_c3a_gyp: 0.5,
            c3a_gyp: 0.5,
            solid_c4af_gyp: 0.5,
            agrate: 0.1,
            gyp_abs_prob: 0.1,
            phfactor: CycleTable::default(),
            psfume: 0.1,
            pamsil: 0.05,
            temp_cur: 25.0,
            alpha_cur: 0.0,
            alpha_fa_cur: 0.0,
            csh_porosity: 0.38,
            pozzcsh_porosity: 0.2,
            slagcsh_porosity: 0.2,
            cement_mass_g: 1.0,
            pozzolan_mass_g: 0.0,
            tot_k_per_g: 0.0,
            tot_na_per_g: 0.0,
            rs_k: 0.8,
            rs_na: 0.6,
            fa_tot_k_per_g: 0.0,
            fa_tot_na_per_g: 0.0,
            fa_rs_k: 0.5,
            fa_rs_na: 0.5,
            hours_per_cycle: 1.0 / 12.0,
            nucleation: NucleationConfig::default(),
            ettr_soluble: true,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Effective `Soluble[phase]`: catalogue default, overridden by
    /// `soluble_overrides` if present.
    pub fn is_soluble(&self, p: PhaseId) -> bool {
        self.soluble_overrides
            .get(&p)
            .copied()
            .unwrap_or_else(|| p.is_soluble_solid_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let cfg = SimulationConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SimulationConfig = SimulationConfig::from_json(&json).unwrap();
        assert_eq!(back.seed, cfg.seed);
        assert_eq!(back.res, cfg.res);
    }

    #[test]
    fn malformed_json_is_a_core_error() {
        let err = SimulationConfig::from_json("{ not json").unwrap_err();
        let _: crate::error::CoreError = err.into();
    }

    #[test]
    fn soluble_override_wins_over_catalogue_default() {
        let mut cfg = SimulationConfig::default();
        assert!(cfg.is_soluble(PhaseId::Ettr));
        cfg.soluble_overrides.insert(PhaseId::Ettr, false);
        assert!(!cfg.is_soluble(PhaseId::Ettr));
    }

    #[test]
    fn cycle_table_holds_last_entry_past_its_end() {
        let t = CycleTable(vec![1.0, 2.0, 3.0]);
        assert_eq!(t.at(0), 1.0);
        assert_eq!(t.at(2), 3.0);
        assert_eq!(t.at(100), 3.0);
    }

    #[test]
    fn nucleation_law_saturates_toward_cap() {
        let law = NucleationLaw { cap: 0.8, scale: 100.0 };
        assert_eq!(law.probability(0), 0.0);
        assert!(law.probability(100_000) > 0.79);
    }
}
