//! Component A (part 1): the phase catalogue. A static table keyed by
//! [`PhaseId`] carries the data every other component needs to stay
//! generic over "which phase is this" — name, specific gravity, molar
//! volume, and the three disjoint-kind flags spec.md §4.A calls for.
//!
//! `PhaseId` is a single numeric namespace (`#[repr(u8)]`) so that
//! `edgecnt` arguments and `Count` indices agree, per spec.md §4.A.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum PhaseId {
    // --- porosity kinds ---
    Porosity = 0,
    Crackp = 1,
    Emptyp = 2,
    // --- clinker / mineral solids ---
    C3S = 3,
    C2S = 4,
    C3A = 5,
    OC3A = 6,
    C4AF = 7,
    K2SO4 = 8,
    NA2SO4 = 9,
    Gypsum = 10,
    Hemihyd = 11,
    Anhydrite = 12,
    Cacl2 = 13,
    Cas2 = 14,
    Asg = 15,
    Sfume = 16,
    Amsil = 17,
    Slag = 18,
    Caco3 = 19,
    Inertagg = 20,
    // --- hydration-product solids ---
    Csh = 21,
    Pozzcsh = 22,
    Slagcsh = 23,
    Ch = 24,
    Fh3 = 25,
    Ettr = 26,
    Ettrc4af = 27,
    Afm = 28,
    Afmc = 29,
    C3ah6 = 30,
    Gypsums = 31,
    Strat = 32,
    Friedel = 33,
    // --- diffusing species ---
    Diffcsh = 34,
    Diffch = 35,
    Difffh3 = 36,
    Diffettr = 37,
    Diffgyp = 38,
    Diffc3a = 39,
    Diffc4a = 40,
    Diffhem = 41,
    Diffanh = 42,
    Diffcas2 = 43,
    Diffas = 44,
    Diffcacl2 = 45,
    Diffcaco3 = 46,
    Diffso4 = 47,
    Absgyp = 48,
}

pub const PHASE_COUNT: usize = 49;

impl PhaseId {
    pub const ALL: [PhaseId; PHASE_COUNT] = [
        PhaseId::Porosity,
        PhaseId::Crackp,
        PhaseId::Emptyp,
        PhaseId::C3S,
        PhaseId::C2S,
        PhaseId::C3A,
        PhaseId::OC3A,
        PhaseId::C4AF,
        PhaseId::K2SO4,
        PhaseId::NA2SO4,
        PhaseId::Gypsum,
        PhaseId::Hemihyd,
        PhaseId::Anhydrite,
        PhaseId::Cacl2,
        PhaseId::Cas2,
        PhaseId::Asg,
        PhaseId::Sfume,
        PhaseId::Amsil,
        PhaseId::Slag,
        PhaseId::Caco3,
        PhaseId::Inertagg,
        PhaseId::Csh,
        PhaseId::Pozzcsh,
        PhaseId::Slagcsh,
        PhaseId::Ch,
        PhaseId::Fh3,
        PhaseId::Ettr,
        PhaseId::Ettrc4af,
        PhaseId::Afm,
        PhaseId::Afmc,
        PhaseId::C3ah6,
        PhaseId::Gypsums,
        PhaseId::Strat,
        PhaseId::Friedel,
        PhaseId::Diffcsh,
        PhaseId::Diffch,
        PhaseId::Difffh3,
        PhaseId::Diffettr,
        PhaseId::Diffgyp,
        PhaseId::Diffc3a,
        PhaseId::Diffc4a,
        PhaseId::Diffhem,
        PhaseId::Diffanh,
        PhaseId::Diffcas2,
        PhaseId::Diffas,
        PhaseId::Diffcacl2,
        PhaseId::Diffcaco3,
        PhaseId::Diffso4,
        PhaseId::Absgyp,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as u8 as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Option<PhaseId> {
        PhaseId::ALL.get(i).copied()
    }

    #[inline]
    pub fn info(self) -> &'static PhaseInfo {
        &CATALOGUE[self.index()]
    }

    #[inline]
    pub fn is_porosity(self) -> bool {
        self.info().is_porosity
    }

    #[inline]
    pub fn is_diffusing(self) -> bool {
        self.info().is_diffusing
    }

    #[inline]
    pub fn is_soluble_solid_default(self) -> bool {
        self.info().is_soluble_solid
    }

    /// Solid phase this diffusing species precipitates back into when
    /// a move routine reverts it on the final hydration step with no
    /// reaction (spec.md §4.F step 6). `None` for non-diffusing
    /// phases and for `ABSGYP`, which is never itself enlisted as a
    /// diffusing ant: `species::sulfoaluminate::move_diffgyp` turns a
    /// `DIFFGYP` voxel straight into `ABSGYP` on contact with `SLAG`
    /// (gated by `AGRATE` and `Gypabsprob`), a terminal solid with no
    /// move routine of its own.
    pub fn solid_analog(self) -> Option<PhaseId> {
        use PhaseId::*;
        Some(match self {
            Diffcsh => Csh,
            Diffch => Ch,
            Difffh3 => Fh3,
            Diffettr => Ettr,
            Diffgyp => Gypsum,
            Diffc3a => C3A,
            Diffc4a => C4AF,
            Diffhem => Hemihyd,
            Diffanh => Anhydrite,
            Diffcas2 => Cas2,
            Diffas => Asg,
            Diffcacl2 => Cacl2,
            Diffcaco3 => Caco3,
            Diffso4 => Gypsum,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseInfo {
    pub name: &'static str,
    /// Specific gravity [g/cm³].
    pub specific_gravity: f64,
    /// Molar volume [cm³/mol].
    pub molar_volume: f64,
    pub is_diffusing: bool,
    pub is_porosity: bool,
    /// Default value of `Soluble[phase]` before any config override
    /// (spec.md §3, `Soluble[phase_id]`); only hydration-product
    /// solids that can legitimately re-dissolve after precipitating
    /// default to `true`.
    pub is_soluble_solid: bool,
}

const fn info(
    name: &'static str,
    specific_gravity: f64,
    molar_volume: f64,
    is_diffusing: bool,
    is_porosity: bool,
    is_soluble_solid: bool,
) -> PhaseInfo {
    PhaseInfo {
        name,
        specific_gravity,
        molar_volume,
        is_diffusing,
        is_porosity,
        is_soluble_solid,
    }
}

/// Static catalogue, indexed by `PhaseId::index()`. Specific gravities
/// and molar volumes are the standard literature values used for
/// cement clinker and hydration product stoichiometry.
pub static CATALOGUE: [PhaseInfo; PHASE_COUNT] = [
    info("POROSITY", 1.0, 18.02, false, true, false),
    info("CRACKP", 1.0, 18.02, false, true, false),
    info("EMPTYP", 0.0, 0.0, false, true, false),
    info("C3S", 3.21, 71.13, false, false, false),
    info("C2S", 3.28, 52.51, false, false, false),
    info("C3A", 3.03, 89.19, false, false, false),
    info("OC3A", 3.03, 89.19, false, false, false),
    info("C4AF", 3.73, 130.29, false, false, false),
    info("K2SO4", 2.66, 65.00, false, false, false),
    info("NA2SO4", 2.68, 53.00, false, false, false),
    info("GYPSUM", 2.32, 74.21, false, false, false),
    info("HEMIHYD", 2.74, 52.97, false, false, false),
    info("ANHYDRITE", 2.61, 45.94, false, false, false),
    info("CACL2", 2.15, 51.60, false, false, false),
    info("CAS2", 2.79, 100.00, false, false, false),
    info("ASG", 2.68, 47.00, false, false, false),
    info("SFUME", 2.20, 27.30, false, false, false),
    info("AMSIL", 2.20, 27.30, false, false, false),
    info("SLAG", 2.87, 50.40, false, false, false),
    info("CACO3", 2.71, 36.93, false, false, false),
    info("INERTAGG", 2.65, 0.0, false, false, false),
    info("CSH", 2.12, 108.0, false, false, true),
    info("POZZCSH", 2.04, 117.0, false, false, true),
    info("SLAGCSH", 2.02, 130.0, false, false, true),
    info("CH", 2.24, 33.0, false, false, true),
    info("FH3", 3.80, 34.3, false, false, true),
    info("ETTR", 1.70, 735.0, false, false, true),
    info("ETTRC4AF", 1.70, 735.0, false, false, true),
    info("AFM", 1.95, 313.0, false, false, true),
    info("AFMC", 2.17, 262.0, false, false, false),
    info("C3AH6", 2.52, 149.52, false, false, true),
    info("GYPSUMS", 2.32, 74.21, false, false, true),
    info("STRAT", 1.94, 215.0, false, false, false),
    info("FRIEDEL", 1.87, 288.0, false, false, false),
    info("DIFFCSH", 2.12, 108.0, true, false, false),
    info("DIFFCH", 2.24, 33.0, true, false, false),
    info("DIFFFH3", 3.80, 34.3, true, false, false),
    info("DIFFETTR", 1.70, 735.0, true, false, false),
    info("DIFFGYP", 2.32, 74.21, true, false, false),
    info("DIFFC3A", 3.03, 89.19, true, false, false),
    info("DIFFC4A", 3.73, 130.29, true, false, false),
    info("DIFFHEM", 2.74, 52.97, true, false, false),
    info("DIFFANH", 2.61, 45.94, true, false, false),
    info("DIFFCAS2", 2.79, 100.0, true, false, false),
    info("DIFFAS", 2.68, 47.0, true, false, false),
    info("DIFFCACL2", 2.15, 51.60, true, false, false),
    info("DIFFCACO3", 2.71, 36.93, true, false, false),
    info("DIFFSO4", 2.32, 74.21, true, false, false),
    info("ABSGYP", 2.32, 74.21, true, false, false),
];

/// Legacy (pre-3.0) lattice image files numbered phases in the order
/// the original 100³ fixed-resolution images shipped with, before the
/// catalogue grew to include slag, pozzolan and chloride chemistry.
/// `convert_id` remaps those ids into the current [`PhaseId`] space.
/// Versions `>= 3.0` are assumed to already use the current numbering
/// (identity mapping). This is catalogue-level logic, independent of
/// the header-token scanner that decides which version a given file
/// is (that scanner is out of scope, per spec.md §1).
const LEGACY_ORDER: [PhaseId; 16] = [
    PhaseId::Porosity,
    PhaseId::C3S,
    PhaseId::C2S,
    PhaseId::C3A,
    PhaseId::C4AF,
    PhaseId::Gypsum,
    PhaseId::Hemihyd,
    PhaseId::Anhydrite,
    PhaseId::Inertagg,
    PhaseId::Ch,
    PhaseId::Csh,
    PhaseId::C3ah6,
    PhaseId::Ettr,
    PhaseId::Ettrc4af,
    PhaseId::Afm,
    PhaseId::Friedel,
];

/// Remap a raw on-disk id from a file of the given format `version`
/// into the current [`PhaseId`] numbering. Unknown legacy ids pass
/// through as `None` so the caller (which owns the diagnostic sink)
/// can decide how to report a malformed image.
pub fn convert_id(raw: u8, version: f64) -> Option<PhaseId> {
    if version >= 3.0 {
        return PhaseId::from_index(raw as usize);
    }
    LEGACY_ORDER.get(raw as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_covers_every_phase_id() {
        assert_eq!(CATALOGUE.len(), PHASE_COUNT);
        for (i, p) in PhaseId::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn kinds_are_disjoint() {
        for p in PhaseId::ALL {
            let porosity = p.is_porosity();
            let diffusing = p.is_diffusing();
            assert!(!(porosity && diffusing), "{p:?} is both porosity and diffusing");
        }
    }

    #[test]
    fn diffusing_species_have_a_solid_analog_or_are_absgyp() {
        for p in PhaseId::ALL {
            if p.is_diffusing() {
                assert!(
                    p.solid_analog().is_some() || p == PhaseId::Absgyp,
                    "{p:?} has no solid analog"
                );
            }
        }
    }

    #[test]
    fn convert_id_is_identity_past_v3() {
        assert_eq!(convert_id(5, 3.0), PhaseId::from_index(5));
        assert_eq!(convert_id(5, 4.2), PhaseId::from_index(5));
    }

    #[test]
    fn convert_id_remaps_legacy_v2() {
        assert_eq!(convert_id(0, 2.0), Some(PhaseId::Porosity));
        assert_eq!(convert_id(1, 2.0), Some(PhaseId::C3S));
        assert_eq!(convert_id(9, 2.0), Some(PhaseId::Ch));
    }

    #[test]
    fn convert_id_rejects_out_of_range_legacy() {
        assert_eq!(convert_id(200, 2.0), None);
    }
}
