// Local Crate Imports
use super::{CleavageKind, CrossRingFragment};
use crate::{
    Anomer, AtomicDatabase, CoreModification, CoreModificationKind, Monosaccharide, ResidueType,
    Result, SubstituentSite,
};

/// Whether the ring bonds `start` and `end` (counted from the ring oxygen) can both be broken
pub(crate) fn can_cleave(monosaccharide: &Monosaccharide, start: u32, end: u32) -> bool {
    // Open chains have no ring, and a second ring holds the fragments together
    if monosaccharide.anomer() == Anomer::OpenChain
        || monosaccharide.has_modification(CoreModificationKind::Anhydro)
        || monosaccharide.has_modification(CoreModificationKind::Lacton)
    {
        return false;
    }

    let offset = i64::from(monosaccharide.anomeric_carbon()) - 1;
    let (start, end) = (i64::from(start) + offset, i64::from(end) + offset);
    if i64::from(monosaccharide.carbons()) < end {
        return false;
    }

    // Double bonds can't be cleaved
    let double_bond_at = |position: i64| {
        position > 0
            && i32::try_from(position).is_ok_and(|p| {
                monosaccharide.has_modification_at(CoreModificationKind::DoubleBond, p)
            })
    };
    !(double_bond_at(start) || double_bond_at(end))
}

impl<'a> CrossRingFragment<'a> {
    pub(crate) fn new(
        db: &'a AtomicDatabase,
        parent: &Monosaccharide<'a>,
        kind: CleavageKind,
        start: u32,
        end: u32,
    ) -> Result<Self> {
        let anomeric_carbon = i64::from(parent.anomeric_carbon());
        let ring_size = i64::from(parent.ring_size());
        let ring_closure = anomeric_carbon + ring_size - 2;

        let anomer_inside = start != 0;
        let cleaved_at_closure = i64::from(end) == ring_size - 1;
        let first = if anomer_inside {
            anomeric_carbon + i64::from(start)
        } else {
            1
        };
        let last = if cleaved_at_closure {
            i64::from(parent.carbons())
        } else {
            anomeric_carbon + i64::from(end) - 1
        };

        let retained: Vec<i64> = (1..=i64::from(parent.carbons()))
            .filter(|&c| {
                let anomer_side = (first..=last).contains(&c) == anomer_inside;
                anomer_side == kind.is_root_side()
            })
            .collect();
        // Unknown and lost positions both become 0
        let renumber = |position: i64| -> i32 {
            retained
                .iter()
                .position(|&c| c == position)
                .and_then(|i| i32::try_from(i + 1).ok())
                .unwrap_or(0)
        };
        let kept = |position: i32| position <= 0 || retained.contains(&i64::from(position));

        let mut modifications: Vec<_> = parent
            .modifications()
            .iter()
            .filter(|m| kept(m.position))
            .map(|m| CoreModification::new(m.kind, renumber(m.position.into())))
            .collect();
        let substituents = parent
            .substituents()
            .iter()
            .filter(|s| kept(s.position))
            .map(|s| SubstituentSite {
                substituent: s.substituent.clone(),
                position: renumber(s.position.into()),
            })
            .collect();

        // The carbon left without its ring oxygen gains or loses a hydroxyl
        if cleaved_at_closure {
            if retained.contains(&anomeric_carbon) {
                modifications.push(CoreModification::new(
                    CoreModificationKind::Hydroxy,
                    renumber(anomeric_carbon),
                ));
            } else {
                modifications.push(CoreModification::new(
                    CoreModificationKind::Deoxy,
                    renumber(ring_closure),
                ));
            }
        }

        let new_anomeric_carbon = renumber(anomeric_carbon);
        let new_ring_size = renumber(ring_closure) - new_anomeric_carbon + 2;

        let symbol = kind.symbol();
        let window = format!("#{symbol}_{start}_{end}");
        let mut skeleton = parent.to_skeleton();
        skeleton.name = format!("{}{window}", parent.name());
        skeleton.synonyms = parent
            .synonyms()
            .iter()
            .map(|s| format!("{s}{window}"))
            .collect();
        skeleton.description = format!("{start},{end} {kind} fragment of {}", parent.description());
        skeleton.carbons = u32::try_from(retained.len()).unwrap_or(u32::MAX);
        skeleton.anomeric_carbon = new_anomeric_carbon.unsigned_abs();
        // A ring that has lost its closing carbon no longer occupies a position
        skeleton.ring_size = u32::try_from(new_ring_size).unwrap_or(0);
        skeleton.modifications = modifications;
        skeleton.substituents = substituents;

        Ok(Self {
            monosaccharide: skeleton.derive(db)?,
            parent: parent.name().to_owned(),
            kind,
            start,
            end,
        })
    }
}
