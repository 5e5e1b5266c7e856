// Standard Library Imports
use std::{iter, vec};

// External Crate Imports
use chemcomp::registry::{C_TERMINAL_HYDROXYL, N_TERMINAL_HYDROGEN};
use itertools::{Itertools, MultiProduct};

// Local Crate Imports
use crate::VariableMods;

/// A lazy iterator over every peptidoform of a sequence, rendered in modX notation
///
/// Created by [`isoforms`]. Cloning it restarts nothing: the clone carries on from the same point.
#[derive(Clone)]
pub struct Isoforms {
    // NOTE: `None` for empty sequences, since the product of zero positions would still yield one (empty) selection
    selections: Option<MultiProduct<vec::IntoIter<String>>>,
    // NOTE: `None` once the total no longer fits in a `usize`
    remaining: Option<usize>,
}

/// Enumerates every way the modifications in `variable_mods` can be placed on `sequence`
///
/// Every residue can be left unmodified or take exactly one of the modifications listed for it. Each terminus can be
/// left unmodified or take one enabled terminal modification, independently of the residue it caps. The last position
/// varies fastest, so `H-SK-OH` comes before `H-SacK-OH`, which comes before `H-prSK-OH`.
///
/// Unmodified termini are rendered as `H-` and `-OH` when `show_unmodified_termini` is `true`, or left off entirely
/// otherwise.
pub fn isoforms(sequence: impl AsRef<str>, variable_mods: &VariableMods, show_unmodified_termini: bool) -> Isoforms {
    let sequence = sequence.as_ref();
    if sequence.is_empty() {
        return Isoforms {
            selections: None,
            remaining: Some(0),
        };
    }

    let (n_terminus, c_terminus) = if show_unmodified_termini {
        (N_TERMINAL_HYDROGEN, C_TERMINAL_HYDROXYL)
    } else {
        ("", "")
    };

    let n_terminal = iter::once(n_terminus.to_owned())
        .chain(variable_mods.n_terminal_mods().map(|label| format!("{label}-")))
        .collect_vec();
    let residues = sequence.chars().map(|residue| {
        iter::once(residue.to_string())
            .chain(variable_mods.residue_mods(residue).map(|label| format!("{label}{residue}")))
            .collect_vec()
    });
    let c_terminal = iter::once(c_terminus.to_owned())
        .chain(variable_mods.c_terminal_mods().map(|label| format!("-{label}")))
        .collect_vec();

    let positions = iter::once(n_terminal)
        .chain(residues)
        .chain(iter::once(c_terminal))
        .collect_vec();
    let remaining = positions.iter().map(Vec::len).try_fold(1, usize::checked_mul);

    Isoforms {
        selections: Some(positions.into_iter().multi_cartesian_product()),
        remaining,
    }
}

impl Iterator for Isoforms {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let selection = self.selections.as_mut()?.next()?;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(selection.concat())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.remaining.map_or((usize::MAX, None), |n| (n, Some(n)))
    }
}

impl Isoforms {
    /// How many peptidoforms are left to yield, or `None` if there are more than fit in a `usize`
    #[must_use]
    pub const fn remaining(&self) -> Option<usize> {
        self.remaining
    }
}
