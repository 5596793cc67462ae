//! Round-robin pairing by Berger tables.

use crate::models::TournamentError;

/// One round of the schedule: `(first mover, second mover)` pairs. Byes are left out.
pub type RoundPairings<T> = Vec<(T, T)>;

/// Generate a full round-robin schedule for `entrants` (in the given order).
///
/// With an odd count a sentinel slot is added and whoever meets it has a bye that
/// round. The last slot stays fixed while the rest rotate one step per round; the
/// first mover alternates with round parity so the fixed slot does not always
/// hold the same side. For `n` slots this gives `n - 1` rounds in which every pair
/// meets once.
///
/// With `double_cycle` the whole cycle is repeated with sides swapped, so round
/// `r + n - 1` mirrors round `r`.
///
/// The output depends only on the input order and the flag.
pub fn generate<T: Clone + Eq>(
    entrants: &[T],
    double_cycle: bool,
) -> Result<Vec<RoundPairings<T>>, TournamentError> {
    if entrants.len() < 2 {
        return Err(TournamentError::InvalidInput(format!(
            "need at least 2 entrants to pair, got {}",
            entrants.len()
        )));
    }
    for (i, e) in entrants.iter().enumerate() {
        if entrants[..i].contains(e) {
            return Err(TournamentError::InvalidInput(
                "the same entrant is listed twice".to_string(),
            ));
        }
    }

    // None is the "no opponent" slot.
    let mut slots: Vec<Option<T>> = entrants.iter().cloned().map(Some).collect();
    if slots.len() % 2 != 0 {
        slots.push(None);
    }
    let n = slots.len();
    let fixed = slots.pop().flatten();
    let mut rotation = slots;

    let mut rounds = Vec::with_capacity(if double_cycle { 2 * (n - 1) } else { n - 1 });
    for round in 0..n - 1 {
        let even = round % 2 == 0;
        let mut pairings = Vec::with_capacity(n / 2);

        let (a, b) = if even {
            (&rotation[0], &fixed)
        } else {
            (&fixed, &rotation[0])
        };
        push_unless_bye(&mut pairings, a, b);

        for i in 1..n / 2 {
            let (a, b) = (&rotation[i], &rotation[n - 1 - i]);
            if even {
                push_unless_bye(&mut pairings, a, b);
            } else {
                push_unless_bye(&mut pairings, b, a);
            }
        }

        rounds.push(pairings);
        rotation.rotate_right(1);
    }

    if double_cycle {
        let mirrored: Vec<RoundPairings<T>> = rounds
            .iter()
            .map(|pairings| {
                pairings
                    .iter()
                    .map(|(a, b)| (b.clone(), a.clone()))
                    .collect()
            })
            .collect();
        rounds.extend(mirrored);
    }

    Ok(rounds)
}

fn push_unless_bye<T: Clone>(pairings: &mut RoundPairings<T>, first: &Option<T>, second: &Option<T>) {
    if let (Some(first), Some(second)) = (first, second) {
        pairings.push((first.clone(), second.clone()));
    }
}

/// Number of rounds `generate` produces for `entrants` entrants.
pub fn round_count(entrants: usize, double_cycle: bool) -> usize {
    if entrants < 2 {
        return 0;
    }
    let single = entrants + entrants % 2 - 1;
    if double_cycle {
        2 * single
    } else {
        single
    }
}
