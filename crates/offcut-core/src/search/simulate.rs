use crate::types::{Length, PackingResult};

/// Cuts `order` out of `raw` front to back, one raw piece at a time.
///
/// Every cut consumes its length plus `kerf`. When a cut no longer fits the
/// open piece, that piece is closed with its remainder as offcut and the next
/// raw piece is opened. Once raw stock is exhausted the current cut and all
/// later ones are recorded in [`PackingResult::unplaced`].
pub fn simulate(raw: &[Length], order: &[Length], kerf: Length) -> PackingResult {
    let mut result = PackingResult::default();

    let Some(&first) = raw.first() else {
        result.unplaced = order.to_vec();
        return result;
    };

    let mut cursor = 0;
    let mut remaining = first;
    let mut current: Vec<Length> = Vec::new();

    for (idx, &cut) in order.iter().enumerate() {
        // Saturates for callers that bypass request validation
        let consumed = cut.saturating_add(kerf);

        // A fresh piece shorter than the cut is closed untouched as well
        while consumed > remaining {
            result.close_piece(remaining, std::mem::take(&mut current));
            cursor += 1;
            match raw.get(cursor) {
                Some(&length) => remaining = length,
                None => {
                    result.unplaced = order[idx..].to_vec();
                    return result;
                }
            }
        }

        remaining -= consumed;
        current.push(consumed);
    }

    result.close_piece(remaining, current);
    result
}
