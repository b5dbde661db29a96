use super::*;

impl<C: PackingCache> CutSearch<C> {
    /// Computes material usage and waste statistics for a retained packing.
    pub(super) fn calculate_summary(&self, best: &BestCandidate) -> Summary {
        let packing = &best.packing;
        let raw_pieces_used = packing.pieces.len();
        let raw_length_used: Length = self.raw.lengths()[..raw_pieces_used].iter().sum();

        let placed_cuts = packing.pieces.iter().map(Vec::len).sum::<usize>() as Length;
        let kerf_loss = placed_cuts * self.config.blade_width;
        let cut_length = packing.consumed_length() - kerf_loss;

        let waste_percentage = if raw_length_used > 0 {
            (best.total_offcut as f64 / raw_length_used as f64) * 100.0
        } else {
            0.0
        };

        Summary {
            raw_pieces_used,
            raw_length_used,
            cut_length,
            kerf_loss,
            total_offcut: best.total_offcut,
            waste_percentage,
            smallest_offcut: best.smallest_offcut,
            largest_offcut: packing.offcuts.iter().copied().max().unwrap_or(0),
            unplaced_cuts: packing.unplaced.len(),
        }
    }
}
