use std::cmp::Ordering;

/// Position of a scored item in the input and its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub index: usize,
    pub score: f32,
}

fn by_score_then_index(a: &Scored, b: &Scored) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| a.index.cmp(&b.index))
}

/// Selects the `k` lowest scores, ascending.
///
/// Equal scores keep their input order, so the result is fully determined by `scores`.
/// Returns `min(k, scores.len())` entries.
pub fn select_top_k(scores: &[f32], k: usize) -> Vec<Scored> {
    let take = k.min(scores.len());
    if take == 0 {
        return Vec::new();
    }

    let mut scored: Vec<Scored> = scores
        .iter()
        .enumerate()
        // `+ 0.0` folds -0.0 into 0.0 so the two tie.
        .map(|(index, score)| Scored {
            index,
            score: *score + 0.0,
        })
        .collect();

    if take < scored.len() {
        scored.select_nth_unstable_by(take - 1, by_score_then_index);
        scored.truncate(take);
    }
    scored.sort_unstable_by(by_score_then_index);
    scored
}
