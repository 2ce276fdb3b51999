use crate::entities::movie;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RankChange {
    pub id: i32,
    pub ranking: i32,
}

/// Numbers movies by their position in ascending rating order, starting at 1.
///
/// `movies` must already be sorted the way the listing shows them. Returns the
/// movies whose stored ranking differs from the new one, so callers only write
/// rows that actually moved.
pub fn assign(movies: &mut [movie::Model]) -> Vec<RankChange> {
    let mut changes = Vec::new();
    for (position, movie) in (1..).zip(movies.iter_mut()) {
        if movie.ranking != Some(position) {
            movie.ranking = Some(position);
            changes.push(RankChange { id: movie.id, ranking: position });
        }
    }
    changes
}
