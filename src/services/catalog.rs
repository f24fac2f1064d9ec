use std::collections::BTreeSet;

use crate::models::Movie;

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_LIMIT: i64 = 12;

/// One page of an ordered catalog listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub movies: Vec<Movie>,
    /// Count of matching movies before pagination
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

/// Orders a filtered result set and cuts the requested page out of it.
///
/// Ordering is newest-first by creation time, tie-broken by id, both
/// immutable per movie; pages issued earlier keep their boundaries even as
/// new movies arrive at the head. `page` and `limit` below 1 are corrected
/// to 1 rather than rejected, and a page past the end is simply empty.
pub fn paginate(mut movies: Vec<Movie>, page: i64, limit: i64) -> CatalogPage {
    let page = page.max(1) as usize;
    let limit = limit.max(1) as usize;

    movies.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

    let total = movies.len();
    let movies = movies
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    CatalogPage {
        movies,
        total,
        page,
        limit,
    }
}

/// Distinct genre tags across the catalog, sorted alphabetically so the
/// client sees a stable list.
pub fn distinct_genres(movies: &[Movie]) -> Vec<String> {
    movies
        .iter()
        .flat_map(|movie| movie.genre.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
