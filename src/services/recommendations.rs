use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::models::{Movie, Review};

/// Upper bound on the returned recommendation list
pub const MAX_RECOMMENDATIONS: usize = 20;

/// Weight of the movie's own average rating relative to personal affinity.
/// Kept small so a genre the user loves always beats raw popularity, while
/// movies in zero-signal genres still rank by quality instead of all
/// scoring zero.
const POPULARITY_WEIGHT: f64 = 0.1;

/// Per-genre affinity profile built from one user's review history.
#[derive(Debug, Default)]
struct AffinityProfile {
    /// genre -> (rating sum, review count touching that genre)
    genres: HashMap<String, (i64, i64)>,
    /// total genre touches across all reviews
    total: i64,
}

impl AffinityProfile {
    fn build(reviews: &[Review], movies_by_id: &HashMap<Uuid, &Movie>) -> Self {
        let mut profile = Self::default();
        for review in reviews {
            // A review may outlive its movie only transiently; skip it
            let Some(movie) = movies_by_id.get(&review.movie_id) else {
                continue;
            };
            for genre in &movie.genre {
                let entry = profile.genres.entry(genre.clone()).or_insert((0, 0));
                entry.0 += i64::from(review.rating);
                entry.1 += 1;
                profile.total += 1;
            }
        }
        profile
    }

    /// Weighted affinity contribution of a candidate movie's genres: the
    /// average rating the user gave each genre, weighted by how much of the
    /// user's history that genre represents.
    fn score(&self, movie: &Movie) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        movie
            .genre
            .iter()
            .filter_map(|genre| self.genres.get(genre))
            .map(|&(sum, count)| {
                let average = sum as f64 / count as f64;
                let weight = count as f64 / self.total as f64;
                average * weight
            })
            .sum()
    }
}

/// Ranks the movies the user has not reviewed yet, best match first.
///
/// Pure function of the review history and the catalog snapshot: no stored
/// model state, no randomness, so two calls over the same input return the
/// same ordered list. An empty review history yields an empty list.
pub fn recommend(user_reviews: &[Review], catalog: &[Movie]) -> Vec<Movie> {
    if user_reviews.is_empty() {
        return Vec::new();
    }

    let movies_by_id: HashMap<Uuid, &Movie> = catalog.iter().map(|m| (m.id, m)).collect();
    let profile = AffinityProfile::build(user_reviews, &movies_by_id);
    let reviewed: HashSet<Uuid> = user_reviews.iter().map(|r| r.movie_id).collect();

    let mut scored: Vec<(f64, &Movie)> = catalog
        .iter()
        .filter(|movie| !reviewed.contains(&movie.id))
        .map(|movie| (profile.score(movie) + POPULARITY_WEIGHT * movie.rating, movie))
        .collect();

    scored.sort_by(|(score_a, movie_a), (score_b, movie_b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                movie_b
                    .rating
                    .partial_cmp(&movie_a.rating)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| movie_a.id.cmp(&movie_b.id))
    });

    scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(_, movie)| movie.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, genres: &[&str], rating: f64) -> Movie {
        let mut m = Movie::new(title.to_string(), 2020);
        m.genre = genres.iter().map(|g| g.to_string()).collect();
        m.rating = rating;
        m
    }

    fn review(movie_id: Uuid, rating: i32) -> Review {
        Review::new(movie_id, Uuid::new_v4(), rating, String::new())
    }

    #[test]
    fn test_empty_history_yields_empty_list() {
        let catalog = vec![movie("Heat", &["Action"], 4.0)];
        assert!(recommend(&[], &catalog).is_empty());
    }

    #[test]
    fn test_reviewed_movies_are_excluded() {
        let seen = movie("Heat", &["Action"], 4.0);
        let unseen = movie("Ronin", &["Action"], 3.0);
        let catalog = vec![seen.clone(), unseen.clone()];
        let reviews = vec![review(seen.id, 5)];

        let result = recommend(&reviews, &catalog);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, unseen.id);
    }

    #[test]
    fn test_affinity_beats_equal_popularity() {
        // User loves Action; one unreviewed Action and one unreviewed Drama
        // with the same average rating.
        let seen = movie("Heat", &["Action"], 0.0);
        let action = movie("Ronin", &["Action"], 3.5);
        let drama = movie("Magnolia", &["Drama"], 3.5);
        let catalog = vec![seen.clone(), action.clone(), drama.clone()];
        let reviews = vec![review(seen.id, 5)];

        let result = recommend(&reviews, &catalog);
        assert_eq!(result[0].id, action.id);
        assert_eq!(result[1].id, drama.id);
    }

    #[test]
    fn test_popularity_breaks_zero_signal_ties() {
        let seen = movie("Heat", &["Action"], 0.0);
        let good_drama = movie("Magnolia", &["Drama"], 4.8);
        let weak_drama = movie("Filler", &["Drama"], 2.1);
        let catalog = vec![seen.clone(), good_drama.clone(), weak_drama.clone()];
        let reviews = vec![review(seen.id, 4)];

        let result = recommend(&reviews, &catalog);
        assert_eq!(result[0].id, good_drama.id);
        assert_eq!(result[1].id, weak_drama.id);
    }

    #[test]
    fn test_output_is_deterministic() {
        let seen = movie("Heat", &["Action", "Crime"], 0.0);
        let mut catalog = vec![seen.clone()];
        for i in 0..30 {
            catalog.push(movie(
                &format!("Candidate {i}"),
                &["Action"],
                f64::from(i % 5),
            ));
        }
        let reviews = vec![review(seen.id, 4)];

        let first = recommend(&reviews, &catalog);
        let second = recommend(&reviews, &catalog);
        assert_eq!(first, second);
        assert_eq!(first.len(), MAX_RECOMMENDATIONS);
    }

    #[test]
    fn test_fully_reviewed_catalog_yields_empty_list() {
        let only = movie("Heat", &["Action"], 4.0);
        let catalog = vec![only.clone()];
        let reviews = vec![review(only.id, 5)];
        assert!(recommend(&reviews, &catalog).is_empty());
    }

    #[test]
    fn test_equal_scores_tie_break_by_id() {
        let seen = movie("Heat", &["Action"], 0.0);
        let twin_a = movie("Twin A", &["Drama"], 3.0);
        let twin_b = movie("Twin B", &["Drama"], 3.0);
        let catalog = vec![seen.clone(), twin_a.clone(), twin_b.clone()];
        let reviews = vec![review(seen.id, 4)];

        let result = recommend(&reviews, &catalog);
        let (lo, hi) = if twin_a.id < twin_b.id {
            (twin_a.id, twin_b.id)
        } else {
            (twin_b.id, twin_a.id)
        };
        assert_eq!(result[0].id, lo);
        assert_eq!(result[1].id, hi);
    }
}
