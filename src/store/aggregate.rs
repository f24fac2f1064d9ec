use crate::models::Movie;

/// Running `(sum, count)` rating aggregate for a single movie.
///
/// The pair is stored at full precision; the average is only derived from
/// it, never stored independently, so the two can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingAggregate {
    pub sum: i64,
    pub count: i64,
}

impl RatingAggregate {
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            sum: movie.rating_sum,
            count: movie.rating_count,
        }
    }

    /// Folds one new review rating into the aggregate.
    pub fn add(&mut self, rating: i32) {
        self.sum += i64::from(rating);
        self.count += 1;
    }

    /// Arithmetic mean of all recorded ratings, 0.0 when no review exists.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    /// Rebuilds the aggregate from scratch. Recovery path for a detected
    /// inconsistency; the incremental [`RatingAggregate::add`] is the
    /// normal mode of operation.
    pub fn recompute(ratings: impl IntoIterator<Item = i32>) -> Self {
        let mut agg = Self { sum: 0, count: 0 };
        for rating in ratings {
            agg.add(rating);
        }
        agg
    }

    /// Writes the aggregate and its derived average back onto the movie.
    pub fn apply_to(&self, movie: &mut Movie) {
        movie.rating_sum = self.sum;
        movie.rating_count = self.count;
        movie.rating = self.average();
    }
}
