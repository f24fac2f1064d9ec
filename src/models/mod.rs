mod movie;
mod review;
mod user;

pub use movie::Movie;
pub use review::{Review, RATING_MAX, RATING_MIN};
pub use user::{Role, User};
