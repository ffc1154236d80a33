pub mod admin;
pub mod booking;
pub mod movie;
pub mod recommendation;
pub mod theater;
pub mod user;

pub use admin::Admin;
pub use booking::Booking;
pub use movie::Movie;
pub use recommendation::RecommendationSearch;
pub use theater::Theater;
pub use user::User;
