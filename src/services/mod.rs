pub mod providers;
pub mod recommend;
pub mod title_match;
