pub mod evaluation;
pub mod question;
pub mod session;
pub mod summary;
pub mod verdict;
