pub mod form;
pub mod industry;
pub mod requests;
pub mod responses;
pub mod uploads;
