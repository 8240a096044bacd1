pub mod fifo;
pub mod year_ext;
