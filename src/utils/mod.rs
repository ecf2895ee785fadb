pub mod db_utils;
pub mod duration_fmt;
pub mod punch_filter;
