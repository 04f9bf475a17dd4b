#![allow(dead_code)]

pub mod jets;
pub mod models;
pub mod toptag_env;
