//! Run state kept between transfers

pub mod failures;

pub use failures::{
    carry_over, parse_instance_ids, read_instance_list, select_instances, FailureLog,
};
