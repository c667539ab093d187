//! Tests for the TIFF reading layer

pub(crate) mod test_utils;
mod byte_order_tests;
mod reader_tests;
