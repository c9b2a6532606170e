pub mod app;
pub mod detail_form;
pub mod seek_bar;
pub mod timestamp_table;
