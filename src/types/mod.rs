pub mod detail_form;
pub mod playback_state;
pub mod session;
pub mod timestamp;
pub mod timestamp_list;
pub mod timestamp_table;
