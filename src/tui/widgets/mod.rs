pub mod color;
pub mod confirm_delete;
pub mod form;
pub mod habit_list;
pub mod help;
pub mod input;
pub mod profile_view;
pub mod stat_cards;
pub mod status_bar;
pub mod tabs;
pub mod weekly_chart;
