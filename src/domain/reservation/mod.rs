pub mod journal;
pub mod lifecycle;
pub mod reservation_name;
pub mod reservation_window;
