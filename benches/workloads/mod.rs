pub mod containers;
pub mod micro;
pub mod threadtest;
