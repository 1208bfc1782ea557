pub mod console_model;
