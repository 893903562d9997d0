pub mod custom;
pub mod data;
pub mod library;
pub mod progress;
pub mod run;
pub mod settings;
