pub mod doctor;
pub mod jobs;
pub mod launcher;
pub mod presets;
pub mod run;
pub mod sanitize;
pub mod version;
