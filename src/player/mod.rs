pub mod app;
pub mod audio;
pub mod picker;
pub mod picker_ui;
pub mod recorder;
pub mod ui;

use std::error::Error;

pub fn run(file: Option<&str>) -> Result<(), Box<dyn Error>> {
    app::run_with_file(file)
}
