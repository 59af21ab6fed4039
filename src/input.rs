use super::Error;
use std::path::PathBuf;
use tracing::info;

/// Returns the csv path passed on the command line if it is an existing file,
/// otherwise asks for one with the native file dialog.
pub fn resolve_input_path(file: Option<PathBuf>) -> Result<PathBuf, Error> {
    let path = match existing_file(file) {
        Some(p) => p,
        None => prompt_for_file()?,
    };
    println!("Selected file: {}", path.display());
    Ok(path)
}

/// directories and missing paths are dropped
pub fn existing_file(file: Option<PathBuf>) -> Option<PathBuf> {
    match file {
        Some(p) if p.is_file() => Some(p),
        Some(p) => {
            info!("{:?} is not a file, asking for the input file", p);
            None
        }
        None => None,
    }
}

/// blocks until the dialog is closed, a cancelled dialog is an error
pub fn prompt_for_file() -> Result<PathBuf, Error> {
    rfd::FileDialog::new()
        .set_title("Select the speed test csv")
        .add_filter("Comma-Separated Values", &["csv"])
        .add_filter("All Files", &["*"])
        .pick_file()
        .ok_or(Error::NoInputSelected)
}
