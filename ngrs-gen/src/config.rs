use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: PathBuf,
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    pub overwrite: bool,
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if !self.database.is_file() {
            return Err(format!(
                "Database file '{}' not found",
                self.database.display()
            ));
        }

        if !self.input_folder.is_dir() {
            return Err(format!(
                "Input folder '{}' is not a directory",
                self.input_folder.display()
            ));
        }

        if !self.overwrite {
            let descriptor = self.output_folder.join(crate::descriptor::DESCRIPTOR_FILE);
            if descriptor.exists() {
                return Err(format!(
                    "Output file '{}' already exists. Use --overwrite to overwrite.",
                    descriptor.display()
                ));
            }
        }

        Ok(())
    }
}
