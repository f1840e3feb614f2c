use holefill::{FillParameters, FillReport, Pipeline, io};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;


#[derive(Error, Debug)]
pub enum HoleFillCliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Fill(#[from] holefill::HoleFillError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}


/// One image/mask pair and the parameters to fill it with
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FillJob {
    pub image_path: String,
    pub mask_path: String,
    /// Defaults to `<image stem>_FILLED.<ext>` next to the image
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub parameters: FillParameters,
}

impl FillJob {
    /// Load a job from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, HoleFillCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a job from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, HoleFillCliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a job from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, HoleFillCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a job from a JSON string
    pub fn from_json(content: &str) -> Result<Self, HoleFillCliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load the job
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HoleFillCliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(HoleFillCliError::UnsupportedFileFormat),
        }
    }

    /// Convert the job to a TOML string
    pub fn to_toml(&self) -> Result<String, HoleFillCliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert the job to a JSON string
    pub fn to_json(&self) -> Result<String, HoleFillCliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// JSON schema of the job file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FillJob)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| io::filled_output_path(&self.image_path))
    }

    /// Load both images, fill, and write the result to [`FillJob::output_path`]
    pub fn run(&self) -> Result<FillReport, HoleFillCliError> {
        let pipeline = Pipeline::builder().parameters(self.parameters).build()?;
        let image = io::load_rgb(&self.image_path)?;
        let mask = io::load_rgb(&self.mask_path)?;

        let outcome = pipeline.process(&image, &mask)?;
        io::save_grid(&outcome.grid, self.output_path())?;
        Ok(outcome.report)
    }
}
