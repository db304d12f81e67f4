use blkpool_storage::VolumeInfo;
use clap::ValueEnum;
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::utils::format_size;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

pub trait OutputFormatter {
    fn format<T: Serialize>(&self, data: T) -> String;
    fn format_table<T: Tabled + Serialize>(&self, data: Vec<T>) -> String;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, data: T) -> String {
        match self {
            OutputFormat::Table | OutputFormat::Json => {
                serde_json::to_string_pretty(&data).unwrap_or_else(|e| e.to_string())
            }
            OutputFormat::Yaml => serde_yaml::to_string(&data).unwrap_or_else(|e| e.to_string()),
        }
    }

    fn format_table<T: Tabled + Serialize>(&self, data: Vec<T>) -> String {
        match self {
            OutputFormat::Table => {
                if data.is_empty() {
                    "No volumes".to_string()
                } else {
                    Table::new(data).to_string()
                }
            }
            OutputFormat::Json => {
                serde_json::to_string_pretty(&data).unwrap_or_else(|e| e.to_string())
            }
            OutputFormat::Yaml => serde_yaml::to_string(&data).unwrap_or_else(|e| e.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct VolumeRow {
    pub name: String,
    #[tabled(rename = "type")]
    pub volume_type: String,
    pub pool: String,
    #[tabled(display_with = "display_bytes")]
    pub size: u64,
    #[tabled(display_with = "display_bytes")]
    pub usage: u64,
    #[tabled(display_with = "display_flag")]
    pub created: bool,
    pub vid: String,
    pub path: String,
}

impl From<VolumeInfo> for VolumeRow {
    fn from(info: VolumeInfo) -> Self {
        Self {
            name: info.name,
            volume_type: info.volume_type.to_string(),
            pool: info.pool,
            size: info.size,
            usage: info.usage,
            created: info.created,
            vid: info.vid.display().to_string(),
            path: info.path,
        }
    }
}

fn display_bytes(bytes: &u64) -> String {
    format_size(*bytes)
}

fn display_flag(flag: &bool) -> String {
    if *flag { "yes" } else { "no" }.to_string()
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

pub fn print_progress(message: &str) {
    println!("{} {}", "⟳".cyan(), message);
}
